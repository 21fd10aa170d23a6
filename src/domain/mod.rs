pub mod new_unsubscribe;
pub mod subscriber_email;
pub mod unsubscribe_reason;
pub mod unsubscribe_record;
