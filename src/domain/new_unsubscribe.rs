use serde::Deserialize;

use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::unsubscribe_reason::UnsubscribeReason;

#[derive(Debug)]
pub struct NewUnsubscribe {
    pub email: SubscriberEmail,
    pub reason: UnsubscribeReason,
}

#[derive(Deserialize)]
pub struct UnsubscribeFormData {
    pub email: String,
    pub reason: Option<String>,
}

impl TryFrom<UnsubscribeFormData> for NewUnsubscribe {
    type Error = String;

    fn try_from(form: UnsubscribeFormData) -> Result<Self, Self::Error> {
        let email = SubscriberEmail::parse(form.email)?;
        let reason = UnsubscribeReason::parse(form.reason)?;

        Ok(NewUnsubscribe { email, reason })
    }
}
