use chrono::Local;

use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::unsubscribe_reason::UnsubscribeReason;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One unsubscribed address. Field order matches the `email,reason,timestamp` header
/// of the tabular store.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UnsubscribeRecord {
    pub email: SubscriberEmail,
    pub reason: String,
    pub timestamp: String,
}

impl UnsubscribeRecord {
    pub fn new(email: SubscriberEmail, reason: UnsubscribeReason, timestamp: String) -> Self {
        UnsubscribeRecord {
            email,
            reason: reason.into(),
            timestamp,
        }
    }

    pub fn captured_now(email: SubscriberEmail, reason: UnsubscribeReason) -> Self {
        Self::new(email, reason, current_timestamp())
    }
}

/// A row as found on disk or in an upload, before normalization.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct StoredRecord {
    pub email: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl TryFrom<StoredRecord> for UnsubscribeRecord {
    type Error = String;

    fn try_from(row: StoredRecord) -> Result<Self, Self::Error> {
        let email = SubscriberEmail::normalize(&row.email)?;
        let reason = match row.reason {
            Some(reason) if !reason.trim().is_empty() => UnsubscribeReason::tagged(&reason),
            _ => UnsubscribeReason::unspecified(),
        };
        // A missing timestamp stays blank so rewriting a loaded set does not alter it
        let timestamp = row.timestamp.unwrap_or_default();

        Ok(UnsubscribeRecord::new(email, reason, timestamp))
    }
}

pub fn current_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
