use validator::validate_email;

/// Canonical (trimmed, lower-case) email address. It is the natural key of the registry,
/// so two addresses differing only in casing compare equal once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    /// Strict parsing used for addresses typed into a form.
    pub fn parse(email: String) -> Result<SubscriberEmail, String> {
        let normalized = normalize(&email);

        if !validate_email(normalized.as_str()) {
            return Err(format!("{} email is not valid", email.trim()));
        }

        Ok(Self(normalized))
    }

    /// Lenient parsing used for stored and imported rows: anything holding an "@"
    /// is kept.
    pub fn normalize(email: &str) -> Result<SubscriberEmail, String> {
        let normalized = normalize(email);

        if !normalized.contains('@') {
            return Err(format!("{} does not look like an email address", email.trim()));
        }

        Ok(Self(normalized))
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for SubscriberEmail {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SubscriberEmail::normalize(&value)
    }
}

impl From<SubscriberEmail> for String {
    fn from(email: SubscriberEmail) -> Self {
        email.0
    }
}
