use unicode_segmentation::UnicodeSegmentation;

const MAX_CHAR_LENGHT: usize = 500;
pub const UNSPECIFIED_REASON: &str = "Not specified";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsubscribeReason(String);

impl UnsubscribeReason {
    /// Blank input falls back to the "Not specified" sentinel.
    pub fn parse(reason: Option<String>) -> Result<UnsubscribeReason, String> {
        let reason = reason.unwrap_or_default();
        let trimmed = reason.trim();

        if trimmed.is_empty() {
            return Ok(Self::unspecified());
        }

        if trimmed.graphemes(true).count() > MAX_CHAR_LENGHT {
            return Err(format!(
                "The reason cannot be longer than {} characters",
                MAX_CHAR_LENGHT
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn unspecified() -> UnsubscribeReason {
        Self(UNSPECIFIED_REASON.to_string())
    }

    pub fn tagged(tag: &str) -> UnsubscribeReason {
        Self(tag.to_string())
    }
}

impl AsRef<str> for UnsubscribeReason {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<UnsubscribeReason> for String {
    fn from(reason: UnsubscribeReason) -> Self {
        reason.0
    }
}
