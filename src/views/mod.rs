//! Page templates. Markup lives under `templates/` and every interpolated value is
//! HTML-escaped by askama unless a template marks it `safe`.

pub mod admin;
pub mod assets;
pub mod debug;
pub mod landing;
pub mod unsubscribe;

/// Inline outcome shown at the top of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Success(String),
    Info(String),
    Warning(String),
    Error(String),
}

impl StatusMessage {
    pub fn class(&self) -> &'static str {
        match self {
            StatusMessage::Success(_) => "status-success",
            StatusMessage::Info(_) => "status-info",
            StatusMessage::Warning(_) => "status-warning",
            StatusMessage::Error(_) => "status-error",
        }
    }

    pub fn text(&self) -> &str {
        match self {
            StatusMessage::Success(text)
            | StatusMessage::Info(text)
            | StatusMessage::Warning(text)
            | StatusMessage::Error(text) => text,
        }
    }
}
