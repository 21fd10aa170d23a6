use askama::Template;
use askama_web::WebTemplate;

use crate::domain::unsubscribe_record::UnsubscribeRecord;
use crate::views::StatusMessage;

#[derive(Debug, Clone)]
pub struct LocationStatus {
    pub path: String,
    pub format: String,
    pub exists: bool,
}

/// Everything the diagnostic page shows, gathered off the async workers.
#[derive(Template, WebTemplate, Debug, Clone, Default)]
#[template(path = "debug.html")]
pub struct DebugPage {
    pub working_dir: String,
    pub entries: Vec<String>,
    pub locations: Vec<LocationStatus>,
    pub records: Vec<UnsubscribeRecord>,
    pub csv_text: String,
    pub messages: Vec<StatusMessage>,
}

impl DebugPage {
    pub fn with_messages(mut self, messages: Vec<StatusMessage>) -> Self {
        self.messages = messages;
        self
    }
}
