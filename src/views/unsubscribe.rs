use askama::Template;
use askama_web::WebTemplate;

use crate::views::StatusMessage;

#[derive(Template, WebTemplate)]
#[template(path = "unsubscribe.html")]
pub struct UnsubscribePage {
    pub messages: Vec<StatusMessage>,
}

impl UnsubscribePage {
    pub fn new(messages: Vec<StatusMessage>) -> Self {
        UnsubscribePage { messages }
    }
}
