use askama::Template;
use askama_web::WebTemplate;

use crate::domain::unsubscribe_record::UnsubscribeRecord;
use crate::views::StatusMessage;

#[derive(Template, WebTemplate)]
#[template(path = "admin_login.html")]
pub struct AdminLoginPage {
    pub messages: Vec<StatusMessage>,
}

impl AdminLoginPage {
    pub fn new(messages: Vec<StatusMessage>) -> Self {
        AdminLoginPage { messages }
    }
}

/// Every form repeats the password in a hidden field: there is no session.
#[derive(Template, WebTemplate)]
#[template(path = "admin_dashboard.html")]
pub struct AdminDashboardPage {
    pub password: String,
    pub records: Vec<UnsubscribeRecord>,
    pub messages: Vec<StatusMessage>,
}

impl AdminDashboardPage {
    pub fn new(
        password: String,
        records: Vec<UnsubscribeRecord>,
        messages: Vec<StatusMessage>,
    ) -> Self {
        AdminDashboardPage {
            password,
            records,
            messages,
        }
    }
}
