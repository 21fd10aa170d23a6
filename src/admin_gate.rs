use secrecy::{ExposeSecret, Secret};

/// Shared-password check for the admin views.
///
/// This is a placeholder, not a security boundary: one static secret compared by
/// exact string match on every request, with no session, rate limit or lockout.
/// The password also travels back to the browser in hidden form fields so each
/// admin action can be re-checked.
pub struct AdminGate {
    password: Secret<String>,
}

impl AdminGate {
    pub fn new(password: Secret<String>) -> Self {
        AdminGate { password }
    }

    pub fn verify(&self, candidate: &str) -> bool {
        candidate == self.password.expose_secret()
    }
}
