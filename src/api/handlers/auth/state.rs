//! Shared configuration for auth handlers.

/// Where the web app lives. Email links and OAuth redirects land on routes
/// under this URL, never on this service.
#[derive(Debug, Clone)]
pub struct AuthState {
    site_url: String,
}

impl AuthState {
    #[must_use]
    pub fn new(site_url: &str) -> Self {
        Self {
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    /// Web-app route that exchanges one-time codes through `/v1/auth/callback`.
    #[must_use]
    pub fn callback_url(&self) -> String {
        format!("{}/auth/callback", self.site_url)
    }

    /// Web-app route the password-reset email links to.
    #[must_use]
    pub fn reset_password_url(&self) -> String {
        format!("{}/reset-password", self.site_url)
    }
}
