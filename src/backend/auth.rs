//! Client for the hosted auth API.
//!
//! Sessions, password hashing, confirmation and recovery emails, and the
//! OAuth handshake are all owned by the hosted service; this client only
//! shapes requests and interprets responses. Denied credentials and rejected
//! codes are ordinary outcomes here, not errors: the sign-in flow needs to
//! tell them apart from transport failures to keep the lockout counter
//! honest.

use super::{endpoint_url, http_client};
use anyhow::{anyhow, Result};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

/// A session issued by the hosted auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: AuthUser,
}

/// The identity attached to a session or returned by user updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub user_metadata: Value,
}

impl AuthUser {
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.user_metadata
            .get("display_name")
            .and_then(Value::as_str)
    }
}

/// Outcome of a signup request.
#[derive(Debug)]
pub enum SignupOutcome {
    Created,
    Conflict,
}

/// Outcome of a token request (password grant or code exchange).
#[derive(Debug)]
pub enum GrantOutcome {
    Granted(Session),
    Denied,
}

/// Outcome of a password update through a recovery session.
#[derive(Debug)]
pub enum PasswordUpdate {
    Updated(AuthUser),
    Unauthorized,
}

/// Error codes the hosted service uses for a failed credential check.
/// Anything else on the token endpoint is a real error, not a denial.
const DENIAL_CODES: [&str; 3] = ["invalid_credentials", "invalid_grant", "email_not_confirmed"];

#[derive(Debug, Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
    anon_key: SecretString,
}

impl AuthClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, anon_key: SecretString) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.to_string(),
            anon_key,
        })
    }

    /// Register a new account. The hosted service sends the confirmation
    /// email; nothing is persisted locally.
    #[instrument(skip(self, password, display_name))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<SignupOutcome> {
        let url = endpoint_url(&self.base_url, "/auth/v1/signup")?;

        let payload = json!({
            "email": email,
            "password": password,
            "data": { "display_name": display_name },
        });

        let response = self
            .client
            .post(url.clone())
            .header("apikey", self.anon_key.expose_secret())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let json_response: Value = response.json().await?;

        if status.is_success() {
            // With confirmations enabled the service answers 200 for an
            // already-registered email but returns no identities.
            let obfuscated_existing = json_response["identities"]
                .as_array()
                .is_some_and(Vec::is_empty);
            if obfuscated_existing {
                return Ok(SignupOutcome::Conflict);
            }
            return Ok(SignupOutcome::Created);
        }

        if status.is_client_error() {
            if let Some(code) = error_code(&json_response) {
                if code == "user_already_exists" || code == "email_exists" {
                    return Ok(SignupOutcome::Conflict);
                }
            }
        }

        Err(anyhow!(
            "{} - {}, {}",
            url,
            status,
            error_message(&json_response)
        ))
    }

    /// Verify an email/password pair. Denials are a distinct outcome so the
    /// caller can count them against the account.
    #[instrument(skip(self, password))]
    pub async fn verify_password(&self, email: &str, password: &str) -> Result<GrantOutcome> {
        let mut url = endpoint_url(&self.base_url, "/auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let payload = json!({
            "email": email,
            "password": password,
        });

        let response = self
            .client
            .post(url.clone())
            .header("apikey", self.anon_key.expose_secret())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let session: Session = response.json().await?;
            return Ok(GrantOutcome::Granted(session));
        }

        let json_response: Value = response.json().await?;
        if status.is_client_error() {
            if let Some(code) = error_code(&json_response) {
                if DENIAL_CODES.contains(&code) {
                    debug!("Credential check denied: {code}");
                    return Ok(GrantOutcome::Denied);
                }
            }
        }

        Err(anyhow!(
            "{} - {}, {}",
            url,
            status,
            error_message(&json_response)
        ))
    }

    /// Exchange the one-time code from a confirmation or OAuth redirect for a
    /// session. The code is user-supplied material, so any 4xx is a denial.
    #[instrument(skip(self, code, code_verifier))]
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<GrantOutcome> {
        let mut url = endpoint_url(&self.base_url, "/auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "pkce");

        let payload = json!({
            "auth_code": code,
            "code_verifier": code_verifier,
        });

        let response = self
            .client
            .post(url.clone())
            .header("apikey", self.anon_key.expose_secret())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let session: Session = response.json().await?;
            return Ok(GrantOutcome::Granted(session));
        }

        if status.is_client_error() {
            debug!("Code exchange denied: {status}");
            return Ok(GrantOutcome::Denied);
        }

        let json_response: Value = response.json().await?;
        Err(anyhow!(
            "{} - {}, {}",
            url,
            status,
            error_message(&json_response)
        ))
    }

    /// Ask the hosted service to send a password-reset email. The reset link
    /// redirects to `redirect_to` on the web app.
    #[instrument(skip(self))]
    pub async fn send_recovery(&self, email: &str, redirect_to: &str) -> Result<()> {
        let mut url = endpoint_url(&self.base_url, "/auth/v1/recover")?;
        url.query_pairs_mut().append_pair("redirect_to", redirect_to);

        let payload = json!({ "email": email });

        let response = self
            .client
            .post(url.clone())
            .header("apikey", self.anon_key.expose_secret())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let json_response: Value = response.json().await?;
        Err(anyhow!(
            "{} - {}, {}",
            url,
            status,
            error_message(&json_response)
        ))
    }

    /// Set a new password for the user behind `access_token` (the recovery
    /// session from the reset email).
    #[instrument(skip(self, access_token, new_password))]
    pub async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<PasswordUpdate> {
        let url = endpoint_url(&self.base_url, "/auth/v1/user")?;

        let payload = json!({ "password": new_password });

        let response = self
            .client
            .put(url.clone())
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(access_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let user: AuthUser = response.json().await?;
            return Ok(PasswordUpdate::Updated(user));
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(PasswordUpdate::Unauthorized);
        }

        let json_response: Value = response.json().await?;
        Err(anyhow!(
            "{} - {}, {}",
            url,
            status,
            error_message(&json_response)
        ))
    }

    /// Revoke the session behind `access_token`. A token the service no
    /// longer recognizes is already signed out.
    #[instrument(skip(self, access_token))]
    pub async fn logout(&self, access_token: &str) -> Result<()> {
        let url = endpoint_url(&self.base_url, "/auth/v1/logout")?;

        let response = self
            .client
            .post(url.clone())
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            return Ok(());
        }

        let json_response: Value = response.json().await?;
        Err(anyhow!(
            "{} - {}, {}",
            url,
            status,
            error_message(&json_response)
        ))
    }

    /// Browser entry point for the OAuth handshake. The provider negotiation
    /// happens entirely at the hosted service.
    /// # Errors
    /// Returns an error if the configured base URL is invalid.
    pub fn authorize_url(&self, provider: &str, redirect_to: &str) -> Result<Url> {
        let mut url = endpoint_url(&self.base_url, "/auth/v1/authorize")?;
        url.query_pairs_mut()
            .append_pair("provider", provider)
            .append_pair("redirect_to", redirect_to);
        Ok(url)
    }
}

/// Error code of a hosted-service error body, old and new shapes.
fn error_code(value: &Value) -> Option<&str> {
    value["error_code"]
        .as_str()
        .or_else(|| value["error"].as_str())
}

/// Human-readable message of a hosted-service error body.
fn error_message(value: &Value) -> &str {
    value["msg"]
        .as_str()
        .or_else(|| value["error_description"].as_str())
        .or_else(|| value["message"].as_str())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AuthClient {
        AuthClient::new(
            "https://abc.backend.dev",
            SecretString::from("anon-key".to_string()),
        )
        .expect("client should build")
    }

    #[test]
    fn authorize_url_carries_provider_and_redirect() {
        let url = client()
            .authorize_url("github", "https://app.monujo.app/auth/callback")
            .expect("authorize url should build");

        assert_eq!(url.path(), "/auth/v1/authorize");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert!(pairs.contains(&("provider".to_string(), "github".to_string())));
        assert!(pairs.contains(&(
            "redirect_to".to_string(),
            "https://app.monujo.app/auth/callback".to_string()
        )));
    }

    #[test]
    fn authorize_url_encodes_redirect() {
        let url = client()
            .authorize_url("google", "http://localhost:5173/auth/callback?next=/budget")
            .expect("authorize url should build");
        assert!(url.as_str().contains("redirect_to="));
        assert!(!url.query().unwrap_or("").contains(" "));
    }

    #[test]
    fn session_parses_from_token_response() {
        let body = json!({
            "access_token": "at",
            "refresh_token": "rt",
            "token_type": "bearer",
            "expires_in": 3600,
            "user": {
                "id": "7f0a3c5e-8a5f-4be0-9a83-5ab0c5a9f0a1",
                "email": "a@x.com",
                "user_metadata": { "display_name": "Ada" }
            }
        });
        let session: Session = serde_json::from_value(body).expect("session should parse");
        assert_eq!(session.expires_in, 3600);
        assert_eq!(session.user.email, "a@x.com");
        assert_eq!(session.user.display_name(), Some("Ada"));
    }

    #[test]
    fn user_without_metadata_has_no_display_name() {
        let body = json!({
            "id": "7f0a3c5e-8a5f-4be0-9a83-5ab0c5a9f0a1",
            "email": "a@x.com"
        });
        let user: AuthUser = serde_json::from_value(body).expect("user should parse");
        assert_eq!(user.display_name(), None);
    }

    #[test]
    fn error_code_reads_both_shapes() {
        let new_shape = json!({ "code": 400, "error_code": "invalid_credentials", "msg": "Invalid login credentials" });
        assert_eq!(error_code(&new_shape), Some("invalid_credentials"));
        assert_eq!(error_message(&new_shape), "Invalid login credentials");

        let old_shape = json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" });
        assert_eq!(error_code(&old_shape), Some("invalid_grant"));
        assert_eq!(error_message(&old_shape), "Invalid login credentials");

        let empty = json!({});
        assert_eq!(error_code(&empty), None);
        assert_eq!(error_message(&empty), "");
    }

    #[test]
    fn denial_codes_cover_the_token_endpoint() {
        assert!(DENIAL_CODES.contains(&"invalid_credentials"));
        assert!(DENIAL_CODES.contains(&"invalid_grant"));
        assert!(!DENIAL_CODES.contains(&"over_request_rate_limit"));
    }
}
