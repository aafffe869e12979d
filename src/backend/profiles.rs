//! Client for the profiles table behind the hosted REST interface.
//!
//! The table is reached through the generated REST surface (`eq.` filters,
//! `Prefer` headers), never by direct SQL. Calls authenticate with the
//! service-role key; browsers never see this key, which is why the lockout
//! bookkeeping lives in this service.

use super::{endpoint_url, http_client};
use crate::lockout::LockoutState;
use anyhow::{anyhow, Result};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;
use url::Url;
use uuid::Uuid;

const SELECT_COLUMNS: &str = "id,email,display_name,failed_attempts,locked";

/// A row of the profiles table. The id matches the auth user identity.
/// `failed_attempts` is non-negative by construction; a negative value in a
/// row is a data error and fails deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub failed_attempts: u32,
    pub locked: bool,
}

impl Profile {
    #[must_use]
    pub const fn lockout(&self) -> LockoutState {
        LockoutState::new(self.failed_attempts, self.locked)
    }
}

#[derive(Debug, Clone)]
pub struct ProfileClient {
    client: Client,
    base_url: String,
    service_key: SecretString,
}

impl ProfileClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, service_key: SecretString) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.to_string(),
            service_key,
        })
    }

    fn table_url(&self) -> Result<Url> {
        endpoint_url(&self.base_url, "/rest/v1/profiles")
    }

    /// Look up a profile by email. Emails are stored normalized, so callers
    /// pass the normalized form.
    #[instrument(skip(self))]
    pub async fn fetch_by_email(&self, email: &str) -> Result<Option<Profile>> {
        let mut url = self.table_url()?;
        url.query_pairs_mut()
            .append_pair("select", SELECT_COLUMNS)
            .append_pair("email", &format!("eq.{email}"));

        let response = self
            .client
            .get(url.clone())
            .header("apikey", self.service_key.expose_secret())
            .bearer_auth(self.service_key.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("{} - {}, {}", url, status, body));
        }

        let mut rows: Vec<Profile> = response.json().await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    /// Write the lockout fields of a profile. Counter and flag travel
    /// together so the record never holds a half-applied transition.
    #[instrument(skip(self))]
    pub async fn update_lockout(&self, id: Uuid, state: LockoutState) -> Result<()> {
        let mut url = self.table_url()?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{id}"));

        let payload = json!({
            "failed_attempts": state.failed_attempts,
            "locked": state.locked,
        });

        let response = self
            .client
            .patch(url.clone())
            .header("apikey", self.service_key.expose_secret())
            .bearer_auth(self.service_key.expose_secret())
            .header("Prefer", "return=minimal")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("{} - {}, {}", url, status, body));
        }

        Ok(())
    }

    /// Insert the profile row on first sign-in after confirmation. A row
    /// that already exists (a concurrent first sign-in) is left untouched.
    #[instrument(skip(self, display_name))]
    pub async fn insert(&self, id: Uuid, email: &str, display_name: Option<&str>) -> Result<()> {
        let mut url = self.table_url()?;
        url.query_pairs_mut().append_pair("on_conflict", "id");

        let payload = json!({
            "id": id,
            "email": email,
            "display_name": display_name,
        });

        let response = self
            .client
            .post(url.clone())
            .header("apikey", self.service_key.expose_secret())
            .bearer_auth(self.service_key.expose_secret())
            .header("Prefer", "return=minimal,resolution=ignore-duplicates")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("{} - {}, {}", url, status, body));
        }

        Ok(())
    }
}
