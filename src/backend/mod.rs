//! Clients for the hosted backend.
//!
//! Two collaborators live behind one base URL: the managed auth API under
//! `/auth/v1` and the profiles table behind the REST interface under
//! `/rest/v1`. Everything here is request/response plumbing; no credential
//! or token material is produced locally.

pub mod auth;
pub mod profiles;

use crate::APP_USER_AGENT;
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Timeout applied to every backend call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(APP_USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

/// Build an endpoint URL from the configured base URL, normalizing the port
/// and rejecting anything that is not plain http(s).
pub(crate) fn endpoint_url(base_url: &str, endpoint: &str) -> Result<Url> {
    let url = Url::parse(base_url)?;

    let scheme = url.scheme();

    let host = url
        .host()
        .ok_or_else(|| anyhow!("Error parsing URL: no host specified"))?
        .to_owned();

    let port = match url.port() {
        Some(p) => p,
        None => match scheme {
            "http" => 80,
            "https" => 443,
            _ => return Err(anyhow!("Error parsing URL: unsupported scheme {}", scheme)),
        },
    };

    Url::parse(&format!("{scheme}://{host}:{port}{endpoint}"))
        .with_context(|| format!("Invalid endpoint: {endpoint}"))
}
