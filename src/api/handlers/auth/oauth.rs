//! OAuth sign-in entry point.
//!
//! This service only points the browser at the hosted `authorize` endpoint;
//! the provider negotiation happens entirely over there. The redirect lands
//! back on the web app, which finishes through `/v1/auth/callback`.

use super::state::AuthState;
use crate::backend::auth::AuthClient;
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use std::sync::Arc;
use tracing::{error, instrument};

/// Providers enabled for Monujo sign-in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    GitHub,
    Apple,
}

impl OAuthProvider {
    pub(super) fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "google" => Some(Self::Google),
            "github" => Some(Self::GitHub),
            "apple" => Some(Self::Apple),
            _ => None,
        }
    }

    pub(super) const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::GitHub => "github",
            Self::Apple => "apple",
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/auth/oauth/{provider}",
    params(
        ("provider" = String, Path, description = "OAuth provider: google, github or apple")
    ),
    responses(
        (status = 303, description = "Redirect to the hosted OAuth entry point"),
        (status = 400, description = "Unsupported provider", body = String)
    ),
    tag = "auth"
)]
#[instrument(skip(auth, state))]
pub async fn oauth_redirect(
    auth: Extension<Arc<AuthClient>>,
    state: Extension<Arc<AuthState>>,
    Path(provider): Path<String>,
) -> impl IntoResponse {
    let Some(provider) = OAuthProvider::parse(&provider) else {
        return (StatusCode::BAD_REQUEST, "Unsupported provider".to_string()).into_response();
    };

    match auth.authorize_url(provider.as_str(), &state.callback_url()) {
        Ok(url) => Redirect::to(url.as_str()).into_response(),
        Err(err) => {
            error!("Authorize URL failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "OAuth sign-in unavailable".to_string(),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_providers_case_insensitive() {
        assert_eq!(OAuthProvider::parse("google"), Some(OAuthProvider::Google));
        assert_eq!(OAuthProvider::parse("GitHub"), Some(OAuthProvider::GitHub));
        assert_eq!(OAuthProvider::parse("APPLE"), Some(OAuthProvider::Apple));
    }

    #[test]
    fn parse_rejects_unknown_providers() {
        assert_eq!(OAuthProvider::parse("facebook"), None);
        assert_eq!(OAuthProvider::parse(""), None);
    }

    #[test]
    fn as_str_round_trips() {
        for provider in [
            OAuthProvider::Google,
            OAuthProvider::GitHub,
            OAuthProvider::Apple,
        ] {
            assert_eq!(OAuthProvider::parse(provider.as_str()), Some(provider));
        }
    }
}
