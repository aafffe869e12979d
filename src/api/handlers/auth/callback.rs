//! One-time code exchange for email-confirmation and OAuth redirects.
//!
//! Confirmation links and OAuth handshakes both land on the web app's
//! callback route with a one-time code; the app posts it here and gets a
//! session back.

use super::{
    login::settle_after_grant,
    types::{CallbackRequest, SessionResponse},
    RETRY_MESSAGE,
};
use crate::backend::{
    auth::{AuthClient, GrantOutcome},
    profiles::ProfileClient,
};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::{error, instrument};

#[utoipa::path(
    post,
    path = "/v1/auth/callback",
    request_body = CallbackRequest,
    responses(
        (status = 200, description = "Code exchanged for a session", body = SessionResponse),
        (status = 400, description = "Missing code", body = String),
        (status = 401, description = "Invalid or expired code", body = String),
        (status = 502, description = "Hosted auth service unavailable", body = String)
    ),
    tag = "auth"
)]
#[instrument(skip(auth, profiles, payload))]
pub async fn exchange(
    auth: Extension<Arc<AuthClient>>,
    profiles: Extension<Arc<ProfileClient>>,
    payload: Option<Json<CallbackRequest>>,
) -> impl IntoResponse {
    let request: CallbackRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let code = request.code.trim();
    if code.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing code".to_string()).into_response();
    }

    match auth
        .exchange_code(code, request.code_verifier.as_deref())
        .await
    {
        Ok(GrantOutcome::Granted(session)) => {
            // An exchanged code is an authentication success: the profile row
            // appears here on the first sign-in, and a dirty lockout record
            // is reset.
            let profile = match profiles.fetch_by_email(&session.user.email).await {
                Ok(profile) => profile,
                Err(err) => {
                    error!("Profile lookup failed: {err}");
                    None
                }
            };
            settle_after_grant(&profiles, profile.as_ref(), &session).await;
            (StatusCode::OK, Json(SessionResponse::from(session))).into_response()
        }
        Ok(GrantOutcome::Denied) => (
            StatusCode::UNAUTHORIZED,
            "Invalid or expired code".to_string(),
        )
            .into_response(),
        Err(err) => {
            error!("Code exchange failed: {err}");
            (StatusCode::BAD_GATEWAY, RETRY_MESSAGE.to_string()).into_response()
        }
    }
}
