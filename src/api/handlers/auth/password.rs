//! Password recovery: the unlock path.
//!
//! Requesting a reset email answers the same way whether or not the account
//! exists. Completing a reset requires the recovery session from the email
//! link and always clears the lockout record.

use super::{
    state::AuthState,
    types::{ForgotPasswordRequest, MessageResponse, ResetPasswordRequest},
    utils::{bearer_token, normalize_email, valid_email, valid_password, MIN_PASSWORD_LENGTH},
    RETRY_MESSAGE,
};
use crate::backend::{
    auth::{AuthClient, PasswordUpdate},
    profiles::ProfileClient,
};
use crate::lockout::LockoutState;
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{error, instrument, warn};

pub(crate) const FORGOT_MESSAGE: &str = "If that email is registered, a reset link is on its way.";
const RESET_MESSAGE: &str = "Password updated. You can sign in now.";

#[utoipa::path(
    post,
    path = "/v1/auth/password/forgot",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 202, description = "Reset email queued when the account exists", body = MessageResponse),
        (status = 400, description = "Validation error", body = String)
    ),
    tag = "auth"
)]
#[instrument(skip(auth, state, payload))]
pub async fn forgot_password(
    auth: Extension<Arc<AuthClient>>,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<ForgotPasswordRequest>>,
) -> impl IntoResponse {
    let request: ForgotPasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    // Uniform answer even on upstream failure: this endpoint must not leak
    // whether an account exists.
    if let Err(err) = auth
        .send_recovery(&email, &state.reset_password_url())
        .await
    {
        error!("Recovery email request failed: {err}");
    }

    (
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: FORGOT_MESSAGE.to_string(),
        }),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/v1/auth/password/reset",
    request_body = ResetPasswordRequest,
    params(
        ("Authorization" = String, Header, description = "Bearer token of the recovery session")
    ),
    responses(
        (status = 200, description = "Password updated, account unlocked", body = MessageResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 401, description = "Missing or rejected recovery token", body = String),
        (status = 502, description = "Hosted auth service unavailable", body = String)
    ),
    tag = "auth"
)]
#[instrument(skip(headers, auth, profiles, payload))]
pub async fn reset_password(
    headers: HeaderMap,
    auth: Extension<Arc<AuthClient>>,
    profiles: Extension<Arc<ProfileClient>>,
    payload: Option<Json<ResetPasswordRequest>>,
) -> impl IntoResponse {
    let Some(token) = bearer_token(&headers) else {
        return (
            StatusCode::UNAUTHORIZED,
            "Missing recovery token".to_string(),
        )
            .into_response();
    };

    let request: ResetPasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    if !valid_password(&request.password) {
        return (
            StatusCode::BAD_REQUEST,
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        )
            .into_response();
    }

    match auth.update_password(token, &request.password).await {
        Ok(PasswordUpdate::Updated(user)) => {
            // A completed reset always unlocks: counter and flag reset
            // together. Best-effort, like every lockout write.
            if let Err(err) = profiles.update_lockout(user.id, LockoutState::reset()).await {
                warn!("Unlock after reset failed: {err}");
            }
            (
                StatusCode::OK,
                Json(MessageResponse {
                    message: RESET_MESSAGE.to_string(),
                }),
            )
                .into_response()
        }
        Ok(PasswordUpdate::Unauthorized) => (
            StatusCode::UNAUTHORIZED,
            "Invalid or expired recovery token".to_string(),
        )
            .into_response(),
        Err(err) => {
            error!("Password update failed: {err}");
            (StatusCode::BAD_GATEWAY, RETRY_MESSAGE.to_string()).into_response()
        }
    }
}
