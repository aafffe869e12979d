//! Sign-in: the credential gate with lockout bookkeeping.

use super::{
    types::{LoginRequest, SessionResponse},
    utils::{normalize_email, valid_email},
    RETRY_MESSAGE,
};
use crate::backend::{
    auth::{AuthClient, GrantOutcome, Session},
    profiles::{Profile, ProfileClient},
};
use crate::lockout::LockoutState;
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::{error, instrument, warn};

pub(crate) const LOCKED_MESSAGE: &str =
    "Account locked after too many failed attempts. Reset your password to unlock it.";
pub(crate) const INVALID_CREDENTIALS_MESSAGE: &str = "Incorrect email or password.";

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 401, description = "Incorrect credentials", body = String),
        (status = 403, description = "Account locked", body = String),
        (status = 502, description = "Hosted auth service unavailable", body = String)
    ),
    tag = "auth"
)]
#[instrument(skip(auth, profiles, payload))]
pub async fn login(
    auth: Extension<Arc<AuthClient>>,
    profiles: Extension<Arc<ProfileClient>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }
    if request.password.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing password".to_string()).into_response();
    }

    // Read the lockout record before the credential check: a locked account
    // is rejected whatever the password is. A failed read only skips the
    // bookkeeping for this attempt.
    let profile = match profiles.fetch_by_email(&email).await {
        Ok(profile) => profile,
        Err(err) => {
            error!("Profile lookup failed: {err}");
            None
        }
    };

    if let Some(profile) = &profile {
        if profile.lockout().is_blocked() {
            return (StatusCode::FORBIDDEN, LOCKED_MESSAGE.to_string()).into_response();
        }
    }

    match auth.verify_password(&email, &request.password).await {
        Ok(GrantOutcome::Granted(session)) => {
            settle_after_grant(&profiles, profile.as_ref(), &session).await;
            (StatusCode::OK, Json(SessionResponse::from(session))).into_response()
        }
        Ok(GrantOutcome::Denied) => {
            // No profile row means nothing to count; the message stays the
            // same either way.
            if let Some(profile) = profile {
                let state = profile.lockout().record_failure();
                if let Err(err) = profiles.update_lockout(profile.id, state).await {
                    warn!("Failed-attempt update failed: {err}");
                }
            }
            (
                StatusCode::UNAUTHORIZED,
                INVALID_CREDENTIALS_MESSAGE.to_string(),
            )
                .into_response()
        }
        Err(err) => {
            error!("Credential check failed: {err}");
            (StatusCode::BAD_GATEWAY, RETRY_MESSAGE.to_string()).into_response()
        }
    }
}

/// Post-grant bookkeeping: reset a dirty lockout record, or create the
/// profile row on the first sign-in after confirmation. Best-effort; the
/// session is already granted.
pub(super) async fn settle_after_grant(
    profiles: &ProfileClient,
    profile: Option<&Profile>,
    session: &Session,
) {
    match profile {
        Some(profile) if !profile.lockout().is_clean() => {
            if let Err(err) = profiles
                .update_lockout(profile.id, LockoutState::reset())
                .await
            {
                warn!("Lockout reset failed: {err}");
            }
        }
        Some(_) => {}
        None => {
            let user = &session.user;
            if let Err(err) = profiles
                .insert(user.id, &user.email, user.display_name())
                .await
            {
                warn!("Profile insert failed: {err}");
            }
        }
    }
}
