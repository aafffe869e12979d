//! Sign-up: validation, then delegation to the hosted signup endpoint.

use super::{
    types::{MessageResponse, SignupRequest},
    utils::{normalize_email, valid_email, valid_password, MIN_PASSWORD_LENGTH},
    RETRY_MESSAGE,
};
use crate::backend::auth::{AuthClient, SignupOutcome};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::{error, instrument};

pub(crate) const SIGNUP_MESSAGE: &str = "Account created. Check your inbox to confirm your email.";
const CONFLICT_MESSAGE: &str = "An account with this email already exists.";

#[utoipa::path(
    post,
    path = "/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created, confirmation email sent", body = MessageResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 409, description = "Email already registered", body = String),
        (status = 502, description = "Hosted auth service unavailable", body = String)
    ),
    tag = "auth"
)]
#[instrument(skip(auth, payload))]
pub async fn signup(
    auth: Extension<Arc<AuthClient>>,
    payload: Option<Json<SignupRequest>>,
) -> impl IntoResponse {
    let request: SignupRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }
    if !valid_password(&request.password) {
        return (
            StatusCode::BAD_REQUEST,
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        )
            .into_response();
    }
    if let Some(confirm) = &request.confirm_password {
        if confirm != &request.password {
            return (StatusCode::BAD_REQUEST, "Passwords do not match".to_string())
                .into_response();
        }
    }

    let display_name = request
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    // The profile row is not created here: that happens on the first
    // successful sign-in after the email is confirmed.
    match auth.sign_up(&email, &request.password, display_name).await {
        Ok(SignupOutcome::Created) => (
            StatusCode::CREATED,
            Json(MessageResponse {
                message: SIGNUP_MESSAGE.to_string(),
            }),
        )
            .into_response(),
        Ok(SignupOutcome::Conflict) => {
            (StatusCode::CONFLICT, CONFLICT_MESSAGE.to_string()).into_response()
        }
        Err(err) => {
            error!("Signup failed: {err}");
            (StatusCode::BAD_GATEWAY, RETRY_MESSAGE.to_string()).into_response()
        }
    }
}
