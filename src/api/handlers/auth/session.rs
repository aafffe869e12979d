//! Session sign-out.

use super::{utils::bearer_token, RETRY_MESSAGE};
use crate::backend::auth::AuthClient;
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{error, instrument};

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    params(
        ("Authorization" = String, Header, description = "Bearer token of the session to revoke")
    ),
    responses(
        (status = 204, description = "Session revoked"),
        (status = 401, description = "Missing session token", body = String),
        (status = 502, description = "Hosted auth service unavailable", body = String)
    ),
    tag = "auth"
)]
#[instrument(skip(headers, auth))]
pub async fn logout(headers: HeaderMap, auth: Extension<Arc<AuthClient>>) -> impl IntoResponse {
    let Some(token) = bearer_token(&headers) else {
        return (StatusCode::UNAUTHORIZED, "Missing session token".to_string()).into_response();
    };

    match auth.logout(token).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!("Logout failed: {err}");
            (StatusCode::BAD_GATEWAY, RETRY_MESSAGE.to_string()).into_response()
        }
    }
}
