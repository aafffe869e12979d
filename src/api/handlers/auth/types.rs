//! Request/response types for auth endpoints.

use crate::backend::auth::Session;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: Option<String>,
    pub display_name: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetPasswordRequest {
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CallbackRequest {
    pub code: String,
    pub code_verifier: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// The hosted session handed back to the web app. Token refresh is the
/// client's business, against the hosted service directly.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: SessionUser,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        let display_name = session.user.display_name().map(str::to_string);
        Self {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            token_type: session.token_type,
            expires_in: session.expires_in,
            user: SessionUser {
                id: session.user.id.to_string(),
                email: session.user.email,
                display_name,
            },
        }
    }
}
