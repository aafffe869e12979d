use super::handlers::{auth, health};
use crate::api::handlers::auth::types::{
    CallbackRequest, ForgotPasswordRequest, LoginRequest, MessageResponse, ResetPasswordRequest,
    SessionResponse, SessionUser, SignupRequest,
};
use utoipa::OpenApi;

/// The OpenAPI document. Endpoint annotations live on the handlers; routes
/// added outside (like `/` or the docs UI) are intentionally not documented.
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::signup::signup,
        auth::login::login,
        auth::session::logout,
        auth::password::forgot_password,
        auth::password::reset_password,
        auth::oauth::oauth_redirect,
        auth::callback::exchange,
    ),
    components(schemas(
        SignupRequest,
        LoginRequest,
        ForgotPasswordRequest,
        ResetPasswordRequest,
        CallbackRequest,
        MessageResponse,
        SessionResponse,
        SessionUser,
    )),
    tags(
        (name = "monujo-auth", description = "Authentication service for Monujo"),
        (name = "auth", description = "Sign-up, sign-in, and password recovery"),
    )
)]
pub struct ApiDoc;
