//! HTTP handlers.

pub(crate) mod auth;
pub(crate) mod health;

use axum::response::IntoResponse;

// axum handler for the undocumented banner route
pub(crate) async fn root() -> impl IntoResponse {
    concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"))
}
