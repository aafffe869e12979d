use crate::{
    api::handlers::auth::AuthState,
    backend::{auth::AuthClient, profiles::ProfileClient},
    cli::globals::GlobalArgs,
};
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub(crate) mod handlers;
mod openapi;

pub use openapi::ApiDoc;

/// Build the application router with all routes and layers.
///
/// # Errors
/// Returns an error if the configured site URL cannot be turned into a CORS
/// origin.
pub fn router(state: AuthState, auth: AuthClient, profiles: ProfileClient) -> Result<Router> {
    let origin = site_origin(state.site_url())?;
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(AllowOrigin::exact(origin));

    let app = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health::health))
        .route("/v1/auth/signup", post(handlers::auth::signup::signup))
        .route("/v1/auth/login", post(handlers::auth::login::login))
        .route("/v1/auth/logout", post(handlers::auth::session::logout))
        .route(
            "/v1/auth/password/forgot",
            post(handlers::auth::password::forgot_password),
        )
        .route(
            "/v1/auth/password/reset",
            post(handlers::auth::password::reset_password),
        )
        .route(
            "/v1/auth/oauth/:provider",
            get(handlers::auth::oauth::oauth_redirect),
        )
        .route("/v1/auth/callback", post(handlers::auth::callback::exchange))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_request: &Request<Body>| {
                        HeaderValue::from_str(Ulid::new().to_string().as_str()).ok()
                    },
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(Arc::new(state)))
                .layer(Extension(Arc::new(auth)))
                .layer(Extension(Arc::new(profiles))),
        );

    Ok(app)
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, globals: &GlobalArgs) -> Result<()> {
    let auth = AuthClient::new(&globals.backend_url, globals.anon_key.clone())?;
    let profiles = ProfileClient::new(&globals.backend_url, globals.service_key.clone())?;
    let state = AuthState::new(&globals.site_url);

    let app = router(state, auth, profiles)?;

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn site_origin(site_url: &str) -> Result<HeaderValue> {
    let parsed =
        Url::parse(site_url).with_context(|| format!("Invalid site URL: {site_url}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("Site URL must include a valid host: {site_url}"))?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build site origin header")
}
