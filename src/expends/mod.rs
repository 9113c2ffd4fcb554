//! Router wiring and server bootstrap.

pub mod envelope;
pub mod error;
pub mod handlers;
mod openapi;

pub use openapi::openapi;

use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::{delete, get, patch, post},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

use crate::store::SharedStore;
use handlers::{auth, health, statements};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the full application router.
///
/// Takes the shared state explicitly so tests can drive the exact same
/// routes against an in-memory store.
#[must_use]
pub fn router(auth_state: Arc<auth::AuthState>, store: SharedStore) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/register", post(auth::register::register))
        .route("/login", post(auth::login::login))
        .route("/refresh-token", post(auth::refresh::refresh_token))
        .route("/logout", post(auth::refresh::logout))
        .route("/create-statement", post(statements::create_statement))
        .route(
            "/delete-statement/:id",
            delete(statements::delete_statement),
        )
        .route("/get-statement/:id", get(statements::get_statement))
        .route("/get-all-statements", get(statements::get_all_statements))
        .route("/update-statement", patch(statements::update_statement))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static(REQUEST_ID_HEADER),
                    |_req: &Request<Body>| {
                        HeaderValue::from_str(Ulid::new().to_string().as_str()).ok()
                    },
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    REQUEST_ID_HEADER,
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(auth_state))
                .layer(Extension(store)),
        )
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path().to_string(), |p| p.as_str().to_string());

    info_span!(
        "http.request",
        method = %request.method(),
        path = %path,
        request_id = %request_id,
    )
}

/// Start the server.
///
/// # Errors
/// Returns an error if the listener cannot bind or the server fails.
pub async fn new(port: u16, auth_state: Arc<auth::AuthState>, store: SharedStore) -> Result<()> {
    let app = router(auth_state, store);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
