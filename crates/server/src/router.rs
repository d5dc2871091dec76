//! HTTP router construction.
//!
//! Assembles all Axum routes and middleware into a single `Router`.

use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use bidboard_shape::{Announcements, Companies, Evaluations, Orderers, Partners};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::state::AppState;

/// CORS for the single frontend origin. Credentials are allowed, so the
/// origin has to be exact.
pub fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin: HeaderValue = origin
        .parse()
        .with_context(|| format!("CORS_ORIGIN is not a valid header value: {origin:?}"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(api::root))
        .route("/health", get(api::health))
        .route("/api/evaluations", get(api::list::<Evaluations>))
        // legacy path of the evaluations listing
        .route("/api/result", get(api::list::<Evaluations>))
        .route("/api/announcements", get(api::list::<Announcements>))
        .route("/api/companies", get(api::list::<Companies>))
        .route("/api/orderers", get(api::list::<Orderers>))
        .route("/api/partners", get(api::list::<Partners>))
        // the fallback also sits under the CORS layer, so preflights on any path get answered
        .fallback(api::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
