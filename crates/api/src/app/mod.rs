//! HTTP application wiring (axum router + shared services).
//!
//! - `services.rs`: collaborator wiring (stores, media host, lifecycle managers)
//! - `routes/`: handlers, one file per resource
//! - `dto.rs`: request bodies and response shaping
//! - `errors.rs`: error envelope and status mapping

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::Level;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Request bodies larger than this are rejected with 413 Payload Too Large.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Full router: admin API, storefront API and health check.
pub fn build_app(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/admin/api", routes::admin_router())
        .nest("/api", routes::storefront::router())
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(LatencyUnit::Millis),
                        ),
                )
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
                .layer(Extension(services)),
        )
}
