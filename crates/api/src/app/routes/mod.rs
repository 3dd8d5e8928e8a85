use axum::{routing::get, Router};

pub mod auth;
pub mod category;
pub mod common;
pub mod dashboard;
pub mod product;
pub mod storefront;
pub mod system;
pub mod testimonial;

/// Catalog management endpoints, mounted under `/admin/api`.
pub fn admin_router() -> Router {
    Router::new()
        .nest("/category", category::router())
        .nest("/product", product::router())
        .nest("/testimonial", testimonial::router())
        .route("/dashboard", get(dashboard::dashboard))
}
