//! Read-only listings for the public storefront.

use std::sync::Arc;

use axum::{extract::Extension, response::Response, routing::get, Router};

use crate::app::routes::{auth, category, product, testimonial};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/products", get(products))
        .route("/categories", get(categories))
        .route("/testimonials", get(testimonials))
        .nest("/auth", auth::router())
}

pub async fn products(services: Extension<Arc<AppServices>>) -> Response {
    product::list_products(services).await
}

pub async fn categories(services: Extension<Arc<AppServices>>) -> Response {
    category::list_categories(services).await
}

pub async fn testimonials(services: Extension<Arc<AppServices>>) -> Response {
    testimonial::list_testimonials(services).await
}
