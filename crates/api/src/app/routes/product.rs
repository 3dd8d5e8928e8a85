use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use gemcart_catalog::{NewProduct, ProductPatch};
use gemcart_infra::lifecycle::LifecycleError;

use crate::app::dto::{self, IdRequest, UpdateRequest};
use crate::app::errors;
use crate::app::routes::common;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route(
        "/",
        get(list_products)
            .post(create_product)
            .put(update_product)
            .delete(delete_product),
    )
}

/// Products newest first, each with its category populated as `{_id, name}`.
pub async fn populated_products(services: &AppServices) -> Result<Vec<serde_json::Value>, LifecycleError> {
    let products = services.products.list().await?;
    let categories = services.categories.list().await?;
    let names = dto::category_names(&categories);
    Ok(products.iter().map(|p| dto::product_to_json(p, &names)).collect())
}

pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match populated_products(&services).await {
        Ok(products) => (StatusCode::OK, Json(json!({ "products": products }))).into_response(),
        Err(e) => errors::lifecycle_error_to_response(e, "Failed to fetch products"),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewProduct>, JsonRejection>,
) -> Response {
    common::create(&services.products, body).await
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<UpdateRequest<ProductPatch>>, JsonRejection>,
) -> Response {
    common::update(&services.products, body).await
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<IdRequest>, JsonRejection>,
) -> Response {
    common::delete(
        &services.products,
        body,
        "Product and associated images deleted successfully",
    )
    .await
}
