use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use gemcart_catalog::{CategoryPatch, NewCategory};

use crate::app::dto::{IdRequest, UpdateRequest};
use crate::app::errors;
use crate::app::routes::common;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route(
        "/",
        get(list_categories)
            .post(create_category)
            .put(update_category)
            .delete(delete_category),
    )
}

pub async fn list_categories(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.categories.list().await {
        Ok(categories) => (StatusCode::OK, Json(json!({ "categories": categories }))).into_response(),
        Err(e) => errors::lifecycle_error_to_response(e, "Failed to fetch categories"),
    }
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewCategory>, JsonRejection>,
) -> Response {
    common::create(&services.categories, body).await
}

pub async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<UpdateRequest<CategoryPatch>>, JsonRejection>,
) -> Response {
    common::update(&services.categories, body).await
}

pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<IdRequest>, JsonRejection>,
) -> Response {
    common::delete(
        &services.categories,
        body,
        "Category and associated image deleted successfully",
    )
    .await
}
