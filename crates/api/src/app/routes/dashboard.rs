use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub async fn dashboard(Extension(services): Extension<Arc<AppServices>>) -> Response {
    let loaded = async {
        let products = services.products.list().await?;
        let categories = services.categories.list().await?;
        Ok::<_, gemcart_infra::lifecycle::LifecycleError>((products, categories))
    }
    .await;

    match loaded {
        Ok((products, categories)) => {
            (StatusCode::OK, Json(dto::dashboard(&products, &categories))).into_response()
        }
        Err(e) => errors::lifecycle_error_to_response(e, "Failed to load dashboard"),
    }
}
