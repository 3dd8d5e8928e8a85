use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use gemcart_auth::Registration;

use crate::app::errors::{self, Envelope};
use crate::app::routes::common;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/register", post(register))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Registration>, JsonRejection>,
) -> Response {
    let registration = match common::json_body(body, Envelope::Message) {
        Ok(r) => r,
        Err(res) => return res,
    };

    match services.register_user(registration).await {
        Ok(user) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "User registered successfully",
                "user": user,
            })),
        )
            .into_response(),
        Err(e) => errors::lifecycle_failure(Envelope::Message, e, "Failed to register user"),
    }
}
