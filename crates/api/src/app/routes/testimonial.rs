use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use gemcart_catalog::NewTestimonial;

use crate::app::errors::{self, Envelope};
use crate::app::routes::common;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/", get(list_testimonials).post(create_testimonial))
}

/// Bare array, newest first.
pub async fn list_testimonials(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.testimonials_list().await {
        Ok(testimonials) => (StatusCode::OK, Json(testimonials)).into_response(),
        Err(e) => errors::lifecycle_failure(Envelope::Message, e, "Error fetching testimonials"),
    }
}

pub async fn create_testimonial(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewTestimonial>, JsonRejection>,
) -> Response {
    let draft = match common::json_body(body, Envelope::Message) {
        Ok(d) => d,
        Err(res) => return res,
    };

    match services.testimonial_create(draft).await {
        Ok(testimonial) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Testimonial created successfully",
                "testimonial": testimonial,
            })),
        )
            .into_response(),
        Err(e) => errors::lifecycle_failure(Envelope::Message, e, "Error creating testimonial"),
    }
}
