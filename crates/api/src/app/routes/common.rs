//! Handler bodies shared by the product and category admin routes.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use gemcart_catalog::CatalogEntity;
use gemcart_core::RecordKind;
use gemcart_infra::lifecycle::LifecycleManager;

use crate::app::dto::{self, IdRequest, UpdateRequest};
use crate::app::errors::{self, Envelope};

/// Unwrap a JSON body or answer 400.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>, envelope: Envelope) -> Result<T, Response> {
    body.map(|Json(inner)| inner)
        .map_err(|rejection| errors::bad_json(envelope, rejection))
}

pub async fn create<E: CatalogEntity>(
    manager: &LifecycleManager<E>,
    body: Result<Json<E::Draft>, JsonRejection>,
) -> Response {
    let kind = E::KIND;
    let draft = match json_body(body, Envelope::Error) {
        Ok(d) => d,
        Err(res) => return res,
    };

    match manager.create(draft).await {
        Ok(entity) => (
            StatusCode::CREATED,
            Json(json!({
                "message": format!("{} created successfully", kind.label()),
                kind.as_str(): entity,
            })),
        )
            .into_response(),
        Err(e) => errors::lifecycle_error_to_response(e, &failed("create", kind)),
    }
}

pub async fn update<E: CatalogEntity>(
    manager: &LifecycleManager<E>,
    body: Result<Json<UpdateRequest<E::Patch>>, JsonRejection>,
) -> Response {
    let kind = E::KIND;
    let request = match json_body(body, Envelope::Error) {
        Ok(r) => r,
        Err(res) => return res,
    };
    let id = match dto::require_id(request.id.as_deref(), kind) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match manager.update(id, request.patch).await {
        Ok(entity) => (
            StatusCode::OK,
            Json(json!({
                "message": format!("{} updated successfully", kind.label()),
                kind.as_str(): entity,
            })),
        )
            .into_response(),
        Err(e) => errors::lifecycle_error_to_response(e, &failed("update", kind)),
    }
}

/// `message` differs per kind ("... associated image" vs "... images").
pub async fn delete<E: CatalogEntity>(
    manager: &LifecycleManager<E>,
    body: Result<Json<IdRequest>, JsonRejection>,
    message: &'static str,
) -> Response {
    let kind = E::KIND;
    let request = match json_body(body, Envelope::Error) {
        Ok(r) => r,
        Err(res) => return res,
    };
    let id = match dto::require_id(request.id.as_deref(), kind) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match manager.delete(id).await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "message": message,
                format!("{}Id", kind.as_str()): id,
                "mediaCleanup": report,
            })),
        )
            .into_response(),
        Err(e) => errors::lifecycle_error_to_response(e, &failed("delete", kind)),
    }
}

/// Generic 500 text, e.g. "Failed to delete product".
pub fn failed(operation: &str, kind: RecordKind) -> String {
    format!("Failed to {operation} {kind}")
}
