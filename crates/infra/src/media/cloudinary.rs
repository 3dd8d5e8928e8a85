//! Cloudinary Admin/Upload API client (destroy only).
//!
//! Requests are signed with SHA-256 (`sha256(params + api_secret)`), so the
//! Cloudinary account must have SHA-256 signatures enabled.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::{DestroyOutcome, MediaError, MediaHost};

pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";

#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Overridable for tests and regional endpoints.
    pub api_base: String,
    pub timeout: Duration,
}

impl core::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

pub struct CloudinaryClient {
    http: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Result<Self, MediaError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MediaError::Transport(format!("failed to build http client: {e}")))?;
        Ok(Self { http, config })
    }

    fn destroy_url(&self) -> String {
        format!(
            "{}/v1_1/{}/image/destroy",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    /// Signature over the alphabetically sorted `key=value` pairs.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let digest = Sha256::digest(format!("{to_sign}{}", self.config.api_secret).as_bytes());
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }
}

#[async_trait]
impl MediaHost for CloudinaryClient {
    async fn destroy(&self, public_id: &str) -> Result<DestroyOutcome, MediaError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("public_id", public_id), ("timestamp", timestamp.as_str())]);

        let res = self
            .http
            .post(self.destroy_url())
            .form(&[
                ("public_id", public_id),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.config.api_key.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MediaError::Timeout(self.config.timeout)
                } else {
                    MediaError::Transport(e.to_string())
                }
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(MediaError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: DestroyResponse = res
            .json()
            .await
            .map_err(|e| MediaError::Decode(e.to_string()))?;
        debug!(public_id, result = %body.result, "cloudinary destroy result");

        Ok(match body.result.as_str() {
            "ok" => DestroyOutcome::Deleted,
            "not found" => DestroyOutcome::NotFound,
            _ => DestroyOutcome::Other(body.result),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, routing::post, Form, Json, Router};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

    /// Minimal stand-in for the destroy endpoint.
    async fn destroy(
        State(seen): State<Seen>,
        Form(form): Form<HashMap<String, String>>,
    ) -> axum::response::Response {
        let public_id = form.get("public_id").cloned().unwrap_or_default();
        seen.lock().unwrap().push(form);
        match public_id.as_str() {
            "shop/missing" => Json(serde_json::json!({ "result": "not found" })).into_response(),
            "shop/broken" => (StatusCode::BAD_GATEWAY, "upstream down").into_response(),
            _ => Json(serde_json::json!({ "result": "ok" })).into_response(),
        }
    }

    async fn spawn_fake() -> (String, Seen, tokio::task::JoinHandle<()>) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/v1_1/demo/image/destroy", post(destroy))
            .with_state(seen.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), seen, handle)
    }

    fn client(api_base: String) -> CloudinaryClient {
        CloudinaryClient::new(CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key-123".to_string(),
            api_secret: "shh".to_string(),
            api_base,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn signature_sorts_params_and_appends_secret() {
        let c = client(DEFAULT_API_BASE.to_string());
        let sig = c.sign(&[("timestamp", "1700000000"), ("public_id", "shop/ring")]);

        let expected = Sha256::digest(b"public_id=shop/ring&timestamp=1700000000shh");
        let expected: String = expected.iter().map(|b| format!("{b:02x}")).collect();
        assert_eq!(sig, expected);
        assert_eq!(sig.len(), 64);
    }

    #[test]
    fn debug_output_redacts_the_secret() {
        let c = client(DEFAULT_API_BASE.to_string());
        let out = format!("{:?}", c.config);
        assert!(!out.contains("shh"));
    }

    #[tokio::test]
    async fn destroy_maps_host_results() {
        let (base, seen, handle) = spawn_fake().await;
        let c = client(base);

        assert_eq!(c.destroy("shop/ring").await.unwrap(), DestroyOutcome::Deleted);
        assert_eq!(c.destroy("shop/missing").await.unwrap(), DestroyOutcome::NotFound);

        let err = c.destroy("shop/broken").await.unwrap_err();
        assert!(matches!(err, MediaError::Status { status: 502, .. }));
        assert!(err.is_transient());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0]["api_key"], "key-123");
        assert_eq!(seen[0]["signature"].len(), 64);
        handle.abort();
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transient_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(format!("http://{addr}")).destroy("shop/ring").await.unwrap_err();
        assert!(err.is_transient());
    }
}
