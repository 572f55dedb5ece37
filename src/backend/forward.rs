use super::{http_client, send_json};
use crate::{InferenceBackend, InferenceRequest, error::BackendError};
use serde_json::Value;
use std::time::Duration;

const FORWARD_TIMEOUT: Duration = Duration::from_secs(30);

/// Relays requests to another instance of this proxy.
pub struct ForwardBackend {
    url: String,
    client: reqwest::Client,
}

impl ForwardBackend {
    pub fn new(url: String) -> Result<Self, BackendError> {
        Ok(Self {
            url,
            client: http_client(FORWARD_TIMEOUT)?,
        })
    }
}

#[async_trait::async_trait]
impl InferenceBackend for ForwardBackend {
    fn name(&self) -> &'static str {
        "forward"
    }

    // the downstream instance already normalized its answer
    fn passthrough(&self) -> bool {
        true
    }

    async fn infer(&self, _prompt: &str, request: &InferenceRequest) -> Result<Value, BackendError> {
        log::debug!("Forwarding {} request to {}", request.kind.as_str(), self.url);
        // the downstream instance builds its own prompt from the original body
        let builder = self.client.post(&self.url).json(request.body());
        send_json(builder, "Netlify function", FORWARD_TIMEOUT).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::json;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });
        format!("http://{addr}/api/watson/infer")
    }

    fn request() -> InferenceRequest {
        let body = json!({
            "type": "navigate",
            "base64Image": "data:image/png;base64,AAAA",
            "instruction": "go",
        });
        InferenceRequest::from_body(Some(&body)).unwrap()
    }

    #[tokio::test]
    async fn test_relays_body_unmodified() {
        let url = serve(Router::new().route(
            "/api/watson/infer",
            post(|Json(body): Json<Value>| async move { Json(json!({ "echo": body })) }),
        ))
        .await;

        let backend = ForwardBackend::new(url).unwrap();
        let response = backend.infer("prompt", &request()).await.unwrap();
        assert_eq!(response["echo"], *request().body());
    }

    #[tokio::test]
    async fn test_non_success_hides_downstream_body() {
        let url = serve(Router::new().route(
            "/api/watson/infer",
            post(|| async { (StatusCode::BAD_GATEWAY, "secret downstream detail") }),
        ))
        .await;

        let backend = ForwardBackend::new(url).unwrap();
        let err = backend.infer("prompt", &request()).await.unwrap_err();
        assert!(matches!(
            err,
            BackendError::Status {
                status: reqwest::StatusCode::BAD_GATEWAY,
                ..
            }
        ));
        assert!(!err.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn test_unreachable_downstream() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api/watson/infer", listener.local_addr().unwrap());
        drop(listener);

        let backend = ForwardBackend::new(url).unwrap();
        let err = backend.infer("prompt", &request()).await.unwrap_err();
        assert!(matches!(err, BackendError::CallFailed(_)));
    }
}
