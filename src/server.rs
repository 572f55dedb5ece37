use crate::{
    engine::InferenceEngine,
    error::ProxyError,
    messages::{ErrorBody, InferenceReply},
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub const INFER_ROUTE: &str = "/api/watson/infer";

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Builds the proxy router around a shared engine.
pub fn router(engine: Arc<InferenceEngine>) -> Router {
    Router::new()
        .route("/", get(|| async { "Watson inference proxy is running" }))
        .route(INFER_ROUTE, post(post_infer))
        .layer(CorsLayer::permissive())
        .with_state(engine)
}

// The body is parsed by hand so that any content type is accepted and a
// missing or broken body is reported like any other validation error.
async fn post_infer(
    State(engine): State<Arc<InferenceEngine>>,
    body: Bytes,
) -> Result<(StatusCode, Json<InferenceReply>), ProxyError> {
    let body: Option<Value> = serde_json::from_slice(&body).ok();

    match engine.infer_body(body.as_ref()).await {
        Ok(result) => {
            log::info!("Inference served by {}", engine.backend_name());
            Ok((StatusCode::OK, Json(result)))
        }
        Err(err) => {
            match &err {
                ProxyError::Validation(e) => log::warn!("Rejected request: {e}"),
                ProxyError::Backend(e) => log::error!("Inference failed: {}", error_chain(e)),
            }
            Err(err)
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    message
}
