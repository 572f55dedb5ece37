use axum::{Json, Router, http::StatusCode, routing::post};
use serde_json::{Value, json};
use std::{collections::HashMap, sync::Arc};
use watson_infernum::{
    InferenceBackend, InferenceEngine, InferenceRequest, ProxyConfig,
    backend::{self, MockBackend},
    error::BackendError,
    prompt::PromptTemplates,
    server::{self, INFER_ROUTE},
};

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });
    format!("http://{addr}")
}

async fn spawn_proxy(backend: Arc<dyn InferenceBackend>) -> String {
    let engine = Arc::new(InferenceEngine::new(backend, PromptTemplates::default()));
    spawn(server::router(engine)).await
}

async fn post_json(base: &str, body: &Value) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(format!("{base}{INFER_ROUTE}"))
        .json(body)
        .send()
        .await
        .unwrap();
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
    (status, response.json().await.unwrap())
}

struct FixedBackend(Value);

#[async_trait::async_trait]
impl InferenceBackend for FixedBackend {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn infer(&self, _: &str, _: &InferenceRequest) -> Result<Value, BackendError> {
        Ok(self.0.clone())
    }
}

#[tokio::test]
async fn missing_image_is_bad_request() {
    let base = spawn_proxy(Arc::new(MockBackend)).await;
    for body in [
        json!({ "type": "analyze" }),
        json!({ "type": "navigate", "base64Image": "" }),
    ] {
        let (status, body) = post_json(&base, &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing base64Image");
    }
}

#[tokio::test]
async fn unsupported_kind_is_bad_request() {
    let base = spawn_proxy(Arc::new(MockBackend)).await;
    let (status, body) = post_json(&base, &json!({ "type": "describe", "base64Image": "AAAA" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unsupported type. Use 'analyze' or 'navigate'.");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let base = spawn_proxy(Arc::new(MockBackend)).await;
    let response = reqwest::Client::new()
        .post(format!("{base}{INFER_ROUTE}"))
        .header("content-type", "text/plain")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Missing JSON body");
}

#[tokio::test]
async fn body_without_json_content_type_is_accepted() {
    let base = spawn_proxy(Arc::new(MockBackend)).await;
    let response = reqwest::Client::new()
        .post(format!("{base}{INFER_ROUTE}"))
        .body(r#"{"type":"analyze","base64Image":"AAAA"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn mock_navigate_embeds_instruction() {
    let base = spawn_proxy(Arc::new(MockBackend)).await;
    let (status, body) = post_json(
        &base,
        &json!({
            "type": "navigate",
            "base64Image": "data:image/jpeg;base64,AAAA",
            "instruction": "turn left",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["text"].as_str().unwrap().contains("turn left"));
}

#[tokio::test]
async fn backend_shapes_are_normalized() {
    let cases = [
        (json!({ "results": [{ "generated_text": "hello" }] }), "hello"),
        (json!({ "results": [{ "output": "x" }] }), "x"),
        (json!({ "text": "direct" }), "direct"),
        (json!({}), "{}"),
    ];
    for (response, expected) in cases {
        let base = spawn_proxy(Arc::new(FixedBackend(response))).await;
        let (status, body) =
            post_json(&base, &json!({ "type": "analyze", "base64Image": "AAAA" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "text": expected }));
    }
}

#[tokio::test]
async fn missing_credentials_is_server_error() {
    let vars = HashMap::from([
        ("USE_MOCK".to_string(), "false".to_string()),
        ("WATSON_BACKEND".to_string(), "rest".to_string()),
    ]);
    let config = ProxyConfig::from_vars(&vars).unwrap();
    let base = spawn_proxy(backend::from_config(&config).unwrap()).await;

    let (status, body) = post_json(&base, &json!({ "type": "analyze", "base64Image": "AAAA" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Watson client not configured: missing WATSON_API_KEY")
    );
}

#[tokio::test]
async fn forwarding_chains_two_proxies() {
    let downstream = spawn_proxy(Arc::new(MockBackend)).await;
    let vars = HashMap::from([
        ("USE_MOCK".to_string(), "false".to_string()),
        (
            "NETLIFY_FUNCTION_URL".to_string(),
            format!("{downstream}{INFER_ROUTE}"),
        ),
    ]);
    let config = ProxyConfig::from_vars(&vars).unwrap();
    let upstream = spawn_proxy(backend::from_config(&config).unwrap()).await;

    let (status, body) = post_json(
        &upstream,
        &json!({ "type": "navigate", "base64Image": "AAAA", "instruction": "go" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["text"].as_str().unwrap().contains("'go'"));
}

#[tokio::test]
async fn forwarding_passes_downstream_answer_through() {
    let downstream = spawn(Router::new().route(
        INFER_ROUTE,
        post(|| async { Json(json!({ "text": "hi", "model": "m1" })) }),
    ))
    .await;
    let vars = HashMap::from([
        ("USE_MOCK".to_string(), "false".to_string()),
        (
            "NETLIFY_FUNCTION_URL".to_string(),
            format!("{downstream}{INFER_ROUTE}"),
        ),
    ]);
    let config = ProxyConfig::from_vars(&vars).unwrap();
    let upstream = spawn_proxy(backend::from_config(&config).unwrap()).await;

    let (status, body) = post_json(&upstream, &json!({ "type": "analyze", "base64Image": "AAAA" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "text": "hi", "model": "m1" }));
}

#[tokio::test]
async fn forwarding_failure_is_generic_server_error() {
    let downstream = spawn(Router::new().route(
        INFER_ROUTE,
        post(|| async {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "downstream detail" })),
            )
        }),
    ))
    .await;
    let vars = HashMap::from([
        ("USE_MOCK".to_string(), "false".to_string()),
        (
            "NETLIFY_FUNCTION_URL".to_string(),
            format!("{downstream}{INFER_ROUTE}"),
        ),
    ]);
    let config = ProxyConfig::from_vars(&vars).unwrap();
    let upstream = spawn_proxy(backend::from_config(&config).unwrap()).await;

    let (status, body) = post_json(&upstream, &json!({ "type": "analyze", "base64Image": "AAAA" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "Netlify function error: 503 Service Unavailable"
    );
}

#[tokio::test]
async fn root_reports_liveness() {
    let base = spawn_proxy(Arc::new(MockBackend)).await;
    let response = reqwest::get(&base).await.unwrap();
    assert!(response.status().is_success());
}
