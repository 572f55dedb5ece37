//! Backend strategies and their selection.

mod forward;
mod mock;
mod rest;
mod sdk;

pub use forward::ForwardBackend;
pub use mock::MockBackend;
pub use rest::RestBackend;
pub use sdk::{SdkBackend, WatsonSession};

use crate::{
    InferenceBackend,
    config::{BackendKind, ProxyConfig},
    error::BackendError,
};
use std::{sync::Arc, time::Duration};

/// Creates the backend named by the configuration.
///
/// Credentials are not checked here; a misconfigured real backend still
/// starts and reports the problem on each request.
pub fn from_config(config: &ProxyConfig) -> Result<Arc<dyn InferenceBackend>, BackendError> {
    let backend: Arc<dyn InferenceBackend> = match &config.backend {
        BackendKind::Mock => Arc::new(MockBackend),
        BackendKind::Forward(url) => Arc::new(ForwardBackend::new(url.clone())?),
        BackendKind::Rest => Arc::new(RestBackend::new(config.watson.clone())?),
        BackendKind::Sdk => Arc::new(SdkBackend::new(config.watson.clone())),
    };
    Ok(backend)
}

/// Builds an HTTP client that gives up after `timeout`.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, BackendError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BackendError::Unavailable(format!("failed to build HTTP client: {e}")))
}

/// Sends a prepared request and decodes the JSON answer.
///
/// Non-2xx answers become [`BackendError::Status`]; their body is dropped.
pub(crate) async fn send_json(
    request: reqwest::RequestBuilder,
    origin: &'static str,
    timeout: Duration,
) -> Result<serde_json::Value, BackendError> {
    let timeout_secs = timeout.as_secs();
    let response = request
        .send()
        .await
        .map_err(|e| BackendError::from_transport(e, timeout_secs))?;

    let status = response.status();
    if !status.is_success() {
        log::warn!("{origin} answered with status {status}");
        return Err(BackendError::Status { origin, status });
    }

    response.json().await.map_err(|e| {
        if e.is_timeout() {
            BackendError::Timeout(timeout_secs)
        } else {
            BackendError::Decode(e)
        }
    })
}
