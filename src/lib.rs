//! A small HTTP proxy in front of watsonx.ai vision-language models.
//!
//! Callers post an image with an optional instruction, the proxy builds the
//! prompt, hands it to an [`InferenceBackend`] and normalizes whatever the
//! backend answers into a single `{ "text": ... }` result. Forwarded answers
//! are relayed as they come.

pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod messages;
pub mod prompt;
pub mod request;
pub mod server;

pub use config::{BackendKind, ProxyConfig};
pub use engine::InferenceEngine;
pub use error::{BackendError, ConfigError, ProxyError, ValidationError};
pub use request::{InferenceKind, InferenceRequest};

use serde_json::Value;

/// Trait for the services that actually run inference.
///
/// Implementors receive the fully built prompt together with the validated
/// request (image bytes, kind and instruction) and return the backend's raw
/// JSON answer. Normalizing that answer is not their concern, and backends
/// whose answer is already final opt out of it with [`passthrough`].
///
/// [`passthrough`]: InferenceBackend::passthrough
#[async_trait::async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether the answer is returned to the caller as-is instead of being
    /// reduced to `{ "text": ... }`.
    fn passthrough(&self) -> bool {
        false
    }

    /// Runs inference for one request.
    async fn infer(&self, prompt: &str, request: &InferenceRequest) -> Result<Value, BackendError>;
}
