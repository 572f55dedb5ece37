use crate::{
    InferenceBackend, InferenceRequest,
    error::ProxyError,
    extract::extract_text,
    messages::{InferenceReply, InferenceResult},
    prompt::PromptTemplates,
};
use serde_json::Value;
use std::{sync::Arc, time::Instant};

/// Runs one request end to end: validation, prompt, backend call, extraction.
///
/// The engine holds no mutable state, so a single instance is shared by every
/// handler and a request dropped halfway leaves nothing behind. The backend is
/// injected, which lets tests swap in fakes without touching the environment.
pub struct InferenceEngine {
    backend: Arc<dyn InferenceBackend>,
    prompts: PromptTemplates,
}

impl InferenceEngine {
    pub fn new(backend: Arc<dyn InferenceBackend>, prompts: PromptTemplates) -> Self {
        Self { backend, prompts }
    }

    /// Name of the backend serving requests.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Validates a raw body and runs it.
    pub async fn infer_body(&self, body: Option<&Value>) -> Result<InferenceReply, ProxyError> {
        let request = InferenceRequest::from_body(body)?;
        self.infer(&request).await
    }

    /// Runs a validated request.
    ///
    /// Answers from passthrough backends are returned untouched, every other
    /// answer is reduced to its text.
    pub async fn infer(&self, request: &InferenceRequest) -> Result<InferenceReply, ProxyError> {
        let prompt = self
            .prompts
            .build(request.kind, request.instruction.as_deref());

        log::debug!(
            "Scheduling {} inference on {} ({} image bytes)",
            request.kind.as_str(),
            self.backend.name(),
            request.image.len()
        );

        let start_time = Instant::now();
        let response = self.backend.infer(&prompt, request).await?;
        log::debug!("Inference completed in {:?}", start_time.elapsed());

        if self.backend.passthrough() {
            return Ok(InferenceReply::Raw(response));
        }
        Ok(InferenceReply::Text(InferenceResult {
            text: extract_text(&response),
        }))
    }
}
