//! JSON bodies exchanged on `/api/watson/infer`.

use serde::{Deserialize, Serialize};

/// What a client posts. The server validates the raw JSON instead of this
/// type so that malformed bodies get the right error, but clients build it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InferRequestBody {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "base64Image")]
    pub base64_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
}

/// Successful answer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InferenceResult {
    pub text: String,
}

/// What the endpoint answers with on success.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum InferenceReply {
    /// Text extracted from the backend's answer.
    Text(InferenceResult),
    /// The backend's answer, untouched.
    Raw(serde_json::Value),
}

impl InferenceReply {
    /// The extracted text, if the reply was normalized.
    pub fn text(&self) -> Option<&str> {
        match self {
            InferenceReply::Text(result) => Some(&result.text),
            InferenceReply::Raw(_) => None,
        }
    }
}

/// Error envelope used for every non-200 answer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
