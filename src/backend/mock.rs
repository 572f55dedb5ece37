use crate::{InferenceBackend, InferenceKind, InferenceRequest, error::BackendError};
use serde_json::{Value, json};

const ANALYZE_RESPONSE: &str = "Looking ahead, you're facing a busy urban street with a wide \
sidewalk on the right side. There are several people walking along the sidewalk - two people \
are about 10 feet ahead walking in the same direction, and a person with a bag is approaching \
from the opposite direction about 15 feet away. The environment appears to be a commercial \
district with storefronts visible on the right side, including what looks like a shop with a \
red awning. The sidewalk is clear of major obstacles, with the edge of the street clearly \
defined by a curb to your left, and the path ahead looks safe to continue walking straight.";

/// Returns canned answers without touching the network.
#[derive(Clone, Copy, Debug, Default)]
pub struct MockBackend;

impl MockBackend {
    /// The canned text for a request.
    pub fn canned_text(request: &InferenceRequest) -> String {
        match request.kind {
            InferenceKind::Analyze => ANALYZE_RESPONSE.to_string(),
            InferenceKind::Navigate => format!(
                "Following your direction to '{}', I can see the path ahead looks clear and \
                 safe. The sidewalk continues straight ahead with a few pedestrians maintaining \
                 good spacing - there's no immediate obstacles to worry about. The storefront on \
                 your right provides a good reference point, and the street curb on your left is \
                 well-defined. You can confidently continue straight ahead at a normal walking \
                 pace, and the next 20-30 feet of sidewalk appear obstacle-free.",
                request.instruction.as_deref().unwrap_or_default()
            ),
        }
    }
}

#[async_trait::async_trait]
impl InferenceBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn infer(&self, _prompt: &str, request: &InferenceRequest) -> Result<Value, BackendError> {
        log::debug!("Answering {} request from mock", request.kind.as_str());
        Ok(json!({ "text": Self::canned_text(request) }))
    }
}
