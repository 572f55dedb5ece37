use super::{http_client, send_json};
use crate::{
    InferenceBackend, InferenceRequest,
    config::{WatsonCredentials, WatsonSettings},
    error::BackendError,
};
use serde::Serialize;
use serde_json::Value;

/// Body of a `model_inference` call.
#[derive(Debug, Serialize)]
struct ModelInferenceBody<'a> {
    model: &'a str,
    project: &'a str,
    inputs: [ModelInput<'a>; 2],
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ModelInput<'a> {
    Image { data: String, mime: &'a str },
    Text { text: &'a str },
}

/// Calls the `model_inference` endpoint directly, one request per inference.
pub struct RestBackend {
    settings: WatsonSettings,
    client: reqwest::Client,
}

impl RestBackend {
    pub fn new(settings: WatsonSettings) -> Result<Self, BackendError> {
        let client = http_client(settings.timeout)?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self, creds: &WatsonCredentials) -> String {
        format!(
            "{}/v1/projects/{}/model_inference?version={}",
            creds.url, creds.project_id, self.settings.api_version
        )
    }
}

#[async_trait::async_trait]
impl InferenceBackend for RestBackend {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn infer(&self, prompt: &str, request: &InferenceRequest) -> Result<Value, BackendError> {
        let creds = self
            .settings
            .credentials()
            .map_err(BackendError::Unavailable)?;

        let body = ModelInferenceBody {
            model: &creds.model_id,
            project: &creds.project_id,
            inputs: [
                ModelInput::Image {
                    data: request.image_base64(),
                    mime: &request.mime,
                },
                ModelInput::Text { text: prompt },
            ],
        };

        let endpoint = self.endpoint(&creds);
        log::debug!("POST {endpoint}");
        let builder = self
            .client
            .post(endpoint)
            .bearer_auth(&creds.api_key)
            .json(&body);
        send_json(builder, "Watson API", self.settings.timeout).await
    }
}
