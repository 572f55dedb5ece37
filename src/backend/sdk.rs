use super::send_json;
use crate::{
    InferenceBackend, InferenceRequest,
    config::{WatsonCredentials, WatsonSettings},
    error::BackendError,
};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::OnceCell;

const MAX_NEW_TOKENS: u32 = 512;
const TEMPERATURE: f64 = 0.2;

#[derive(Debug, Serialize)]
struct GenerationBody<'a> {
    input: &'a str,
    model_id: &'a str,
    project_id: &'a str,
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    image: String,
    max_new_tokens: u32,
    temperature: f64,
}

/// A configured watsonx.ai generation client, built once and reused.
pub struct WatsonSession {
    client: reqwest::Client,
    endpoint: String,
    model_id: String,
    project_id: String,
}

impl WatsonSession {
    /// Validates the credentials and prepares an authenticated client.
    pub fn connect(settings: &WatsonSettings) -> Result<Self, BackendError> {
        let WatsonCredentials {
            api_key,
            url,
            project_id,
            model_id,
        } = settings.credentials().map_err(BackendError::Unavailable)?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| BackendError::Unavailable("WATSON_API_KEY is not a valid header".into()))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| BackendError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{url}/ml/v1/text/generation?version={}",
                settings.api_version
            ),
            model_id,
            project_id,
        })
    }

    /// Generates text for a prompt, with the image passed as a parameter.
    pub async fn generate(
        &self,
        prompt: &str,
        image_base64: String,
        settings: &WatsonSettings,
    ) -> Result<Value, BackendError> {
        let body = GenerationBody {
            input: prompt,
            model_id: &self.model_id,
            project_id: &self.project_id,
            parameters: GenerationParameters {
                image: image_base64,
                max_new_tokens: MAX_NEW_TOKENS,
                temperature: TEMPERATURE,
            },
        };
        let builder = self.client.post(&self.endpoint).json(&body);
        send_json(builder, "Watson API", settings.timeout).await
    }
}

/// Backend holding a lazily-initialized [`WatsonSession`].
///
/// The session is built on the first request and shared by every later one.
/// Concurrent first requests wait on the same initialization. A failed
/// initialization is not cached, so a later request tries again.
pub struct SdkBackend {
    settings: WatsonSettings,
    session: OnceCell<WatsonSession>,
    connects: AtomicUsize,
}

impl SdkBackend {
    pub fn new(settings: WatsonSettings) -> Self {
        Self {
            settings,
            session: OnceCell::new(),
            connects: AtomicUsize::new(0),
        }
    }

    async fn session(&self) -> Result<&WatsonSession, BackendError> {
        self.session
            .get_or_try_init(|| async {
                self.connects.fetch_add(1, Ordering::Relaxed);
                log::info!("Initializing Watson session");
                WatsonSession::connect(&self.settings)
            })
            .await
    }

    /// How many times a session was built, successfully or not.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl InferenceBackend for SdkBackend {
    fn name(&self) -> &'static str {
        "sdk"
    }

    async fn infer(&self, prompt: &str, request: &InferenceRequest) -> Result<Value, BackendError> {
        let session = self.session().await?;
        session
            .generate(prompt, request.image_base64(), &self.settings)
            .await
    }
}
