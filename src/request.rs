use crate::error::ValidationError;
use base64::{
    Engine, alphabet,
    engine::{
        DecodePaddingMode,
        general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD as BASE64},
    },
};
use serde_json::Value;

/// MIME type assumed when the image carries no data-URI prefix.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

// Clients send padded, unpadded and URL-safe payloads alike.
const LENIENT_CONFIG: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);
const LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT_CONFIG);
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT_CONFIG);

/// The two kinds of inference the proxy understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InferenceKind {
    /// Describe the scene in the image.
    Analyze,
    /// Turn a navigation instruction into a single safe command.
    Navigate,
}

impl InferenceKind {
    /// Parses the wire value of the `type` field.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "analyze" => Some(InferenceKind::Analyze),
            "navigate" => Some(InferenceKind::Navigate),
            _ => None,
        }
    }

    /// Returns the kind as its wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            InferenceKind::Analyze => "analyze",
            InferenceKind::Navigate => "navigate",
        }
    }
}

/// A request that passed validation.
#[derive(Clone, Debug)]
pub struct InferenceRequest {
    /// What the caller wants done with the image.
    pub kind: InferenceKind,
    /// Decoded image bytes, never empty.
    pub image: Vec<u8>,
    /// MIME type taken from the data-URI prefix, or [`DEFAULT_IMAGE_MIME`].
    pub mime: String,
    /// Optional instruction, only meaningful for [`InferenceKind::Navigate`].
    pub instruction: Option<String>,
    body: Value,
}

impl InferenceRequest {
    /// Validates a raw request body.
    ///
    /// Checks run in order: body, image presence, kind, image decoding.
    pub fn from_body(body: Option<&Value>) -> Result<Self, ValidationError> {
        let fields = match body {
            Some(Value::Object(fields)) if !fields.is_empty() => fields,
            _ => return Err(ValidationError::MissingBody),
        };

        let raw_image = fields
            .get("base64Image")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::MissingImage)?;

        let kind = fields
            .get("type")
            .and_then(Value::as_str)
            .and_then(InferenceKind::parse)
            .ok_or(ValidationError::UnsupportedKind)?;

        let (mime, payload) = split_data_uri(raw_image);
        let image = decode_image(payload.trim())?;
        if image.is_empty() {
            return Err(ValidationError::MissingImage);
        }

        let instruction = fields
            .get("instruction")
            .and_then(Value::as_str)
            .map(str::to_owned);

        Ok(Self {
            kind,
            image,
            mime: mime.unwrap_or(DEFAULT_IMAGE_MIME).to_string(),
            instruction,
            body: body.cloned().unwrap_or_default(),
        })
    }

    /// The body exactly as the caller sent it.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// The image re-encoded as standard base64 without any prefix.
    pub fn image_base64(&self) -> String {
        BASE64.encode(&self.image)
    }
}

/// Decodes standard or URL-safe base64, with or without padding.
pub fn decode_image(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    LENIENT
        .decode(payload)
        .or_else(|_| LENIENT_URL_SAFE.decode(payload))
}

/// Strips a `data:<mime>;base64,` prefix.
///
/// Returns the MIME type found in the prefix (if any) and the remainder. A
/// value without a comma is returned unchanged.
pub fn split_data_uri(value: &str) -> (Option<&str>, &str) {
    if !value.starts_with("data:") {
        return (None, value);
    }
    let Some((header, payload)) = value.split_once(',') else {
        return (None, value);
    };
    let mime = header
        .trim_start_matches("data:")
        .split(';')
        .next()
        .filter(|m| !m.is_empty());
    (mime, payload)
}
