//! Process configuration.
//!
//! Values come from the environment, optionally completed by a dotenv-style
//! file. A key already present in the environment is never overridden by the
//! file.

use crate::{
    error::ConfigError,
    prompt::{DEFAULT_EXPLORE_PROMPT, DEFAULT_NAV_PROMPT_TEMPLATE, PromptTemplates},
};
use std::{collections::HashMap, path::Path, time::Duration};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_API_VERSION: &str = "2024-07-01";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Which backend serves inference requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// Canned answers, no network.
    Mock,
    /// Relay to another instance of this proxy.
    Forward(String),
    /// Direct `model_inference` REST call.
    Rest,
    /// Lazily-initialized generation client.
    Sdk,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Mock => "mock",
            BackendKind::Forward(_) => "forward",
            BackendKind::Rest => "rest",
            BackendKind::Sdk => "sdk",
        }
    }
}

/// Connection settings for watsonx.ai. Every field is required for the real
/// backends, but missing ones are only reported when a backend needs them.
#[derive(Clone, Debug, Default)]
pub struct WatsonSettings {
    pub api_key: Option<String>,
    pub url: Option<String>,
    pub project_id: Option<String>,
    pub model_id: Option<String>,
    pub api_version: String,
    pub timeout: Duration,
}

/// A complete set of watsonx.ai credentials.
#[derive(Clone, Debug)]
pub struct WatsonCredentials {
    pub api_key: String,
    pub url: String,
    pub project_id: String,
    pub model_id: String,
}

impl WatsonSettings {
    /// Returns the credentials, or the list of missing keys.
    pub fn credentials(&self) -> Result<WatsonCredentials, String> {
        let fields = [
            ("WATSON_API_KEY", &self.api_key),
            ("WATSON_URL", &self.url),
            ("WATSON_PROJECT_ID", &self.project_id),
            ("WATSON_MODEL_ID", &self.model_id),
        ];
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(key, _)| *key)
            .collect();
        if !missing.is_empty() {
            return Err(format!("missing {}", missing.join(", ")));
        }

        let get = |value: &Option<String>| value.clone().unwrap_or_default();
        Ok(WatsonCredentials {
            api_key: get(&self.api_key),
            url: get(&self.url).trim_end_matches('/').to_string(),
            project_id: get(&self.project_id),
            model_id: get(&self.model_id),
        })
    }
}

/// Everything the proxy needs to start.
#[derive(Clone, Debug)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub backend: BackendKind,
    pub prompts: PromptTemplates,
    pub watson: WatsonSettings,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            backend: BackendKind::Mock,
            prompts: PromptTemplates::default(),
            watson: WatsonSettings {
                api_version: DEFAULT_API_VERSION.to_string(),
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                ..Default::default()
            },
        }
    }
}

impl ProxyConfig {
    /// Loads the configuration from the process environment, completed by
    /// `env_file` when it exists.
    pub fn load(env_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut vars = match env_file {
            Some(path) if path.exists() => read_env_file(path)?,
            Some(path) => {
                log::debug!("env file {} not found, skipping", path.display());
                HashMap::new()
            }
            None => HashMap::new(),
        };
        // environment wins over the file
        vars.extend(std::env::vars());
        Self::from_vars(&vars)
    }

    /// Builds the configuration from an explicit key/value map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value: value.to_string(),
            })?,
            None => defaults.port,
        };

        let timeout = match get("WATSON_TIMEOUT_SECS") {
            Some(value) => value
                .parse()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "WATSON_TIMEOUT_SECS",
                    value: value.to_string(),
                })?,
            None => defaults.watson.timeout,
        };

        let use_mock = get("USE_MOCK").is_none_or(|value| value.eq_ignore_ascii_case("true"));
        let backend = if use_mock {
            BackendKind::Mock
        } else if let Some(url) = get("NETLIFY_FUNCTION_URL") {
            BackendKind::Forward(url.to_string())
        } else {
            match get("WATSON_BACKEND").map(str::to_ascii_lowercase).as_deref() {
                None | Some("sdk") => BackendKind::Sdk,
                Some("rest") => BackendKind::Rest,
                Some(other) => {
                    return Err(ConfigError::InvalidValue {
                        key: "WATSON_BACKEND",
                        value: other.to_string(),
                    });
                }
            }
        };

        let prompts = PromptTemplates::new(
            get("WATSON_EXPLORE_PROMPT").unwrap_or(DEFAULT_EXPLORE_PROMPT),
            get("WATSON_NAV_PROMPT_TEMPLATE").unwrap_or(DEFAULT_NAV_PROMPT_TEMPLATE),
        )
        .ok_or(ConfigError::MissingPlaceholder)?;

        let owned = |key: &str| get(key).map(str::to_string);
        Ok(Self {
            host: owned("HOST").unwrap_or(defaults.host),
            port,
            backend,
            prompts,
            watson: WatsonSettings {
                api_key: owned("WATSON_API_KEY"),
                url: owned("WATSON_URL"),
                project_id: owned("WATSON_PROJECT_ID"),
                model_id: owned("WATSON_MODEL_ID"),
                api_version: owned("WATSON_API_VERSION").unwrap_or(defaults.watson.api_version),
                timeout,
            },
        })
    }

    /// The `host:port` pair the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_env_file(&contents))
}

/// Parses `KEY=VALUE` lines. Blank lines, `#` comments and lines without `=`
/// are skipped; surrounding quotes are stripped from values.
pub fn parse_env_file(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .filter_map(|(key, value)| {
            let key = key.trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (!key.is_empty()).then(|| (key.to_string(), value.to_string()))
        })
        .collect()
}
