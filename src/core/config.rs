//! Assistant configuration with documented defaults
//!
//! Configuration comes from three layers, applied in order:
//! built-in defaults, an optional TOML file, then environment variables.
//! The pipeline itself only consumes the instruction templates; everything
//! else is bootstrap for the inference client and the HTTP service.

use crate::core::error::{IdaError, Result};
use crate::llm::client::Stage;
use crate::llm::prompts::{ANSWER_PROMPT, COMMAND_PROMPT, ROUTER_PROMPT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default inference endpoint (Replicate predictions API)
pub const DEFAULT_API_URL: &str = "https://api.replicate.com/v1";

/// Default hosted model reference (`owner/name` for Replicate)
pub const DEFAULT_MODEL: &str = "meta/meta-llama-3-8b-instruct";

/// Complete configuration for the assistant service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub inference: InferenceConfig,
    pub generation: GenerationConfig,
    pub server: ServerConfig,
    pub instructions: Instructions,
}

/// Connection settings for the hosted inference provider
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Base URL of the provider; the wire format is detected from it
    pub api_url: String,

    /// Model reference. For Replicate this is `owner/name` and the latest
    /// version is resolved on every call.
    pub model: String,

    /// Provider credential. Never has a default and is never logged.
    pub api_key: Option<String>,

    /// PEM bundle with extra trust roots for the provider's TLS certificate
    pub ca_bundle: Option<PathBuf>,

    /// Per-HTTP-request timeout in seconds
    ///
    /// Applies to each request, not to a whole prediction. A Replicate
    /// prediction issues several requests while polling.
    pub timeout_secs: u64,

    /// How many times a rate-limited (HTTP 429) request is retried
    ///
    /// Only rate limiting is retried. Transport failures surface
    /// immediately as `InferenceUnavailable`.
    pub max_retries: u32,

    /// Delay between prediction status polls in milliseconds
    pub poll_interval_ms: u64,

    /// Upper bound on one whole Replicate prediction, polling included
    pub prediction_timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            ca_bundle: None,
            timeout_secs: 60,
            max_retries: 5,
            poll_interval_ms: 1000,
            prediction_timeout_secs: 90,
        }
    }
}

impl std::fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("ca_bundle", &self.ca_bundle)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("prediction_timeout_secs", &self.prediction_timeout_secs)
            .finish()
    }
}

/// Sampling parameters for one pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Per-stage sampling parameters
///
/// Classification and command extraction run cold and short; the final
/// answer gets more room and a little more temperature.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub router: GenerationParams,
    pub command: GenerationParams,
    pub answer: GenerationParams,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            router: GenerationParams {
                max_tokens: 120,
                temperature: 0.2,
            },
            command: GenerationParams {
                max_tokens: 200,
                temperature: 0.2,
            },
            answer: GenerationParams {
                max_tokens: 300,
                temperature: 0.3,
            },
        }
    }
}

impl GenerationConfig {
    pub fn for_stage(&self, stage: Stage) -> GenerationParams {
        match stage {
            Stage::Router => self.router,
            Stage::Command => self.command,
            Stage::Answer => self.answer,
        }
    }
}

/// HTTP service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the service listens on
    pub bind: String,

    /// Deadline for one whole `/api/chat` call in seconds
    ///
    /// When it expires the pipeline future is dropped, which cancels the
    /// outstanding inference call.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            request_timeout_secs: 120,
        }
    }
}

/// The three instruction templates, one per stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Instructions {
    pub router: String,
    pub command: String,
    pub answer: String,
}

impl Default for Instructions {
    fn default() -> Self {
        Self {
            router: ROUTER_PROMPT.to_string(),
            command: COMMAND_PROMPT.to_string(),
            answer: ANSWER_PROMPT.to_string(),
        }
    }
}

impl AssistantConfig {
    /// Parse configuration from TOML text. Missing sections keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            IdaError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Build the effective configuration: defaults or file, then `.env`,
    /// then process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // A missing .env is normal
        if let Err(e) = dotenvy::dotenv_override() {
            if !e.not_found() {
                tracing::warn!("Ignoring unreadable .env file: {}", e);
            }
        }

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override settings from environment-style lookups
    ///
    /// Recognized keys: `LLM_API_KEY` (falls back to `REPLICATE_API_TOKEN`),
    /// `LLM_API_URL`, `LLM_MODEL`, `SSL_CERT_FILE`, `IDA_BIND`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("LLM_API_KEY").or_else(|| non_empty("REPLICATE_API_TOKEN")) {
            self.inference.api_key = Some(key.trim().to_string());
        }
        if let Some(url) = non_empty("LLM_API_URL") {
            self.inference.api_url = url;
        }
        if let Some(model) = non_empty("LLM_MODEL") {
            self.inference.model = model;
        }
        if let Some(bundle) = non_empty("SSL_CERT_FILE") {
            self.inference.ca_bundle = Some(PathBuf::from(bundle));
        }
        if let Some(bind) = non_empty("IDA_BIND") {
            self.server.bind = bind;
        }
    }
}
