//! Async inference client
//!
//! The pipeline only sees the [`InferenceClient`] trait: one instruction,
//! one piece of content, raw text back. [`LlmClient`] is the HTTP
//! implementation and supports Replicate predictions (LLaMA 3 instruct),
//! Anthropic messages, and OpenAI-compatible chat completions.
//! Rate-limit retries live here, never in the pipeline stages.

use crate::core::config::{AssistantConfig, GenerationConfig, GenerationParams};
use crate::core::error::{IdaError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

/// Which pipeline stage is calling; selects sampling parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Router,
    Command,
    Answer,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Router => "router",
            Stage::Command => "command",
            Stage::Answer => "answer",
        }
    }
}

/// Contract between the pipeline and the hosted model
///
/// Implementations fail with [`IdaError::InferenceUnavailable`] on transport
/// failure. The returned text has no guaranteed schema.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn infer(&self, stage: Stage, role_instruction: &str, content: &str) -> Result<String>;
}

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Replicate,
    Anthropic,
    OpenAI,
}

/// LLaMA 3 instruct chat template used for Replicate predictions
const LLAMA3_TEMPLATE: &str = "<|begin_of_text|>\
<|start_header_id|>system<|end_header_id|>\n\n{system_prompt}<|eot_id|>\
<|start_header_id|>user<|end_header_id|>\n\n{prompt}<|eot_id|>\
<|start_header_id|>assistant<|end_header_id|>\n\n";

const LLAMA3_STOP_SEQUENCES: &str = "<|end_of_text|>,<|eot_id|>";

/// Fallback wait when a 429 carries no retry hint (seconds)
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
    generation: GenerationConfig,
    max_retries: u32,
    poll_interval: Duration,
    prediction_timeout: Duration,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("api_format", &self.api_format)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration and default
    /// sampling parameters
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let api_format = Self::detect_api_format(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            api_format,
            generation: GenerationConfig::default(),
            max_retries: 5,
            poll_interval: Duration::from_millis(1000),
            prediction_timeout: Duration::from_secs(90),
        }
    }

    /// Build a client from the assistant configuration
    ///
    /// Fails when the credential is missing or blank, or when the CA
    /// bundle cannot be read.
    pub fn from_config(config: &AssistantConfig) -> Result<Self> {
        let inference = &config.inference;
        let api_key = inference
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                IdaError::Config(
                    "inference API key is empty; set LLM_API_KEY or REPLICATE_API_TOKEN".into(),
                )
            })?
            .to_string();

        let mut builder = Client::builder().timeout(Duration::from_secs(inference.timeout_secs));
        if let Some(path) = &inference.ca_bundle {
            let pem = fs::read(path).map_err(|e| {
                IdaError::Config(format!("Failed to read CA bundle {:?}: {}", path, e))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| IdaError::Config(format!("Invalid CA bundle {:?}: {}", path, e)))?;
            builder = builder.add_root_certificate(cert);
        }
        let client = builder
            .build()
            .map_err(|e| IdaError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            api_url: inference.api_url.clone(),
            model: inference.model.clone(),
            api_format: Self::detect_api_format(&inference.api_url),
            generation: config.generation.clone(),
            max_retries: inference.max_retries,
            poll_interval: Duration::from_millis(inference.poll_interval_ms),
            prediction_timeout: Duration::from_secs(inference.prediction_timeout_secs),
        })
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("replicate.com") {
            ApiFormat::Replicate
        } else if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            // DeepSeek, OpenAI, and other compatible APIs use OpenAI format
            ApiFormat::OpenAI
        }
    }

    /// Force a wire format regardless of the URL (mock servers, proxies)
    pub fn with_api_format(mut self, api_format: ApiFormat) -> Self {
        self.api_format = api_format;
        self
    }

    /// Override the prediction poll interval
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Override the bound on a whole Replicate prediction
    pub fn with_prediction_timeout(mut self, prediction_timeout: Duration) -> Self {
        self.prediction_timeout = prediction_timeout;
        self
    }

    pub fn api_format(&self) -> &ApiFormat {
        &self.api_format
    }

    /// Send a completion request to the LLM
    ///
    /// # Arguments
    /// * `system` - System prompt providing context and instructions
    /// * `user` - User message/query to process
    /// * `params` - Sampling parameters for this call
    ///
    /// # Returns
    /// The LLM's text response
    pub async fn complete(
        &self,
        system: &str,
        user: &str,
        params: GenerationParams,
    ) -> Result<String> {
        match self.api_format {
            ApiFormat::Replicate => {
                tokio::time::timeout(
                    self.prediction_timeout,
                    self.complete_replicate(system, user, params),
                )
                .await
                .map_err(|_| {
                    IdaError::InferenceUnavailable(format!(
                        "Replicate prediction did not finish within {:?}",
                        self.prediction_timeout
                    ))
                })?
            }
            ApiFormat::Anthropic => self.complete_anthropic(system, user, params).await,
            ApiFormat::OpenAI => self.complete_openai(system, user, params).await,
        }
    }

    /// Send a request, waiting out HTTP 429 up to `max_retries` times
    async fn send_with_retry<F>(&self, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            let response = build().send().await.map_err(unavailable)?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS && attempt < self.max_retries {
                attempt += 1;
                let wait = retry_after_secs(response).await;
                tracing::warn!(attempt, wait_secs = wait + 1, "Rate limited by inference provider");
                tokio::time::sleep(Duration::from_secs(wait + 1)).await;
                continue;
            }

            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_default();
                return Err(IdaError::InferenceUnavailable(format!(
                    "API error {}: {}",
                    status, error_text
                )));
            }

            return Ok(response);
        }
    }

    async fn complete_replicate(
        &self,
        system: &str,
        user: &str,
        params: GenerationParams,
    ) -> Result<String> {
        let (owner, name) = self.model.split_once('/').ok_or_else(|| {
            IdaError::Config(format!(
                "Replicate model must be `owner/name`, got `{}`",
                self.model
            ))
        })?;
        let base = self.api_url.trim_end_matches('/');
        let auth = format!("Token {}", self.api_key);

        // 1) latest version id
        let model: ReplicateModel = self
            .send_with_retry(|| {
                self.client
                    .get(format!("{}/models/{}/{}", base, owner, name))
                    .header("Authorization", &auth)
            })
            .await?
            .json()
            .await
            .map_err(unavailable)?;

        // 2) create prediction
        let request = ReplicatePredictionRequest {
            version: model.latest_version.id,
            input: ReplicateInput {
                system_prompt: system.into(),
                prompt: format!("{}\n", user),
                prompt_template: LLAMA3_TEMPLATE.into(),
                max_new_tokens: params.max_tokens,
                temperature: params.temperature,
                stop_sequences: LLAMA3_STOP_SEQUENCES.into(),
            },
        };
        let mut prediction: ReplicatePrediction = self
            .send_with_retry(|| {
                self.client
                    .post(format!("{}/predictions", base))
                    .header("Authorization", &auth)
                    .header("content-type", "application/json")
                    .json(&request)
            })
            .await?
            .json()
            .await
            .map_err(unavailable)?;

        // 3) poll until terminal
        loop {
            match prediction.status.as_str() {
                "succeeded" => return Ok(prediction.output_text()),
                "failed" | "canceled" => {
                    return Err(IdaError::InferenceUnavailable(format!(
                        "Replicate prediction {}: {}",
                        prediction.status,
                        prediction.error_detail()
                    )))
                }
                _ => {}
            }

            tokio::time::sleep(self.poll_interval).await;
            let id = prediction.id.clone();
            prediction = self
                .send_with_retry(|| {
                    self.client
                        .get(format!("{}/predictions/{}", base, id))
                        .header("Authorization", &auth)
                })
                .await?
                .json()
                .await
                .map_err(unavailable)?;
        }
    }

    async fn complete_anthropic(
        &self,
        system: &str,
        user: &str,
        params: GenerationParams,
    ) -> Result<String> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            system: system.into(),
            messages: vec![Message {
                role: "user".into(),
                content: user.into(),
            }],
        };

        let completion: AnthropicResponse = self
            .send_with_retry(|| {
                self.client
                    .post(&self.api_url)
                    .header("x-api-key", &self.api_key)
                    .header("anthropic-version", "2023-06-01")
                    .header("content-type", "application/json")
                    .json(&request)
            })
            .await?
            .json()
            .await
            .map_err(unavailable)?;

        completion
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| IdaError::InferenceUnavailable("Empty response".into()))
    }

    async fn complete_openai(
        &self,
        system: &str,
        user: &str,
        params: GenerationParams,
    ) -> Result<String> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            messages: vec![
                Message {
                    role: "system".into(),
                    content: system.into(),
                },
                Message {
                    role: "user".into(),
                    content: user.into(),
                },
            ],
        };

        let completion: OpenAIResponse = self
            .send_with_retry(|| {
                self.client
                    .post(&self.api_url)
                    .header("Authorization", format!("Bearer {}", self.api_key))
                    .header("content-type", "application/json")
                    .json(&request)
            })
            .await?
            .json()
            .await
            .map_err(unavailable)?;

        completion
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| IdaError::InferenceUnavailable("Empty response".into()))
    }
}

#[async_trait]
impl InferenceClient for LlmClient {
    async fn infer(&self, stage: Stage, role_instruction: &str, content: &str) -> Result<String> {
        let params = self.generation.for_stage(stage);
        tracing::debug!(stage = stage.name(), max_tokens = params.max_tokens, "Calling inference provider");
        let text = self.complete(role_instruction, content, params).await?;
        tracing::trace!(stage = stage.name(), output = %text, "Inference output");
        Ok(text)
    }
}

fn unavailable(e: reqwest::Error) -> IdaError {
    IdaError::InferenceUnavailable(e.to_string())
}

/// Seconds to wait before retrying a rate-limited request
///
/// Reads the `Retry-After` header, then Replicate's `retry_after` body field.
async fn retry_after_secs(response: Response) -> u64 {
    let from_header = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    if let Some(secs) = from_header {
        return secs;
    }

    response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| body.get("retry_after").and_then(|v| v.as_f64()))
        .map(|secs| secs.max(0.0).ceil() as u64)
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

// Replicate predictions API
#[derive(Deserialize)]
struct ReplicateModel {
    latest_version: ReplicateVersion,
}

#[derive(Deserialize)]
struct ReplicateVersion {
    id: String,
}

#[derive(Serialize)]
struct ReplicatePredictionRequest {
    version: String,
    input: ReplicateInput,
}

#[derive(Serialize)]
struct ReplicateInput {
    system_prompt: String,
    prompt: String,
    prompt_template: String,
    max_new_tokens: u32,
    temperature: f32,
    stop_sequences: String,
}

#[derive(Deserialize)]
struct ReplicatePrediction {
    id: String,
    status: String,
    #[serde(default)]
    output: serde_json::Value,
    #[serde(default)]
    error: serde_json::Value,
}

impl ReplicatePrediction {
    fn error_detail(&self) -> String {
        match &self.error {
            serde_json::Value::Null => "no error detail".to_string(),
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Streaming models return a list of tokens; others a single string
    fn output_text(&self) -> String {
        match &self.output {
            serde_json::Value::Null => String::new(),
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Array(parts) => parts
                .iter()
                .map(|p| match p {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            other => other.to_string(),
        }
    }
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// OpenAI-compatible API format (DeepSeek, OpenAI, etc.)
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = LlmClient::new(
            "test-key".into(),
            "https://api.example.com".into(),
            "test-model".into(),
        );
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.api_url, "https://api.example.com");
        assert_eq!(client.model, "test-model");
        assert_eq!(client.api_format, ApiFormat::OpenAI);
    }

    #[test]
    fn test_detect_api_format() {
        assert_eq!(
            LlmClient::detect_api_format("https://api.replicate.com/v1"),
            ApiFormat::Replicate
        );
        assert_eq!(
            LlmClient::detect_api_format("https://api.anthropic.com/v1/messages"),
            ApiFormat::Anthropic
        );
        assert_eq!(
            LlmClient::detect_api_format("https://api.deepseek.com/v1/chat/completions"),
            ApiFormat::OpenAI
        );
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let mut config = AssistantConfig::default();
        assert!(matches!(
            LlmClient::from_config(&config),
            Err(IdaError::Config(_))
        ));

        config.inference.api_key = Some("   ".into());
        assert!(matches!(
            LlmClient::from_config(&config),
            Err(IdaError::Config(_))
        ));
    }

    #[test]
    fn test_from_config_missing_ca_bundle() {
        let mut config = AssistantConfig::default();
        config.inference.api_key = Some("r8_test".into());
        config.inference.ca_bundle = Some("/nonexistent/ca-bundle.pem".into());
        let err = LlmClient::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("CA bundle"));
    }

    #[test]
    fn test_from_config_success() {
        let mut config = AssistantConfig::default();
        config.inference.api_key = Some("r8_test".into());
        let client = LlmClient::from_config(&config).unwrap();
        assert_eq!(client.api_format(), &ApiFormat::Replicate);
        assert_eq!(client.model, "meta/meta-llama-3-8b-instruct");
    }

    #[test]
    fn test_from_config_prediction_timeout() {
        let mut config = AssistantConfig::default();
        config.inference.api_key = Some("r8_test".into());
        config.inference.prediction_timeout_secs = 5;
        let client = LlmClient::from_config(&config).unwrap();
        assert_eq!(client.prediction_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = LlmClient::new("sk-secret".into(), "https://x".into(), "m".into());
        assert!(!format!("{:?}", client).contains("sk-secret"));
    }

    #[test]
    fn test_prediction_output_text() {
        let list: ReplicatePrediction = serde_json::from_str(
            r#"{"id": "p1", "status": "succeeded", "output": ["YES", "", "\n"]}"#,
        )
        .unwrap();
        assert_eq!(list.output_text(), "YES\n");

        let single: ReplicatePrediction =
            serde_json::from_str(r#"{"id": "p1", "status": "succeeded", "output": "NO"}"#)
                .unwrap();
        assert_eq!(single.output_text(), "NO");

        let pending: ReplicatePrediction =
            serde_json::from_str(r#"{"id": "p1", "status": "starting"}"#).unwrap();
        assert_eq!(pending.output_text(), "");
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Router.name(), "router");
        assert_eq!(Stage::Command.name(), "command");
        assert_eq!(Stage::Answer.name(), "answer");
    }
}
