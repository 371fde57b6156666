use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GraderError, GraderResult};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";

/// A language model that answers a message under a set of role instructions.
///
/// Each call is independent: no conversation state is carried between calls.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn send_message(&self, instructions: &str, message: &str) -> GraderResult<String>;

    /// Model identifier, for logs and reports
    fn model_name(&self) -> &str;
}

/// Hosted model provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Provider {
    Gemini,
    Anthropic,
}

impl Provider {
    /// Environment variable holding the API key for this provider
    pub fn api_key_var(self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.5-flash",
            Self::Anthropic => "claude-sonnet-4-20250514",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::Anthropic => write!(f, "anthropic"),
        }
    }
}

/// Configuration for a model client
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: Provider,
    /// API key (from GEMINI_API_KEY or ANTHROPIC_API_KEY)
    pub api_key: String,
    pub model: String,
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
    /// Per-request timeout; `None` waits for the provider indefinitely
    pub timeout: Option<Duration>,
}

impl LlmConfig {
    /// Create config for `provider`, reading its API key from the environment.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env(provider: Provider) -> GraderResult<Self> {
        dotenvy::dotenv().ok();

        let var = provider.api_key_var();
        let api_key = std::env::var(var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GraderError::Config(format!("{} environment variable not set", var)))?;

        Ok(Self::new(provider, api_key))
    }

    pub fn new(provider: Provider, api_key: String) -> Self {
        Self {
            provider,
            api_key,
            model: provider.default_model().to_string(),
            temperature: 0.1,
            max_tokens: 4096,
            timeout: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Build the client matching the configured provider
pub fn build_client(config: LlmConfig) -> GraderResult<Box<dyn ModelClient>> {
    Ok(match config.provider {
        Provider::Gemini => Box::new(GeminiClient::new(config)?),
        Provider::Anthropic => Box::new(AnthropicClient::new(config)?),
    })
}

fn http_client(config: &LlmConfig) -> GraderResult<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| GraderError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Read a response body, failing on non-success status
async fn read_body(response: reqwest::Response, provider: Provider) -> GraderResult<String> {
    let status = response.status();
    let body = response.text().await.map_err(|e| {
        GraderError::ModelInvocation(format!("Failed to read {} response: {}", provider, e))
    })?;

    if !status.is_success() {
        return Err(GraderError::ModelInvocation(format!(
            "{} API error: {} - {}",
            provider, status, body
        )));
    }

    Ok(body)
}

/// Google Gemini client
pub struct GeminiClient {
    client: Client,
    config: LlmConfig,
}

impl GeminiClient {
    pub fn new(config: LlmConfig) -> GraderResult<Self> {
        Ok(Self {
            client: http_client(&config)?,
            config,
        })
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn send_message(&self, instructions: &str, message: &str) -> GraderResult<String> {
        let request = GeminiRequest {
            system_instruction: Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: instructions.to_string(),
                }],
            }),
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: message.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        };

        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, self.config.model);
        debug!("POST {} ({} chars)", url, message.len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                GraderError::ModelInvocation(format!("Failed to send request to Gemini API: {}", e))
            })?;

        let body = read_body(response, Provider::Gemini).await?;
        gemini_text(&body)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Extract the text of the first candidate from a Gemini response body
fn gemini_text(body: &str) -> GraderResult<String> {
    let response: GeminiResponse = serde_json::from_str(body).map_err(|e| {
        GraderError::ModelInvocation(format!(
            "error decoding Gemini response: {}. Full response: {}",
            e, body
        ))
    })?;

    let parts = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts)
        .unwrap_or_default();

    let texts: Vec<String> = parts.into_iter().filter_map(|p| p.text).collect();
    if texts.is_empty() {
        return Err(GraderError::ModelInvocation(
            "No text content in Gemini response".to_string(),
        ));
    }

    Ok(texts.concat())
}

/// Anthropic Messages API client
pub struct AnthropicClient {
    client: Client,
    config: LlmConfig,
}

impl AnthropicClient {
    pub fn new(config: LlmConfig) -> GraderResult<Self> {
        Ok(Self {
            client: http_client(&config)?,
            config,
        })
    }
}

#[async_trait]
impl ModelClient for AnthropicClient {
    async fn send_message(&self, instructions: &str, message: &str) -> GraderResult<String> {
        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            system: Some(instructions.to_string()),
            messages: vec![Message {
                role: "user".to_string(),
                content: message.to_string(),
            }],
        };

        debug!("POST {} ({} chars)", ANTHROPIC_URL, message.len());

        let response = self
            .client
            .post(ANTHROPIC_URL)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                GraderError::ModelInvocation(format!(
                    "Failed to send request to Anthropic API: {}",
                    e
                ))
            })?;

        let body = read_body(response, Provider::Anthropic).await?;
        anthropic_text(&body)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Extract the first text content block from an Anthropic response body
fn anthropic_text(body: &str) -> GraderResult<String> {
    let response: AnthropicResponse = serde_json::from_str(body).map_err(|e| {
        GraderError::ModelInvocation(format!("Failed to parse Anthropic API response: {}", e))
    })?;

    response
        .content
        .into_iter()
        .find(|c| c.content_type == "text")
        .map(|c| c.text)
        .ok_or_else(|| {
            GraderError::ModelInvocation("No text content in Anthropic response".to_string())
        })
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}
