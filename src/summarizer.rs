//! LLM-based abstract summaries.
//!
//! One OpenAI-compatible chat completion per abstract, requested on demand.
//! Failures never escape: they come back as a [`Summary::Failed`] that is
//! displayed in place of the summary.

use crate::config::validate_base_url;
use crate::error::{BiopaperError, Result};
use crate::prompts::summarize::{build_user_prompt, SYSTEM_PROMPT};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// OpenAI API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Model used for summaries
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Sampling temperature
const TEMPERATURE: f64 = 0.5;

/// Upper bound on generated tokens
const MAX_TOKENS: u32 = 200;

/// Returned when there is nothing to summarize or no credential
pub const NO_INPUT_MESSAGE: &str = "No abstract or API key provided.";

/// Prefix of every failure message
pub const ERROR_PREFIX: &str = "⚠️ Error summarizing";

/// LLM configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

impl LlmConfig {
    /// Defaults with a different endpoint and model
    pub fn new(base_url: &str, model: &str) -> Result<Self> {
        Ok(Self {
            base_url: validate_base_url(base_url)?,
            model: model.to_string(),
            ..Self::default()
        })
    }
}

/// Outcome of one summary request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    /// Text generated by the model, trimmed
    Generated(String),
    /// No abstract or no credential; no request was made
    Unavailable,
    /// Request or response handling failed
    Failed(String),
}

impl Summary {
    pub fn is_generated(&self) -> bool {
        matches!(self, Summary::Generated(_))
    }

    fn kind(&self) -> &'static str {
        match self {
            Summary::Generated(_) => "generated",
            Summary::Unavailable => "unavailable",
            Summary::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Summary::Generated(text) => f.write_str(text),
            Summary::Unavailable => f.write_str(NO_INPUT_MESSAGE),
            Summary::Failed(error) => write!(f, "{}: {}", ERROR_PREFIX, error),
        }
    }
}

impl Serialize for Summary {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Summary", 2)?;
        state.serialize_field("status", self.kind())?;
        state.serialize_field("text", &self.to_string())?;
        state.end()
    }
}

/// OpenAI-compatible API response structures
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

/// Chat completion client for abstract summaries
#[derive(Debug, Clone)]
pub struct Summarizer {
    client: reqwest::Client,
    config: LlmConfig,
}

impl Summarizer {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BiopaperError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Summarize one cleaned abstract.
    ///
    /// Returns [`Summary::Unavailable`] without touching the network when the
    /// abstract is blank or `api_key` is missing or blank.
    pub async fn summarize(&self, abstract_text: &str, api_key: Option<&str>) -> Summary {
        let api_key = api_key.map(str::trim).filter(|k| !k.is_empty());
        let (abstract_text, api_key) = match (abstract_text.trim(), api_key) {
            (text, Some(key)) if !text.is_empty() => (text, key),
            _ => return Summary::Unavailable,
        };

        match self.request_summary(abstract_text, api_key).await {
            Ok(text) => Summary::Generated(text),
            Err(e) => {
                warn!(model = %self.config.model, error = %e, "Failed to summarize abstract");
                Summary::Failed(e.to_string())
            }
        }
    }

    async fn request_summary(&self, abstract_text: &str, api_key: &str) -> Result<String> {
        let request_body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_user_prompt(abstract_text)}
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens
        });

        let api_url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        debug!(model = %self.config.model, chars = abstract_text.len(), "Sending LLM request");

        let response = self
            .client
            .post(&api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(BiopaperError::Api {
                code: status.as_u16(),
                message: format!("LLM API error: {} - {}", status, error_text.trim()),
            });
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| BiopaperError::Parse(format!("Failed to parse LLM response: {}", e)))?;

        if let Some(usage) = &api_response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "LLM token usage"
            );
        }

        let content = api_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| BiopaperError::Parse("LLM response has no choices".to_string()))?;

        info!(chars = content.len(), "Summary generated");
        Ok(content)
    }
}
