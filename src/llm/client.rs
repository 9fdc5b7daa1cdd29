//! LLM client for deriving structured receipt fields from OCR text.
//!
//! Talks to an OpenAI-compatible chat-completions endpoint. Extraction
//! deliberately never fails outward: call or parse failures degrade to
//! all-null fields plus a diagnostic string, and the caller proceeds.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Prompt for extracting structured fields. `{text}` is replaced with the
/// raw OCR output verbatim, untruncated.
pub const EXTRACTION_PROMPT: &str = r#"You are an intelligent receipt parser. Extract the following fields from the receipt text below:
- merchant_name
- total_amount
- date (if available)

If a field is missing, return null for it.

Receipt text:
"""
{text}
"""

Return your answer as a JSON object with keys: merchant_name, total_amount, date."#;

/// Configuration for the LLM client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key for the completion endpoint.
    #[serde(default)]
    pub api_key: String,
    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model to use for extraction.
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens in the response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature; zero keeps extraction deterministic.
    #[serde(default)]
    pub temperature: f32,
}

fn default_endpoint() -> String {
    "https://api.openai.com".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_max_tokens() -> u32 {
    200
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_endpoint(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: 0.0,
        }
    }
}

impl LlmConfig {
    /// Build config from `OPENAI_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            endpoint: std::env::var("OPENAI_BASE_URL").unwrap_or(defaults.endpoint),
            model: std::env::var("OPENAI_MODEL").unwrap_or(defaults.model),
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
        }
    }
}

/// Fields derived from one receipt.
///
/// All fields are nullable; `error` carries the diagnostic when the model
/// call or its JSON response failed and the fields degraded to null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    pub merchant_name: Option<String>,
    pub total_amount: Option<f64>,
    pub date: Option<String>,
    pub error: Option<String>,
}

/// Errors from the completion call itself (absorbed by `extract_fields`).
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Chat-completions request format.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat-completions response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Shape the model is instructed to return.
#[derive(Debug, Deserialize)]
struct RawFields {
    merchant_name: Option<String>,
    total_amount: Option<Value>,
    date: Option<Value>,
}

/// LLM client for receipt field extraction.
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    pub fn new(config: LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Get the config.
    #[allow(dead_code)]
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Extract merchant/amount/date fields from receipt text.
    ///
    /// Never fails: any call or parse problem yields null fields with a
    /// diagnostic in `error`.
    pub async fn extract_fields(&self, text: &str) -> ExtractedFields {
        let prompt = EXTRACTION_PROMPT.replace("{text}", text);

        debug!("Requesting field extraction ({} chars of text)", text.len());
        match self.call_completion(&prompt).await {
            Ok(content) => parse_fields(&content),
            Err(e) => ExtractedFields {
                error: Some(e.to_string()),
                ..Default::default()
            },
        }
    }

    /// Call the chat-completions API with a prompt.
    async fn call_completion(&self, prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let url = format!("{}/v1/chat/completions", self.config.endpoint);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let chat: ChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::Parse("Empty choices in response".to_string()))
    }
}

/// Parse the model's response content into fields, degrading to nulls.
pub(crate) fn parse_fields(content: &str) -> ExtractedFields {
    match serde_json::from_str::<RawFields>(content) {
        Ok(raw) => ExtractedFields {
            merchant_name: raw.merchant_name,
            total_amount: parse_amount(raw.total_amount.as_ref()),
            date: raw.date.and_then(|v| match v {
                Value::Null => None,
                Value::String(s) => Some(s),
                other => Some(other.to_string()),
            }),
            error: None,
        },
        Err(e) => ExtractedFields {
            error: Some(e.to_string()),
            ..Default::default()
        },
    }
}

/// Normalize a model-reported amount into a number.
///
/// Accepts a JSON number or a string with a `$` sign, thousands commas,
/// and surrounding whitespace. Anything non-numeric yields None, not an
/// error.
pub(crate) fn parse_amount(value: Option<&Value>) -> Option<f64> {
    let raw = match value? {
        Value::Null => return None,
        Value::Number(n) => return n.as_f64(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    raw.replace('$', "").replace(',', "").trim().parse().ok()
}
