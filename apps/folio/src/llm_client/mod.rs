//! LLM Client: the single point of entry for all Gemini API calls in Folio.
//!
//! ARCHITECTURAL RULE: No other module may call the generation API directly.
//! Chat sessions talk to a [`GenerationBackend`]; production wires in
//! [`GeminiClient`].
//!
//! Model: gemini-2.5-flash (hardcoded, not configurable)

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::Stream;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::chat::Role;

pub mod prompts;
pub mod streaming;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
/// The model used for every chat session.
pub const MODEL: &str = "gemini-2.5-flash";
/// Fixed sampling temperature.
pub const TEMPERATURE: f32 = 0.7;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Raised when a session cannot be created. Disables chat for that widget only.
#[derive(Debug, Error)]
pub enum SessionInitError {
    #[error("No Gemini API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("Failed to serialize resume context: {0}")]
    Context(#[from] serde_json::Error),
}

/// Raised while opening or reading a turn's stream. Per-turn, never fatal to
/// the session.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Stream error: {0}")]
    Stream(String),
}

/// One accepted message in the conversation history sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

/// Everything needed for one streaming generation call.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub system_instruction: String,
    pub temperature: f32,
    /// Prior turns followed by the new user message.
    pub contents: Vec<Turn>,
}

/// Incremental text fragments. `Ok(None)` is a fragment that carried no text.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<Option<String>, TurnError>> + Send + 'static>>;

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn stream_generate(&self, request: GenerateRequest) -> Result<DeltaStream, TurnError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini wire format
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    system_instruction: GeminiContent<'a>,
    contents: Vec<GeminiContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

impl<'a> From<&'a GenerateRequest> for GeminiRequest<'a> {
    fn from(request: &'a GenerateRequest) -> Self {
        GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: &request.system_instruction,
                }],
            },
            contents: request
                .contents
                .iter()
                .map(|turn| GeminiContent {
                    role: Some(turn.role.as_str()),
                    parts: vec![GeminiPart { text: &turn.text }],
                })
                .collect(),
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiError {
    pub error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiErrorBody {
    pub message: String,
}

/// Builds the HTTP client shared by every chat session.
pub fn http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .build()
}

/// Streaming client for the Gemini `streamGenerateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Fails without a usable API key so callers can disable chat instead of
    /// discovering the problem on the first turn.
    pub fn new(
        client: Client,
        api_key: Option<&str>,
        base_url: &str,
    ) -> Result<Self, SessionInitError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(SessionInitError::MissingApiKey)?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn stream_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, model
        )
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn stream_generate(&self, request: GenerateRequest) -> Result<DeltaStream, TurnError> {
        let body = GeminiRequest::from(&request);

        debug!(
            "Opening Gemini stream: model={}, turns={}",
            request.model,
            request.contents.len()
        );

        let response = self
            .client
            .post(self.stream_url(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini API returned {}: {}", status, body);
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(TurnError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(streaming::delta_stream(response.bytes_stream()))
    }
}
