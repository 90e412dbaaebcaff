//! SSE parsing for `streamGenerateContent?alt=sse`.
//!
//! Every `data:` payload is a complete `GenerateContentResponse`. Text lives
//! in `candidates[0].content.parts[].text`; fragments without text (safety
//! metadata, usage-only chunks) carry no new text and are not errors.

use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};
use serde::Deserialize;

use super::{DeltaStream, GeminiError, TurnError};

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, `None` when it has none.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Parses one SSE data payload. Error objects sent mid-stream become
/// [`TurnError::Api`].
pub fn parse_fragment(data: &str) -> Result<Option<String>, TurnError> {
    if let Ok(err) = serde_json::from_str::<GeminiError>(data) {
        return Err(TurnError::Api {
            status: 200,
            message: err.error.message,
        });
    }
    let fragment: GenerateContentResponse = serde_json::from_str(data)?;
    Ok(fragment.text())
}

/// Adapts a raw byte stream into a stream of text deltas. Stops after the
/// first error.
pub fn delta_stream<S, B, E>(bytes: S) -> DeltaStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut events = Box::pin(bytes.eventsource());
        while let Some(event) = events.next().await {
            match event {
                Ok(event) => {
                    let data = event.data.trim();
                    if data.is_empty() {
                        continue;
                    }
                    let parsed = parse_fragment(data);
                    let failed = parsed.is_err();
                    yield parsed;
                    if failed {
                        break;
                    }
                }
                Err(e) => {
                    yield Err(TurnError::Stream(e.to_string()));
                    break;
                }
            }
        }
    })
}
