use std::sync::Arc;

use reqwest::Client;

use crate::llm_client::prompts::build_system_instruction;
use crate::llm_client::{
    http_client, GeminiClient, GenerateRequest, GenerationBackend, SessionInitError, Turn, MODEL,
    TEMPERATURE,
};
use crate::models::chat::Role;
use crate::models::resume::ResumeDocument;

/// Builds a fresh session for a newly mounted widget.
pub type SessionFactory = Arc<dyn Fn() -> Result<ChatSession, SessionInitError> + Send + Sync>;

/// Settings needed to reach the generation API.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub api_base: String,
}

/// A conversation with the model, seeded once with the resume system
/// instruction. The REST API is stateless, so accepted turns are kept here and
/// replayed on every request.
pub struct ChatSession {
    backend: Arc<dyn GenerationBackend>,
    system_instruction: String,
    model: String,
    temperature: f32,
    history: Vec<Turn>,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn GenerationBackend>, system_instruction: String) -> Self {
        Self {
            backend,
            system_instruction,
            model: MODEL.to_string(),
            temperature: TEMPERATURE,
            history: Vec::new(),
        }
    }

    pub fn from_resume(
        backend: Arc<dyn GenerationBackend>,
        resume: &ResumeDocument,
    ) -> Result<Self, SessionInitError> {
        let system_instruction = build_system_instruction(resume)?;
        Ok(Self::new(backend, system_instruction))
    }

    /// Request carrying the whole accepted history plus `message`.
    pub fn request_for(&self, message: &str) -> GenerateRequest {
        let mut contents = Vec::with_capacity(self.history.len() + 1);
        contents.extend(self.history.iter().cloned());
        contents.push(Turn {
            role: Role::User,
            text: message.to_string(),
        });

        GenerateRequest {
            model: self.model.clone(),
            system_instruction: self.system_instruction.clone(),
            temperature: self.temperature,
            contents,
        }
    }

    /// Records a completed exchange so later turns see it as context.
    pub fn commit_exchange(&mut self, user_text: String, model_text: String) {
        self.history.push(Turn {
            role: Role::User,
            text: user_text,
        });
        self.history.push(Turn {
            role: Role::Model,
            text: model_text,
        });
    }

    pub fn backend(&self) -> Arc<dyn GenerationBackend> {
        Arc::clone(&self.backend)
    }

    #[cfg(test)]
    pub fn history(&self) -> &[Turn] {
        &self.history
    }
}

/// Creates a Gemini-backed session for `resume` on the shared `http` client.
pub fn create_session(
    resume: &ResumeDocument,
    settings: &LlmSettings,
    http: &Client,
) -> Result<ChatSession, SessionInitError> {
    let client = GeminiClient::new(http.clone(), settings.api_key.as_deref(), &settings.api_base)?;
    ChatSession::from_resume(Arc::new(client), resume)
}

/// Factory closing over the shared resume, API settings and one HTTP client
/// reused by every session.
pub fn gemini_session_factory(
    resume: Arc<ResumeDocument>,
    settings: LlmSettings,
) -> Result<SessionFactory, reqwest::Error> {
    let http = http_client()?;
    Ok(Arc::new(move || create_session(&resume, &settings, &http)))
}
