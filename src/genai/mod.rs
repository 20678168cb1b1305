//! Generative service seam.
//!
//! Workflows talk to the hosted model through [`GenerativeService`] so the
//! concrete client is built once at startup and handed in, and tests can
//! script responses without a network.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::document::EncodedDocument;

/// Errors talking to the generative service.
#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized: check the generative service API key")]
    Unauthorized,

    #[error("Rate limited by the generative service")]
    RateLimited,

    #[error("Service error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed service response: {0}")]
    Malformed(String),
}

/// Material attached after the instruction text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    Text(String),
    Document(EncodedDocument),
}

/// A single-turn generation request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateRequest {
    /// Instruction text, always sent first.
    pub prompt: String,
    pub attachment: Option<Attachment>,
    /// Ask for `application/json` output.
    pub json_output: bool,
    /// Structured-output schema; implies `json_output`.
    pub response_schema: Option<serde_json::Value>,
    /// Let the service ground its answer with web search.
    pub search_grounding: bool,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }

    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.json_output = true;
        self.response_schema = Some(schema);
        self
    }

    pub fn with_search_grounding(mut self) -> Self {
        self.search_grounding = true;
        self
    }
}

/// A hosted model that turns a request into response text.
#[async_trait]
pub trait GenerativeService: Send + Sync {
    /// Model identifier, for logging.
    fn model(&self) -> &str;

    /// Run one generation and return the concatenated response text.
    ///
    /// A blocked or empty candidate yields `Ok` with an empty string; deciding
    /// what that means is up to the caller.
    async fn generate(&self, request: GenerateRequest) -> Result<String, GenAiError>;
}
