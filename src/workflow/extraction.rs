//! Extraction: exam material in, candidate questions out.
//!
//! Failures never escape this module. Whatever goes wrong (transport, HTTP
//! status, unparseable output) is logged and the caller sees an empty list.

use crate::document::EncodedDocument;
use crate::genai::{Attachment, GenerateRequest, GenerativeService};
use crate::models::ExtractedQuestion;

use super::strip_code_fence;

/// Upper bound on candidates kept from one extraction.
pub const MAX_EXTRACTED: usize = 6;

const EXTRACTION_PROMPT: &str = "\
You are reviewing exam material. Identify the questions the candidate answered \
correctly and return them as a JSON array. Each element must be an object with \
the keys \"id\", \"text\", \"correctAnswer\" and \"explanation\". Skip anything \
answered incorrectly or left unanswered. Return at most 6 items and nothing \
but the JSON array.";

/// What to extract from. A document always wins over pasted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionInput {
    Text(String),
    Document(EncodedDocument),
}

impl ExtractionInput {
    /// Pick the input to use, or `None` if there is nothing to extract from.
    pub fn resolve(text: Option<String>, document: Option<EncodedDocument>) -> Option<Self> {
        if let Some(document) = document {
            return Some(Self::Document(document));
        }
        text.filter(|t| !t.trim().is_empty()).map(Self::Text)
    }
}

pub fn build_request(input: &ExtractionInput) -> GenerateRequest {
    let attachment = match input {
        ExtractionInput::Text(text) => Attachment::Text(text.clone()),
        ExtractionInput::Document(doc) => Attachment::Document(doc.clone()),
    };
    GenerateRequest::new(EXTRACTION_PROMPT)
        .with_attachment(attachment)
        .with_json_output()
}

/// Parse the service's JSON array, keeping at most [`MAX_EXTRACTED`] items.
pub fn parse_questions(text: &str) -> Result<Vec<ExtractedQuestion>, serde_json::Error> {
    let mut questions: Vec<ExtractedQuestion> = serde_json::from_str(strip_code_fence(text))?;
    questions.truncate(MAX_EXTRACTED);
    Ok(questions)
}

/// Run one extraction. Never fails; errors collapse to an empty list.
pub async fn extract_questions(
    service: &dyn GenerativeService,
    input: &ExtractionInput,
) -> Vec<ExtractedQuestion> {
    let kind = match input {
        ExtractionInput::Text(_) => "text",
        ExtractionInput::Document(_) => "document",
    };
    tracing::info!(model = service.model(), input = kind, "Extracting questions");

    let text = match service.generate(build_request(input)).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Extraction request failed: {}", e);
            return Vec::new();
        }
    };

    match parse_questions(&text) {
        Ok(questions) => {
            tracing::info!("Extracted {} questions", questions.len());
            questions
        }
        Err(e) => {
            tracing::warn!("Extraction response was not a question list: {}", e);
            Vec::new()
        }
    }
}
