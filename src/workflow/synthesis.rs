//! Synthesis: staged questions in, insight blocks out, vault records written.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::digest::question_digest;
use crate::genai::{GenAiError, GenerateRequest, GenerativeService};
use crate::models::{ExtractedQuestion, ExtractionResult, PersistenceReport, VaultItem};
use crate::store::VaultStore;

use super::{schema, strip_code_fence};

/// Rule recorded when a result carries no blocks.
pub const FALLBACK_RULE: &str = "Mastered principle";

const SYNTHESIS_PROMPT: &str = "\
You are an exam coach. The JSON below lists exam questions with their correct \
answers and explanations. Identify the shared domain and distil the \
foundational principles behind them. For each principle give the rule, why it \
works, an everyday analogy, and a short memory hook; add an analogous \
foundational concept, a common confusion and an exam elimination cue where \
they help. Verify facts against current documentation before answering.";

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Generative service request failed: {0}")]
    Service(#[from] GenAiError),

    #[error("The service returned an empty response, typically a safety-filter trigger")]
    EmptyResponse,

    #[error("Could not parse synthesis response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SynthesisError {
    /// Message safe to show to a user: service details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Service(GenAiError::RateLimited) => {
                "The generative service is rate limiting requests, try again shortly".to_string()
            }
            Self::Service(_) => "The generative service request failed".to_string(),
            other => other.to_string(),
        }
    }
}

/// A synthesis result plus what happened when persisting it.
#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    pub result: ExtractionResult,
    /// `None` when no store is configured.
    pub persistence: Option<PersistenceReport>,
}

pub fn build_request(staged: &[ExtractedQuestion]) -> Result<GenerateRequest, serde_json::Error> {
    let items = serde_json::to_string_pretty(staged)?;
    Ok(
        GenerateRequest::new(format!("{}\n\nQuestions:\n{}", SYNTHESIS_PROMPT, items))
            .with_schema(schema::extraction_result_schema())
            .with_search_grounding(),
    )
}

/// Parse response text into a result. Empty text is a terminal failure.
pub fn parse_result(text: &str) -> Result<ExtractionResult, SynthesisError> {
    if text.trim().is_empty() {
        return Err(SynthesisError::EmptyResponse);
    }
    Ok(serde_json::from_str(strip_code_fence(text))?)
}

/// Ask the service for a synthesis of `staged`. No retries.
pub async fn request_synthesis(
    service: &dyn GenerativeService,
    staged: &[ExtractedQuestion],
) -> Result<ExtractionResult, SynthesisError> {
    tracing::info!(
        model = service.model(),
        "Synthesizing {} staged questions",
        staged.len()
    );
    let text = service.generate(build_request(staged)?).await?;
    let result = parse_result(&text)?;
    tracing::info!(
        domain = %result.domain,
        "Synthesis produced {} blocks",
        result.blocks.len()
    );
    Ok(result)
}

/// Write one vault record per staged item, keyed by its text digest.
///
/// Writes are independent: a failure is logged and listed in the report, the
/// remaining items are still attempted.
pub async fn persist_result(
    store: &dyn VaultStore,
    result: &ExtractionResult,
    staged: &[ExtractedQuestion],
    now: DateTime<Utc>,
) -> PersistenceReport {
    let rule = result.headline_rule().unwrap_or(FALLBACK_RULE);
    let mut report = PersistenceReport::default();

    for question in staged {
        let item = VaultItem::new(question_digest(&question.text), &result.domain, rule, now);
        report.attempted += 1;
        match store.upsert(&item).await {
            Ok(()) => report.written += 1,
            Err(e) => {
                tracing::warn!(hash = %item.hash, "Failed to persist vault item: {}", e);
                report.failed.push(item.hash);
            }
        }
    }

    report
}

/// Request a synthesis and persist it when a store is available.
///
/// Returns `Ok(None)` without calling the service when nothing is staged.
pub async fn synthesize(
    service: &dyn GenerativeService,
    store: Option<&dyn VaultStore>,
    staged: &[ExtractedQuestion],
) -> Result<Option<SynthesisOutcome>, SynthesisError> {
    if staged.is_empty() {
        return Ok(None);
    }

    let result = request_synthesis(service, staged).await?;
    let persistence = match store {
        Some(store) => Some(persist_result(store, &result, staged, Utc::now()).await),
        None => None,
    };

    Ok(Some(SynthesisOutcome {
        result,
        persistence,
    }))
}
