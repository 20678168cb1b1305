use serde::{Deserialize, Serialize};

/// One synthesized principle.
///
/// `foundational_rule`, `why_it_works`, `analogy` and `memory_hook` are the
/// fields the response schema marks as required; the rest are best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightBlock {
    pub foundational_rule: String,
    pub why_it_works: String,
    pub analogy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analogous_foundational_concept: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_confusion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_elimination_cue: Option<String>,
    pub memory_hook: String,
}

/// Output of the synthesis workflow: a domain label and its insight blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub domain: String,
    #[serde(default)]
    pub blocks: Vec<InsightBlock>,
}

impl ExtractionResult {
    /// The rule recorded in the vault for every staged item of this result.
    pub fn headline_rule(&self) -> Option<&str> {
        self.blocks.first().map(|b| b.foundational_rule.as_str())
    }
}
