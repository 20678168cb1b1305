use serde::{Deserialize, Serialize};

use super::{ExtractedQuestion, ExtractionResult, VaultItem};

/// Which screen the session is showing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Extraction, staging and synthesis.
    #[default]
    Gen,
    /// Previously persisted principles.
    Vault,
}

/// The status of the synthesis workflow.
///
/// - `Idle`: Nothing in flight, no result shown
/// - `Loading`: A synthesis request is in flight
/// - `Success`: The last synthesis produced a result
/// - `Error`: The last synthesis failed, see the session's error message
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Outcome of writing vault records after a successful synthesis.
///
/// Each write is attempted independently; a failed write never flips the
/// synthesis status, it is only listed here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceReport {
    pub attempted: usize,
    pub written: usize,
    /// Digests whose write failed.
    pub failed: Vec<String>,
}

impl PersistenceReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.written == self.attempted
    }
}

/// A read-only copy of the controller state, as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub view: View,
    pub status: SynthesisStatus,
    pub error: Option<String>,
    /// Candidates from the last extraction.
    pub results: Vec<ExtractedQuestion>,
    /// Dedup keys of results already pushed to staging.
    pub pushed: Vec<String>,
    pub staged: Vec<ExtractedQuestion>,
    pub result: Option<ExtractionResult>,
    pub persistence: Option<PersistenceReport>,
    pub vault: Vec<VaultItem>,
    pub extracting: bool,
    /// Vault records from the last synthesis are still being written.
    pub persisting: bool,
    pub store_available: bool,
    pub service_available: bool,
}
