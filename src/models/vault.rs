use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A persisted vault record.
///
/// `hash` is the digest of the originating question text and doubles as the
/// document key, so re-synthesizing the same question overwrites its record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultItem {
    pub hash: String,
    pub domain: String,
    pub foundational_rule: String,
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub mastered_at: String,
}

impl VaultItem {
    pub fn new(
        hash: impl Into<String>,
        domain: impl Into<String>,
        foundational_rule: impl Into<String>,
        mastered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            hash: hash.into(),
            domain: domain.into(),
            foundational_rule: foundational_rule.into(),
            mastered_at: format_timestamp(mastered_at),
        }
    }
}

/// Fixed-width UTC rendering, so lexical order matches chronological order.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
