use serde::{Deserialize, Deserializer, Serialize};

/// A candidate question produced by the extraction workflow.
///
/// Only items the source material marks as answered correctly are extracted.
/// The model service sometimes numbers its items, so `id` accepts a JSON
/// string or number and is normalized to a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedQuestion {
    #[serde(
        default,
        deserialize_with = "deserialize_loose_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

impl ExtractedQuestion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            correct_answer: String::new(),
            explanation: String::new(),
        }
    }

    /// Session identity: the service-assigned `id` when present, else the raw text.
    pub fn dedup_key(&self) -> &str {
        match self.id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => &self.text,
        }
    }
}

fn deserialize_loose_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
