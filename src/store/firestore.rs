//! Firestore REST backend.
//!
//! Documents live at `projects/{project}/databases/(default)/documents/{collection}/{hash}`.
//! `collection` may itself be a nested path (`a/b/c`); the query parent is then
//! the document that owns the last segment.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{StoreError, VaultStore};
use crate::models::VaultItem;

#[derive(Debug, Clone)]
pub struct FirestoreStore {
    base_url: String,
    project_id: String,
    collection: String,
    api_key: Option<String>,
    client: Client,
}

impl FirestoreStore {
    pub fn new(
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        collection: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            project_id: project_id.into(),
            collection: collection.into().trim_matches('/').to_string(),
            api_key,
            client: Client::new(),
        }
    }

    fn documents_root(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents",
            self.base_url.trim_end_matches('/'),
            self.project_id
        )
    }

    fn document_url(&self, id: &str) -> String {
        format!("{}/{}/{}", self.documents_root(), self.collection, id)
    }

    /// `runQuery` endpoint plus the collection id to query under it.
    fn query_target(&self) -> (String, &str) {
        match self.collection.rsplit_once('/') {
            Some((parent, id)) => (
                format!("{}/{}:runQuery", self.documents_root(), parent),
                id,
            ),
            None => (
                format!("{}:runQuery", self.documents_root()),
                self.collection.as_str(),
            ),
        }
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.request(method, url);
        if let Some(ref key) = self.api_key {
            req = req.header("x-goog-api-key", key);
        }
        req
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized,
            _ => StoreError::Status {
                status: status.as_u16(),
                body,
            },
        })
    }
}

// ============================================================
// Wire types
// ============================================================

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Value {
    #[serde(skip_serializing_if = "Option::is_none")]
    string_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp_value: Option<String>,
}

impl Value {
    fn string(s: &str) -> Self {
        Self {
            string_value: Some(s.to_string()),
            ..Default::default()
        }
    }

    fn into_string(self) -> Option<String> {
        self.string_value.or(self.timestamp_value)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Document {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default)]
    fields: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RunQueryEntry {
    document: Option<Document>,
}

impl From<&VaultItem> for Document {
    fn from(item: &VaultItem) -> Self {
        let fields = HashMap::from([
            ("hash".to_string(), Value::string(&item.hash)),
            ("domain".to_string(), Value::string(&item.domain)),
            (
                "foundationalRule".to_string(),
                Value::string(&item.foundational_rule),
            ),
            ("masteredAt".to_string(), Value::string(&item.mastered_at)),
        ]);
        Self {
            name: String::new(),
            fields,
        }
    }
}

impl Document {
    fn into_item(mut self) -> Option<VaultItem> {
        let mut take = |key: &str| self.fields.remove(key).and_then(Value::into_string);
        let hash = take("hash");
        let domain = take("domain")?;
        let foundational_rule = take("foundationalRule")?;
        let mastered_at = take("masteredAt")?;
        let hash = hash.or_else(|| self.name.rsplit('/').next().map(str::to_string))?;
        Some(VaultItem {
            hash,
            domain,
            foundational_rule,
            mastered_at,
        })
    }
}

#[async_trait]
impl VaultStore for FirestoreStore {
    async fn upsert(&self, item: &VaultItem) -> Result<(), StoreError> {
        let url = self.document_url(&item.hash);
        tracing::debug!(hash = %item.hash, "Upserting vault document");

        let response = self
            .request(reqwest::Method::PATCH, &url)
            .json(&Document::from(item))
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn list_recent(&self) -> Result<Vec<VaultItem>, StoreError> {
        let (url, collection_id) = self.query_target();
        let query = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection_id }],
                "orderBy": [{
                    "field": { "fieldPath": "masteredAt" },
                    "direction": "DESCENDING"
                }]
            }
        });

        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&query)
            .send()
            .await?;
        let entries: Vec<RunQueryEntry> = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        let items = entries
            .into_iter()
            .filter_map(|entry| entry.document)
            .filter_map(|doc| {
                let name = doc.name.clone();
                let item = doc.into_item();
                if item.is_none() {
                    tracing::warn!("Skipping malformed vault document {}", name);
                }
                item
            })
            .collect();

        Ok(items)
    }
}
