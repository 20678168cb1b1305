//! Vault persistence.
//!
//! The vault is a named collection of [`VaultItem`] documents keyed by
//! question digest. [`connect`] turns the store configuration into a shared
//! handle, or no handle at all when no project is configured; callers treat
//! that as "vault disabled", not as an error.

mod firestore;
mod schema;
mod sqlite;

pub use firestore::FirestoreStore;
pub use sqlite::SqliteStore;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{StoreBackend, StoreConfig};
use crate::models::VaultItem;

/// Document store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized: check the document store API key")]
    Unauthorized,

    #[error("Store error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed store response: {0}")]
    Malformed(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// A collection of vault documents.
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Insert or replace the document keyed by `item.hash`.
    async fn upsert(&self, item: &VaultItem) -> Result<(), StoreError>;

    /// Every document, most recently mastered first.
    async fn list_recent(&self) -> Result<Vec<VaultItem>, StoreError>;
}

/// Build the configured store, once per process.
///
/// Returns `Ok(None)` when no project identifier is configured.
pub fn connect(config: &StoreConfig) -> Result<Option<Arc<dyn VaultStore>>, StoreError> {
    let Some(project_id) = config.project_id.as_deref() else {
        tracing::info!("No store project configured, vault disabled");
        return Ok(None);
    };

    let store: Arc<dyn VaultStore> = match config.backend {
        StoreBackend::Firestore => {
            tracing::info!(
                "Using Firestore collection {} in project {}",
                config.collection,
                project_id
            );
            Arc::new(FirestoreStore::new(
                &config.base_url,
                project_id,
                &config.collection,
                config.api_key.clone(),
            ))
        }
        StoreBackend::Sqlite => {
            let store = SqliteStore::open_in_dir(&config.data_dir, project_id)
                .and_then(|s| s.migrate().map(|_| s))
                .map_err(|e| StoreError::Database(e.to_string()))?;
            Arc::new(store)
        }
    };

    Ok(Some(store))
}
