//! Session controller.
//!
//! Owns the process-wide session state (view, extraction results, staging
//! list, synthesis status and result, fetched vault items) and sequences the
//! workflows against it. The state lock is never held across an `.await`:
//! each operation snapshots what it needs, releases the lock, talks to the
//! service or store, then locks again to apply the outcome.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use thiserror::Error;

use crate::document::{DocumentError, EncodedDocument};
use crate::genai::GenerativeService;
use crate::models::*;
use crate::staging::{PushOutcome, StagingList};
use crate::store::VaultStore;

use super::extraction::{self, ExtractionInput};
use super::synthesis::{self, SynthesisError};

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Generative service API key is not configured")]
    ServiceNotConfigured,

    #[error("Paste exam text or attach a PDF document")]
    EmptyInput,

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("No extracted question with key {0}")]
    UnknownItem(String),

    #[error("A {0} is already in progress")]
    Busy(&'static str),

    #[error("{}", .0.user_message())]
    Synthesis(#[from] SynthesisError),
}

#[derive(Debug, Default)]
struct Session {
    view: View,
    results: Vec<ExtractedQuestion>,
    pushed: Vec<String>,
    staging: StagingList,
    status: SynthesisStatus,
    error: Option<String>,
    result: Option<ExtractionResult>,
    persistence: Option<PersistenceReport>,
    vault: Vec<VaultItem>,
    extracting: bool,
    persisting: bool,
}

pub struct Controller {
    service: Option<Arc<dyn GenerativeService>>,
    store: Option<Arc<dyn VaultStore>>,
    session: Mutex<Session>,
}

impl Controller {
    pub fn new(
        service: Option<Arc<dyn GenerativeService>>,
        store: Option<Arc<dyn VaultStore>>,
    ) -> Self {
        Self {
            service,
            store,
            session: Mutex::new(Session::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().expect("session lock poisoned")
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let s = self.lock();
        SessionSnapshot {
            view: s.view,
            status: s.status,
            error: s.error.clone(),
            results: s.results.clone(),
            pushed: s.pushed.clone(),
            staged: s.staging.items().to_vec(),
            result: s.result.clone(),
            persistence: s.persistence.clone(),
            vault: s.vault.clone(),
            extracting: s.extracting,
            persisting: s.persisting,
            store_available: self.store.is_some(),
            service_available: self.service.is_some(),
        }
    }

    // ============================================================
    // Extraction
    // ============================================================

    /// Extract candidates from pasted text or a PDF, replacing the current
    /// results and resetting the pushed markers.
    pub async fn extract(
        &self,
        text: Option<String>,
        document: Option<EncodedDocument>,
    ) -> Result<Vec<ExtractedQuestion>, ControllerError> {
        let service = self
            .service
            .clone()
            .ok_or(ControllerError::ServiceNotConfigured)?;
        let document = document.map(EncodedDocument::validate).transpose()?;
        let input = ExtractionInput::resolve(text, document).ok_or(ControllerError::EmptyInput)?;

        {
            let mut s = self.lock();
            if s.extracting {
                return Err(ControllerError::Busy("extraction"));
            }
            s.extracting = true;
        }

        let questions = extraction::extract_questions(service.as_ref(), &input).await;

        let mut s = self.lock();
        s.extracting = false;
        s.results = questions.clone();
        s.pushed.clear();
        Ok(questions)
    }

    // ============================================================
    // Staging
    // ============================================================

    /// Copy the extracted question identified by `key` into the staging list.
    ///
    /// Already-pushed items and pushes past capacity are no-ops.
    pub fn stage(&self, key: &str) -> Result<Vec<ExtractedQuestion>, ControllerError> {
        let mut s = self.lock();
        if s.status == SynthesisStatus::Loading {
            return Err(ControllerError::Busy("synthesis"));
        }

        if !s.pushed.iter().any(|k| k == key) {
            let item = s
                .results
                .iter()
                .find(|q| q.dedup_key() == key)
                .cloned()
                .ok_or_else(|| ControllerError::UnknownItem(key.to_string()))?;

            if s.staging.push(item) == PushOutcome::Staged {
                s.pushed.push(key.to_string());
            }
        }

        Ok(s.staging.items().to_vec())
    }

    pub fn clear_staged(&self) -> Result<(), ControllerError> {
        let mut s = self.lock();
        if s.status == SynthesisStatus::Loading {
            return Err(ControllerError::Busy("synthesis"));
        }
        s.staging.clear();
        Ok(())
    }

    // ============================================================
    // Synthesis
    // ============================================================

    /// Synthesize the staged questions: `Loading`, then `Success` or `Error`.
    ///
    /// With nothing staged this is a no-op. On success the result is stored
    /// and the synthesized items leave the staging list in the same step, so
    /// anything staged while vault records are written survives. Until the
    /// writes finish, `synthesize` and `discard` are rejected as busy.
    pub async fn synthesize(&self) -> Result<SessionSnapshot, ControllerError> {
        let begun = {
            let mut s = self.lock();
            if s.staging.is_empty() {
                None
            } else {
                if s.status == SynthesisStatus::Loading || s.persisting {
                    return Err(ControllerError::Busy("synthesis"));
                }
                let service = self
                    .service
                    .clone()
                    .ok_or(ControllerError::ServiceNotConfigured)?;
                s.status = SynthesisStatus::Loading;
                s.error = None;
                s.persistence = None;
                Some((service, s.staging.items().to_vec()))
            }
        };
        let Some((service, staged)) = begun else {
            return Ok(self.snapshot());
        };

        let result = match synthesis::request_synthesis(service.as_ref(), &staged).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Synthesis failed: {}", e);
                let mut s = self.lock();
                s.status = SynthesisStatus::Error;
                s.error = Some(e.user_message());
                return Err(ControllerError::Synthesis(e));
            }
        };

        {
            let mut s = self.lock();
            s.result = Some(result.clone());
            s.status = SynthesisStatus::Success;
            s.staging.clear();
            s.persisting = self.store.is_some();
        }

        if let Some(store) = &self.store {
            let report =
                synthesis::persist_result(store.as_ref(), &result, &staged, Utc::now()).await;
            if !report.is_complete() {
                tracing::warn!(
                    "Persisted {} of {} vault items",
                    report.written,
                    report.attempted
                );
            }
            let mut s = self.lock();
            s.persistence = Some(report);
            s.persisting = false;
        }

        Ok(self.snapshot())
    }

    /// Clear a failed synthesis back to `Idle` so the user can try again.
    pub fn retry(&self) -> SessionSnapshot {
        {
            let mut s = self.lock();
            if s.status == SynthesisStatus::Error {
                s.status = SynthesisStatus::Idle;
                s.error = None;
            }
        }
        self.snapshot()
    }

    /// Drop the result, the staging list and the status in one step.
    pub fn discard(&self) -> Result<SessionSnapshot, ControllerError> {
        {
            let mut s = self.lock();
            if s.status == SynthesisStatus::Loading || s.persisting {
                return Err(ControllerError::Busy("synthesis"));
            }
            s.result = None;
            s.persistence = None;
            s.staging.clear();
            s.status = SynthesisStatus::Idle;
            s.error = None;
        }
        Ok(self.snapshot())
    }

    // ============================================================
    // View and vault
    // ============================================================

    /// Switch views. Opening the vault view refetches the vault.
    pub async fn set_view(&self, view: View) -> SessionSnapshot {
        self.lock().view = view;
        if view == View::Vault {
            self.refresh_vault().await;
        }
        self.snapshot()
    }

    /// Replace the cached vault items with a fresh ordered snapshot.
    ///
    /// Fetch failures and a missing store both leave the vault empty.
    pub async fn refresh_vault(&self) -> Vec<VaultItem> {
        let items = match &self.store {
            Some(store) => match store.list_recent().await {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!("Failed to fetch vault: {}", e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        self.lock().vault = items.clone();
        items
    }
}
