//! Test doubles shared by the integration specs.
#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use insight_vault::genai::{GenAiError, GenerateRequest, GenerativeService};
use insight_vault::models::VaultItem;
use insight_vault::store::{StoreError, VaultStore};

/// Parks a call until the test opens it, so state can be inspected mid-flight.
#[derive(Default)]
pub struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }

    /// Resolves once a gated call is parked.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn open(&self) {
        self.release.notify_one();
    }
}

/// Replays queued responses in order and records every request.
#[derive(Default)]
pub struct ScriptedService {
    responses: Mutex<VecDeque<Result<String, GenAiError>>>,
    requests: Mutex<Vec<GenerateRequest>>,
    gate: Mutex<Option<Arc<Gate>>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::new().then_reply(text)
    }

    pub fn then_reply(self, text: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(text.into()));
        self
    }

    pub fn then_fail(self, error: GenAiError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Park the next `generate` call on `gate`.
    pub fn hold_next(&self, gate: Arc<Gate>) {
        *self.gate.lock().unwrap() = Some(gate);
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeService for ScriptedService {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String, GenAiError> {
        self.requests.lock().unwrap().push(request);
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenAiError::Malformed("no scripted response".to_string())))
    }
}

/// In-memory vault that can be told to fail particular writes or reads.
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<Vec<VaultItem>>,
    writes: Mutex<Vec<VaultItem>>,
    failing_hashes: Mutex<HashSet<String>>,
    fail_reads: Mutex<bool>,
    gate: Mutex<Option<Arc<Gate>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<VaultItem>) -> Self {
        let store = Self::default();
        *store.items.lock().unwrap() = items;
        store
    }

    pub fn fail_writes_for(&self, hash: &str) {
        self.failing_hashes.lock().unwrap().insert(hash.to_string());
    }

    /// Park the next `upsert` call on `gate`.
    pub fn hold_next_write(&self, gate: Arc<Gate>) {
        *self.gate.lock().unwrap() = Some(gate);
    }

    pub fn fail_reads(&self) {
        *self.fail_reads.lock().unwrap() = true;
    }

    /// Every upsert attempted, in order, including failed ones.
    pub fn writes(&self) -> Vec<VaultItem> {
        self.writes.lock().unwrap().clone()
    }

    pub fn items(&self) -> Vec<VaultItem> {
        self.items.lock().unwrap().clone()
    }
}

#[async_trait]
impl VaultStore for MemoryStore {
    async fn upsert(&self, item: &VaultItem) -> Result<(), StoreError> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        self.writes.lock().unwrap().push(item.clone());
        if self.failing_hashes.lock().unwrap().contains(&item.hash) {
            return Err(StoreError::Database("write rejected".to_string()));
        }
        let mut items = self.items.lock().unwrap();
        items.retain(|existing| existing.hash != item.hash);
        items.push(item.clone());
        Ok(())
    }

    async fn list_recent(&self) -> Result<Vec<VaultItem>, StoreError> {
        if *self.fail_reads.lock().unwrap() {
            return Err(StoreError::Database("read rejected".to_string()));
        }
        let mut items = self.items();
        items.sort_by(|a, b| b.mastered_at.cmp(&a.mastered_at));
        Ok(items)
    }
}

pub fn as_service(service: &Arc<ScriptedService>) -> Option<Arc<dyn GenerativeService>> {
    Some(service.clone() as Arc<dyn GenerativeService>)
}

pub fn as_store(store: &Arc<MemoryStore>) -> Option<Arc<dyn VaultStore>> {
    Some(store.clone() as Arc<dyn VaultStore>)
}

/// The zone-redundancy synthesis response used across specs.
pub const ZRS_RESPONSE: &str = r#"{"domain":"Storage","blocks":[{"foundationalRule":"Zone-redundant storage requires Standard or Premium tier with ZRS enabled","whyItWorks":"...","analogy":"...","memoryHook":"ZRS=3 zones"}]}"#;

pub const ZRS_QUESTION: &str = "What SKU tier supports zone redundancy?";

/// A JSON array of `n` extracted questions with ids `q1..qn`.
pub fn questions_json(n: usize) -> String {
    let items: Vec<_> = (1..=n)
        .map(|i| {
            serde_json::json!({
                "id": format!("q{}", i),
                "text": format!("Question {}?", i),
                "correctAnswer": format!("Answer {}", i),
                "explanation": "Because."
            })
        })
        .collect();
    serde_json::to_string(&items).unwrap()
}
