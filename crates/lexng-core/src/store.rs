use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::types::{AnalysisPatch, DocumentAnalysis};

/// Change notification emitted after every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreEvent {
    Saved { id: String },
    Deleted { id: String },
}

/// Process-lifetime keyed store for analysis records.
///
/// Writes replace whole records by id (last write wins). Records are lost when
/// the process exits. Share it as `Arc<DocumentStore>`.
pub struct DocumentStore {
    docs: RwLock<HashMap<String, DocumentAnalysis>>,
    event_tx: broadcast::Sender<StoreEvent>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            docs: RwLock::new(HashMap::new()),
            event_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.event_tx.subscribe()
    }

    fn notify(&self, event: StoreEvent) {
        // No subscribers is fine.
        let _ = self.event_tx.send(event);
    }

    pub fn save(&self, record: DocumentAnalysis) {
        let id = record.id.clone();
        self.docs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.clone(), record);
        debug!(analysis_id = %id, "analysis saved");
        self.notify(StoreEvent::Saved { id });
    }

    pub fn get(&self, id: &str) -> Option<DocumentAnalysis> {
        self.docs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.docs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(id)
    }

    pub fn delete(&self, id: &str) -> bool {
        let removed = self
            .docs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
            .is_some();
        if removed {
            debug!(analysis_id = %id, "analysis deleted");
            self.notify(StoreEvent::Deleted { id: id.to_string() });
        }
        removed
    }

    /// All records, newest first.
    pub fn list_all(&self) -> Vec<DocumentAnalysis> {
        let mut all: Vec<DocumentAnalysis> = self
            .docs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        all
    }

    pub fn len(&self) -> usize {
        self.docs.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shallow-merge `patch` into the stored record. `None` when the id is absent.
    pub fn update(&self, id: &str, patch: &AnalysisPatch) -> Option<DocumentAnalysis> {
        let updated = {
            let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
            let record = docs.get_mut(id)?;
            patch.apply_to(record);
            record.clone()
        };
        debug!(analysis_id = %id, "analysis updated");
        self.notify(StoreEvent::Saved { id: id.to_string() });
        Some(updated)
    }

    /// Bulk push. Records with an empty id are skipped. Returns how many were saved.
    pub fn save_all(&self, records: Vec<DocumentAnalysis>) -> usize {
        let mut saved = 0;
        for record in records {
            if record.id.trim().is_empty() {
                continue;
            }
            self.save(record);
            saved += 1;
        }
        saved
    }

    /// Push the caller's records, then return the full listing.
    pub fn reconcile(&self, records: Vec<DocumentAnalysis>) -> Vec<DocumentAnalysis> {
        self.save_all(records);
        self.list_all()
    }
}
