//! Client-side keyed store persisted as one JSON file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lexng_core::store::StoreEvent;
use lexng_core::DocumentAnalysis;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

use crate::client::LexngClient;
use crate::error::Result;

pub struct LocalStore {
    path: PathBuf,
    docs: Mutex<HashMap<String, DocumentAnalysis>>,
    event_tx: broadcast::Sender<StoreEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub pushed: usize,
    pub pulled: usize,
}

impl LocalStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let docs = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => HashMap::new(),
            Ok(bytes) => {
                let list: Vec<DocumentAnalysis> = serde_json::from_slice(&bytes)?;
                list.into_iter().map(|d| (d.id.clone(), d)).collect()
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        let (event_tx, _) = broadcast::channel(256);
        Ok(Self {
            path,
            docs: Mutex::new(docs),
            event_tx,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.event_tx.subscribe()
    }

    fn notify(&self, event: StoreEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Written to a sibling temp file, then renamed into place.
    async fn persist(&self, docs: &HashMap<String, DocumentAnalysis>) -> Result<()> {
        let mut list: Vec<&DocumentAnalysis> = docs.values().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let bytes = serde_json::to_vec_pretty(&list)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    pub async fn save(&self, record: DocumentAnalysis) -> Result<()> {
        let id = record.id.clone();
        let mut docs = self.docs.lock().await;
        docs.insert(id.clone(), record);
        self.persist(&docs).await?;
        drop(docs);
        debug!(analysis_id = %id, "saved locally");
        self.notify(StoreEvent::Saved { id });
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Option<DocumentAnalysis> {
        self.docs.lock().await.get(id).cloned()
    }

    /// Returns whether a record was removed.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let mut docs = self.docs.lock().await;
        if docs.remove(id).is_none() {
            return Ok(false);
        }
        self.persist(&docs).await?;
        drop(docs);
        self.notify(StoreEvent::Deleted { id: id.to_string() });
        Ok(true)
    }

    /// Newest first.
    pub async fn list_all(&self) -> Vec<DocumentAnalysis> {
        let mut list: Vec<DocumentAnalysis> = self.docs.lock().await.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list
    }

    pub async fn clear(&self) -> Result<()> {
        let mut docs = self.docs.lock().await;
        let ids: Vec<String> = docs.drain().map(|(id, _)| id).collect();
        self.persist(&docs).await?;
        drop(docs);
        for id in ids {
            self.notify(StoreEvent::Deleted { id });
        }
        Ok(())
    }

    /// Push every local record, then replace local copies with the server's
    /// listing. Last write by id wins; records only held locally are kept.
    pub async fn sync(&self, client: &LexngClient) -> Result<SyncReport> {
        let local = self.list_all().await;
        let pushed = client.push_documents(&local).await?;
        let remote = client.pull_documents().await?;

        let mut docs = self.docs.lock().await;
        let mut changed = Vec::new();
        for record in remote {
            if docs.get(&record.id) != Some(&record) {
                changed.push(record.id.clone());
                docs.insert(record.id.clone(), record);
            }
        }
        if !changed.is_empty() {
            self.persist(&docs).await?;
        }
        drop(docs);

        let pulled = changed.len();
        for id in changed {
            self.notify(StoreEvent::Saved { id });
        }
        info!(pushed, pulled, "local store synced");
        Ok(SyncReport { pushed, pulled })
    }
}
