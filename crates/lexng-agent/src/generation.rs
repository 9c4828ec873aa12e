use std::sync::Arc;

use lexng_core::store::DocumentStore;
use lexng_core::{DocumentAnalysis, DocumentSpec, Error, GeneratedDocument, Result};
use serde::Serialize;
use tracing::info;

use crate::draft::Drafter;

/// Plain-text document regenerated from a stored analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegeneratedDocument {
    pub analysis_id: String,
    pub document_name: String,
    pub document: String,
}

pub struct Generator {
    drafter: Arc<dyn Drafter>,
    store: Arc<DocumentStore>,
}

impl Generator {
    pub fn new(drafter: Arc<dyn Drafter>, store: Arc<DocumentStore>) -> Self {
        Self { drafter, store }
    }

    pub async fn generate_free(&self, spec: &DocumentSpec) -> Result<GeneratedDocument> {
        if spec.kind.trim().is_empty() {
            return Err(Error::Validation("document type is required".into()));
        }
        if spec.requirements.trim().is_empty() {
            return Err(Error::Validation("requirements are required".into()));
        }
        self.drafter.draft(spec).await
    }

    /// Regenerate from the stored record. When the id is unknown, a record
    /// supplied by the caller is stored under that id and used instead.
    pub async fn generate_from_analysis(
        &self,
        id: &str,
        inline: Option<DocumentAnalysis>,
    ) -> Result<RegeneratedDocument> {
        let analysis = match (self.store.get(id), inline) {
            (Some(stored), _) => stored,
            (None, Some(mut supplied)) => {
                supplied.id = id.to_string();
                info!(analysis_id = %id, "storing caller-supplied analysis for regeneration");
                self.store.save(supplied.clone());
                supplied
            },
            (None, None) => return Err(Error::analysis_not_found(id)),
        };

        let document = self.drafter.redraft(&analysis).await?;
        info!(analysis_id = %id, output_len = document.len(), "document regenerated");
        Ok(RegeneratedDocument {
            analysis_id: analysis.id,
            document_name: analysis.document_name,
            document,
        })
    }
}
