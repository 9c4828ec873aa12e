use std::sync::Arc;

use chrono::Utc;
use lexng_core::config::AnalysisMode;
use lexng_core::store::DocumentStore;
use lexng_core::validate::AnalysisPayload;
use lexng_core::{Clause, DocumentAnalysis, DocumentUpload, Error, Result, Sentiment};
use lexng_domains::legal::REVISION_SUGGESTION;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{info, warn};

use crate::extract::Extractor;
use crate::prompts;
use crate::translate::Translator;

pub const ID_LEN: usize = 26;
pub const FALLBACK_SUMMARY: &str = "Failed to generate summary. Please try again.";

/// Runs one document through translation, extraction and assembly, then
/// stores the record.
pub struct Analyzer {
    extractor: Arc<dyn Extractor>,
    translator: Arc<dyn Translator>,
    store: Arc<DocumentStore>,
    working_language: String,
    mode: AnalysisMode,
}

impl Analyzer {
    pub fn new(
        extractor: Arc<dyn Extractor>,
        translator: Arc<dyn Translator>,
        store: Arc<DocumentStore>,
        working_language: impl Into<String>,
        mode: AnalysisMode,
    ) -> Self {
        Self {
            extractor,
            translator,
            store,
            working_language: working_language.into(),
            mode,
        }
    }

    /// Always yields a stored record unless the upload has no content.
    pub async fn analyze(&self, upload: DocumentUpload) -> Result<DocumentAnalysis> {
        if upload.text.trim().is_empty() {
            return Err(Error::Validation("document has no content".into()));
        }
        let id = self.fresh_id();
        info!(analysis_id = %id, document = %upload.document_name, language = %upload.language, "analysis started");

        let text = self.working_text(&id, &upload).await;
        let record = match self.extract(&text).await {
            Ok(payload) => assemble(id, &upload, payload),
            Err(e) => {
                warn!(analysis_id = %id, kind = %e.kind(), "analysis failed, storing fallback record: {}", e.diagnostic());
                fallback_record(id, &upload)
            },
        };

        info!(
            analysis_id = %record.id,
            entities = record.entities.len(),
            clauses = record.key_clauses.len(),
            risks = record.risk_analysis.len(),
            references = record.nigerian_law_references.len(),
            "analysis stored"
        );
        self.store.save(record.clone());
        Ok(record)
    }

    /// Text in the working language. Translation failure keeps the original.
    async fn working_text(&self, id: &str, upload: &DocumentUpload) -> String {
        if prompts::same_language(&upload.language, &self.working_language) {
            return upload.text.clone();
        }
        match self
            .translator
            .translate(&upload.text, &upload.language, &self.working_language)
            .await
        {
            Ok(t) => t.translated_text,
            Err(e) => {
                warn!(analysis_id = %id, kind = %e.kind(), "translation failed, analysing original text");
                upload.text.clone()
            },
        }
    }

    async fn extract(&self, text: &str) -> Result<AnalysisPayload> {
        match self.mode {
            AnalysisMode::SinglePass => self.extractor.full_analysis(text).await,
            AnalysisMode::Staged => {
                let entities = self.extractor.entities(text).await;
                let key_clauses = self.extractor.clauses(text).await;
                let insights = self.extractor.insights(text).await?;
                Ok(AnalysisPayload {
                    summary: insights.summary,
                    entities,
                    key_clauses,
                    risk_analysis: insights.risk_analysis,
                    nigerian_law_references: insights.nigerian_law_references,
                })
            },
        }
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = random_id();
            if !self.store.contains(&id) {
                return id;
            }
        }
    }
}

fn random_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// Negative clauses without a suggestion get the standard revision note.
pub fn suggest_revisions(clauses: Vec<Clause>) -> Vec<Clause> {
    clauses
        .into_iter()
        .map(|mut c| {
            if c.sentiment == Sentiment::Negative && c.suggestion.is_none() {
                c.suggestion = Some(REVISION_SUGGESTION.to_string());
            }
            c
        })
        .collect()
}

fn assemble(id: String, upload: &DocumentUpload, payload: AnalysisPayload) -> DocumentAnalysis {
    DocumentAnalysis {
        id,
        document_name: upload.document_name.clone(),
        language: upload.language.clone(),
        summary: payload.summary,
        entities: payload.entities,
        key_clauses: suggest_revisions(payload.key_clauses),
        risk_analysis: payload.risk_analysis,
        nigerian_law_references: payload.nigerian_law_references,
        created_at: Utc::now(),
    }
}

fn fallback_record(id: String, upload: &DocumentUpload) -> DocumentAnalysis {
    DocumentAnalysis {
        id,
        document_name: upload.document_name.clone(),
        language: upload.language.clone(),
        summary: FALLBACK_SUMMARY.to_string(),
        entities: Vec::new(),
        key_clauses: Vec::new(),
        risk_analysis: Vec::new(),
        nigerian_law_references: Vec::new(),
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_lowercase_alphanumeric() {
        let id = random_id();
        assert_eq!(id.len(), ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(id, random_id());
    }

    #[test]
    fn only_negative_clauses_without_suggestion_are_annotated() {
        let clause = |sentiment, suggestion: Option<&str>| Clause {
            title: "t".into(),
            kind: "k".into(),
            content: "c".into(),
            sentiment,
            suggestion: suggestion.map(Into::into),
        };
        let out = suggest_revisions(vec![
            clause(Sentiment::Negative, None),
            clause(Sentiment::Negative, Some("")),
            clause(Sentiment::Positive, None),
        ]);
        assert_eq!(out[0].suggestion.as_deref(), Some(REVISION_SUGGESTION));
        assert_eq!(out[1].suggestion.as_deref(), Some(""));
        assert_eq!(out[2].suggestion, None);
    }
}
