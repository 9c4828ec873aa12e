use std::sync::Arc;

use chrono::Utc;
use lexng_core::completion::CompletionBackend;
use lexng_core::config::Config;
use lexng_core::store::DocumentStore;
use lexng_core::{
    AnalysisPatch, AnalysisTranslation, DocumentAnalysis, DocumentSpec, DocumentUpload, Error,
    GeneratedDocument, Result, TranslationResult,
};
use lexng_domains::legal;
use tracing::info;

use crate::analysis::Analyzer;
use crate::draft::{Drafter, LiveDrafter, TemplateDrafter};
use crate::extract::{DemoExtractor, Extractor, LiveExtractor};
use crate::generation::{Generator, RegeneratedDocument};
use crate::translate::{self, LiveTranslator, OfflineTranslator, Translator};

/// The operations exposed to callers. Live or offline strategies are picked
/// once, from the backend's availability flag.
pub struct LegalService {
    backend: Arc<dyn CompletionBackend>,
    store: Arc<DocumentStore>,
    translator: Arc<dyn Translator>,
    analyzer: Analyzer,
    generator: Generator,
    sample_fixtures: bool,
}

impl LegalService {
    pub fn new(config: &Config, backend: Arc<dyn CompletionBackend>, store: Arc<DocumentStore>) -> Self {
        let live = backend.is_available();
        let profiles = config.profiles.clone();

        let (extractor, translator, drafter): (
            Arc<dyn Extractor>,
            Arc<dyn Translator>,
            Arc<dyn Drafter>,
        ) = if live {
            (
                Arc::new(LiveExtractor::new(backend.clone(), profiles.clone())),
                Arc::new(LiveTranslator::new(backend.clone(), profiles.translation.clone())),
                Arc::new(LiveDrafter::new(
                    backend.clone(),
                    profiles.generation.clone(),
                    profiles.regeneration.clone(),
                )),
            )
        } else {
            (Arc::new(DemoExtractor), Arc::new(OfflineTranslator), Arc::new(TemplateDrafter))
        };
        info!(
            live,
            mode = ?config.analysis_mode,
            working_language = %config.working_language,
            "legal service ready"
        );

        let analyzer = Analyzer::new(
            extractor,
            translator.clone(),
            store.clone(),
            config.working_language.clone(),
            config.analysis_mode,
        );
        let generator = Generator::new(drafter, store.clone());

        Self {
            backend,
            store,
            translator,
            analyzer,
            generator,
            sample_fixtures: config.sample_fixtures,
        }
    }

    pub fn is_live(&self) -> bool {
        self.backend.is_available()
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// Analyse and store a document, returning the new record's id.
    pub async fn analyze(&self, upload: DocumentUpload) -> Result<String> {
        Ok(self.analyze_record(upload).await?.id)
    }

    pub async fn analyze_record(&self, upload: DocumentUpload) -> Result<DocumentAnalysis> {
        self.analyzer.analyze(upload).await
    }

    /// Stored record, or the sample fixture when sample fixtures are enabled.
    /// The sample is never stored.
    pub fn get_analysis(&self, id: &str) -> Option<DocumentAnalysis> {
        self.store.get(id).or_else(|| {
            self.sample_fixtures
                .then(|| legal::sample_analysis(id, Utc::now()))
        })
    }

    pub fn update_analysis(&self, id: &str, patch: &AnalysisPatch) -> Option<DocumentAnalysis> {
        self.store.update(id, patch)
    }

    pub fn delete_analysis(&self, id: &str) -> bool {
        self.store.delete(id)
    }

    pub fn list_analyses(&self) -> Vec<DocumentAnalysis> {
        self.store.list_all()
    }

    pub async fn translate(&self, text: &str, from: &str, to: &str) -> Result<TranslationResult> {
        if crate::prompts::same_language(from, to) {
            return Ok(TranslationResult::identity(text, from));
        }
        if text.trim().is_empty() {
            return Err(Error::Validation("text to translate is required".into()));
        }
        if to.trim().is_empty() {
            return Err(Error::Validation("target language is required".into()));
        }
        self.translator.translate(text, from, to).await
    }

    /// Translated overlay for a stored record. The record is not modified.
    pub async fn translate_analysis(&self, id: &str, to: &str) -> Result<AnalysisTranslation> {
        if to.trim().is_empty() {
            return Err(Error::Validation("target language is required".into()));
        }
        let analysis = self.store.get(id).ok_or_else(|| Error::analysis_not_found(id))?;
        translate::translate_analysis(self.translator.as_ref(), &analysis, to).await
    }

    pub async fn generate_free_document(&self, spec: &DocumentSpec) -> Result<GeneratedDocument> {
        self.generator.generate_free(spec).await
    }

    pub async fn generate_from_analysis(
        &self,
        id: &str,
        inline: Option<DocumentAnalysis>,
    ) -> Result<RegeneratedDocument> {
        self.generator.generate_from_analysis(id, inline).await
    }

    pub async fn list_models(&self) -> Vec<String> {
        self.backend.list_models().await
    }
}
