use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use lexng_core::completion::{CompletionBackend, GenerationOptions};
use lexng_core::text::{capitalize, first_non_empty_line};
use lexng_core::{DocumentAnalysis, DocumentSpec, Error, GeneratedDocument, Result};
use lexng_domains::{render_analysis_document, render_template};
use tracing::info;

use crate::prompts;

/// Writes document text, either through the completion service or from
/// fixed templates.
#[async_trait]
pub trait Drafter: Send + Sync {
    async fn draft(&self, spec: &DocumentSpec) -> Result<GeneratedDocument>;
    async fn redraft(&self, analysis: &DocumentAnalysis) -> Result<String>;
}

pub struct LiveDrafter {
    backend: Arc<dyn CompletionBackend>,
    generation: GenerationOptions,
    regeneration: GenerationOptions,
}

impl LiveDrafter {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        generation: GenerationOptions,
        regeneration: GenerationOptions,
    ) -> Self {
        Self {
            backend,
            generation,
            regeneration,
        }
    }
}

/// First non-empty output line, else the caller's title, else the type.
fn live_title(output: &str, spec: &DocumentSpec) -> String {
    first_non_empty_line(output)
        .map(str::to_string)
        .or_else(|| {
            spec.title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| capitalize(spec.kind.trim()))
}

#[async_trait]
impl Drafter for LiveDrafter {
    async fn draft(&self, spec: &DocumentSpec) -> Result<GeneratedDocument> {
        let prompt = prompts::generation_prompt(spec);
        let document = self.backend.generate(&prompt, &self.generation).await?;
        if document.trim().is_empty() {
            return Err(Error::malformed("generated document is empty", &document));
        }
        let title = live_title(&document, spec);
        info!(kind = %spec.kind, title = %title, output_len = document.len(), "document drafted");
        Ok(GeneratedDocument { document, title })
    }

    async fn redraft(&self, analysis: &DocumentAnalysis) -> Result<String> {
        let prompt = prompts::regeneration_prompt(analysis);
        let document = self.backend.generate(&prompt, &self.regeneration).await?;
        if document.trim().is_empty() {
            return Err(Error::malformed("regenerated document is empty", &document));
        }
        Ok(document)
    }
}

/// Deterministic template output dated today.
pub struct TemplateDrafter;

#[async_trait]
impl Drafter for TemplateDrafter {
    async fn draft(&self, spec: &DocumentSpec) -> Result<GeneratedDocument> {
        Ok(render_template(spec, Utc::now().date_naive()))
    }

    async fn redraft(&self, analysis: &DocumentAnalysis) -> Result<String> {
        Ok(render_analysis_document(analysis, Utc::now().date_naive()))
    }
}
