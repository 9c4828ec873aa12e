use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{try_join3, try_join_all};
use lexng_core::completion::{CompletionBackend, GenerationOptions};
use lexng_core::{AnalysisTranslation, DocumentAnalysis, Error, Result, TranslationResult};
use tracing::{debug, info};

use crate::prompts;

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text`. Identity when both languages match, with no
    /// external call.
    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<TranslationResult>;
}

pub struct LiveTranslator {
    backend: Arc<dyn CompletionBackend>,
    options: GenerationOptions,
}

impl LiveTranslator {
    pub fn new(backend: Arc<dyn CompletionBackend>, options: GenerationOptions) -> Self {
        Self { backend, options }
    }
}

#[async_trait]
impl Translator for LiveTranslator {
    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<TranslationResult> {
        let Some(prompt) = prompts::translation_prompt(text, from, to) else {
            return Ok(TranslationResult::identity(text, from));
        };
        let translated = self.backend.generate(&prompt, &self.options).await?;
        let translated = translated.trim();
        if translated.is_empty() && !text.trim().is_empty() {
            return Err(Error::malformed("translation came back empty", translated));
        }
        debug!(from, to, input_len = text.len(), output_len = translated.len(), "translated");
        Ok(TranslationResult {
            original_language: from.to_string(),
            translated_language: to.to_string(),
            original_text: text.to_string(),
            translated_text: translated.to_string(),
        })
    }
}

/// Offline stand-in: the original text behind an explanatory note.
pub struct OfflineTranslator;

#[async_trait]
impl Translator for OfflineTranslator {
    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<TranslationResult> {
        if prompts::same_language(from, to) {
            return Ok(TranslationResult::identity(text, from));
        }
        Ok(TranslationResult {
            original_language: from.to_string(),
            translated_language: to.to_string(),
            original_text: text.to_string(),
            translated_text: format!(
                "[Translation from {from} to {to} would appear here. \
                 Configure Groq API for actual translation.]\n\n{text}"
            ),
        })
    }
}

/// Build the translated overlay for a stored analysis.
///
/// The summary goes first; clause, risk and reference texts are then
/// translated concurrently. Any single failure fails the whole pass.
pub async fn translate_analysis(
    translator: &dyn Translator,
    analysis: &DocumentAnalysis,
    to: &str,
) -> Result<AnalysisTranslation> {
    let from = analysis.language.as_str();
    if prompts::same_language(from, to) {
        return Ok(AnalysisTranslation::untranslated(analysis));
    }

    let summary = translator.translate(&analysis.summary, from, to).await?.translated_text;

    let (clause_contents, risk_descriptions, reference_descriptions) = try_join3(
        translate_all(translator, analysis.key_clauses.iter().map(|c| c.content.as_str()), from, to),
        translate_all(translator, analysis.risk_analysis.iter().map(|r| r.description.as_str()), from, to),
        translate_all(
            translator,
            analysis.nigerian_law_references.iter().map(|r| r.description.as_str()),
            from,
            to,
        ),
    )
    .await?;

    info!(
        analysis_id = %analysis.id,
        to,
        clauses = clause_contents.len(),
        risks = risk_descriptions.len(),
        references = reference_descriptions.len(),
        "analysis translated"
    );

    Ok(AnalysisTranslation {
        language: to.to_string(),
        summary,
        clause_contents,
        risk_descriptions,
        reference_descriptions,
    })
}

async fn translate_all<'a>(
    translator: &dyn Translator,
    texts: impl Iterator<Item = &'a str>,
    from: &str,
    to: &str,
) -> Result<Vec<String>> {
    try_join_all(texts.map(|t| async move {
        translator.translate(t, from, to).await.map(|r| r.translated_text)
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn offline_translation_wraps_original_text() {
        let r = OfflineTranslator.translate("Ẹ káàárọ̀", "yo", "en").await.unwrap();
        assert!(r.translated_text.starts_with("[Translation from yo to en"));
        assert!(r.translated_text.ends_with("Ẹ káàárọ̀"));
        assert_eq!(r.original_language, "yo");
        assert_eq!(r.translated_language, "en");
    }

    #[tokio::test]
    async fn offline_identity_for_same_language() {
        let r = OfflineTranslator.translate("text", "ha", "ha").await.unwrap();
        assert_eq!(r, TranslationResult::identity("text", "ha"));
    }
}
