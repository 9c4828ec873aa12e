use std::sync::Arc;

use async_trait::async_trait;
use lexng_core::completion::CompletionBackend;
use lexng_core::config::TaskProfiles;
use lexng_core::validate::{self, AnalysisPayload, Insights};
use lexng_core::{Clause, Entity, ErrorKind, Result};
use lexng_domains::legal;
use tracing::warn;

use crate::prompts;

/// Produces the extraction steps of an analysis.
///
/// Entity and clause extraction never fail: problems degrade to an empty
/// list. Insights and the single-pass analysis return errors the
/// orchestrator treats as fatal.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn entities(&self, text: &str) -> Vec<Entity>;
    async fn clauses(&self, text: &str) -> Vec<Clause>;
    async fn insights(&self, text: &str) -> Result<Insights>;
    async fn full_analysis(&self, text: &str) -> Result<AnalysisPayload>;
}

pub struct LiveExtractor {
    backend: Arc<dyn CompletionBackend>,
    profiles: TaskProfiles,
}

impl LiveExtractor {
    pub fn new(backend: Arc<dyn CompletionBackend>, profiles: TaskProfiles) -> Self {
        Self { backend, profiles }
    }
}

#[async_trait]
impl Extractor for LiveExtractor {
    async fn entities(&self, text: &str) -> Vec<Entity> {
        let prompt = prompts::entity_prompt(text);
        let parsed = match self.backend.generate(&prompt, &self.profiles.entities).await {
            Ok(raw) => validate::parse_entities(&raw),
            Err(e) => Err(e),
        };
        parsed.unwrap_or_else(|e| {
            warn!(kind = %e.kind(), "entity extraction degraded to empty: {}", e.diagnostic());
            Vec::new()
        })
    }

    async fn clauses(&self, text: &str) -> Vec<Clause> {
        let prompt = prompts::clause_prompt(text);
        let parsed = match self.backend.generate(&prompt, &self.profiles.clauses).await {
            Ok(raw) => validate::parse_clauses(&raw),
            Err(e) => Err(e),
        };
        match parsed {
            Ok(mut clauses) => {
                clauses.truncate(prompts::MAX_CLAUSES);
                clauses
            },
            Err(e) => {
                warn!(kind = %e.kind(), "clause extraction degraded to empty: {}", e.diagnostic());
                Vec::new()
            },
        }
    }

    async fn insights(&self, text: &str) -> Result<Insights> {
        let prompt = prompts::insights_prompt(text);
        let raw = self.backend.generate(&prompt, &self.profiles.insights).await?;
        match validate::parse_insights(&raw) {
            Ok(insights) => Ok(insights),
            Err(e) if e.kind() == ErrorKind::MalformedModelOutput => {
                warn!("insights output malformed, using heuristic summary: {}", e.diagnostic());
                Ok(Insights {
                    summary: validate::heuristic_summary(&raw),
                    risk_analysis: Vec::new(),
                    nigerian_law_references: Vec::new(),
                })
            },
            Err(e) => Err(e),
        }
    }

    async fn full_analysis(&self, text: &str) -> Result<AnalysisPayload> {
        let prompt = prompts::full_analysis_prompt(text);
        let raw = self.backend.generate(&prompt, &self.profiles.analysis).await?;
        validate::parse_full_analysis(&raw)
    }
}

/// Fixed CAMA fixtures, used when no completion service is configured.
pub struct DemoExtractor;

#[async_trait]
impl Extractor for DemoExtractor {
    async fn entities(&self, _text: &str) -> Vec<Entity> {
        legal::demo_entities()
    }

    async fn clauses(&self, _text: &str) -> Vec<Clause> {
        legal::demo_clauses()
    }

    async fn insights(&self, _text: &str) -> Result<Insights> {
        Ok(Insights {
            summary: legal::DEMO_SUMMARY.to_string(),
            risk_analysis: legal::demo_risks(),
            nigerian_law_references: legal::demo_references(),
        })
    }

    async fn full_analysis(&self, _text: &str) -> Result<AnalysisPayload> {
        Ok(AnalysisPayload {
            summary: legal::DEMO_SUMMARY.to_string(),
            entities: legal::demo_entities(),
            key_clauses: legal::demo_clauses(),
            risk_analysis: legal::demo_risks(),
            nigerian_law_references: legal::demo_references(),
        })
    }
}
