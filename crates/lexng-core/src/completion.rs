use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Models reported when the service cannot be asked for its own list.
pub const FALLBACK_MODELS: &[&str] = &[
    "meta-llama/llama-4-scout-17b-16e-instruct",
    "llama2-70b-4096",
    "mixtral-8x7b-32768",
];

/// Sampling options for one completion call. Unset fields fall back to the
/// backend's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl GenerationOptions {
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
    pub const DEFAULT_MAX_TOKENS: u32 = 2048;

    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            model: None,
            temperature: Some(temperature),
            max_tokens: Some(max_tokens),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature_or_default(&self) -> f32 {
        self.temperature.unwrap_or(Self::DEFAULT_TEMPERATURE)
    }

    pub fn max_tokens_or_default(&self) -> u32 {
        self.max_tokens.unwrap_or(Self::DEFAULT_MAX_TOKENS)
    }
}

/// A text-completion service: prompt in, raw text out.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Whether a credential is configured. Fallback strategy selection is
    /// driven from this flag alone.
    fn is_available(&self) -> bool;

    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String>;

    async fn list_models(&self) -> Vec<String> {
        FALLBACK_MODELS.iter().map(|m| m.to_string()).collect()
    }
}

/// Backend used when no credential is configured.
pub struct UnavailableBackend {
    reason: String,
}

impl UnavailableBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Default for UnavailableBackend {
    fn default() -> Self {
        Self::new("GROQ_API_KEY is not configured")
    }
}

#[async_trait]
impl CompletionBackend for UnavailableBackend {
    fn is_available(&self) -> bool {
        false
    }

    async fn generate(&self, _prompt: &str, _options: &GenerationOptions) -> Result<String> {
        Err(Error::ServiceUnavailable(self.reason.clone()))
    }
}
