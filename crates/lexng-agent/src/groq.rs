use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lexng_core::completion::{CompletionBackend, GenerationOptions, FALLBACK_MODELS};
use lexng_core::config::Config;
use lexng_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Calls Groq's OpenAI-compatible chat completions API.
///
/// One shared `reqwest::Client` per backend. Transient failures (timeouts,
/// connect errors, 429, 5xx) are retried up to `max_retries` times; the
/// semaphore bounds how many requests are in flight at once.
pub struct GroqBackend {
    client: reqwest::Client,
    api_key: String,
    pub base_url: String,
    pub default_model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    permits: Arc<Semaphore>,
}

impl GroqBackend {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::build(api_key.into(), base_url.into(), 60, 1, 4)
            .with_default_model(lexng_core::config::SCOUT_MODEL)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::build(
            config.groq_api_key.clone(),
            config.groq_base_url.clone(),
            config.request_timeout_s,
            config.max_retries,
            config.max_concurrent_requests,
        )
        .with_default_model(config.default_model.clone())
    }

    fn build(
        api_key: String,
        base_url: String,
        timeout_secs: u64,
        max_retries: u32,
        max_concurrent: usize,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!("failed to build groq http client, using defaults: {}", e);
                reqwest::Client::new()
            });
        Self {
            client,
            api_key: api_key.trim().to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            default_model: String::new(),
            timeout_secs,
            max_retries,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    async fn send_once(&self, body: &ChatRequest<'_>) -> Attempt {
        let url = format!("{}/chat/completions", self.base_url);
        let response = match self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                return Attempt::Retry(format!("request timed out after {}s", self.timeout_secs))
            },
            Err(e) if e.is_connect() => return Attempt::Retry(format!("connection failed: {e}")),
            Err(e) => return Attempt::Fail(Error::Network(format!("request failed: {e}"))),
        };

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = format!("groq returned {status}: {text}");
            if status.as_u16() == 429 || status.is_server_error() {
                return Attempt::Retry(detail);
            }
            return Attempt::Fail(Error::Network(detail));
        }

        match response.json::<ChatResponse>().await {
            Ok(parsed) => Attempt::Done(parsed.into_content()),
            Err(e) => Attempt::Fail(Error::Network(format!("failed to decode groq response: {e}"))),
        }
    }
}

enum Attempt {
    Done(String),
    Retry(String),
    Fail(Error),
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    /// First choice's content, or empty when the service returned none.
    fn into_content(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

fn fallback_models() -> Vec<String> {
    FALLBACK_MODELS.iter().map(|m| m.to_string()).collect()
}

#[async_trait]
impl CompletionBackend for GroqBackend {
    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        if !self.is_available() {
            return Err(Error::ServiceUnavailable("GROQ_API_KEY is not configured".into()));
        }

        let model = options.model.as_deref().unwrap_or(&self.default_model);
        let body = ChatRequest {
            model,
            temperature: options.temperature_or_default(),
            max_tokens: options.max_tokens_or_default(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| Error::Network("completion limiter closed".into()))?;

        info!(
            model = %model,
            temperature = body.temperature,
            max_tokens = body.max_tokens,
            prompt_len = prompt.len(),
            "calling groq chat completions"
        );

        let mut attempt = 0;
        loop {
            match self.send_once(&body).await {
                Attempt::Done(output) => {
                    info!(model = %model, output_len = output.len(), "groq response received");
                    return Ok(output);
                },
                Attempt::Retry(detail) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(model = %model, attempt, "transient groq failure, retrying: {}", detail);
                    tokio::time::sleep(Duration::from_millis(250 * u64::from(attempt))).await;
                },
                Attempt::Retry(detail) => {
                    warn!(model = %model, attempt, "groq request failed: {}", detail);
                    return Err(Error::Network(detail));
                },
                Attempt::Fail(e) => {
                    warn!(model = %model, "groq request failed: {}", e);
                    return Err(e);
                },
            }
        }
    }

    async fn list_models(&self) -> Vec<String> {
        if !self.is_available() {
            return fallback_models();
        }
        let url = format!("{}/models", self.base_url);
        let response = match self.client.get(&url).bearer_auth(&self.api_key).send().await {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                warn!(status = %r.status(), "groq model listing failed");
                return fallback_models();
            },
            Err(e) => {
                warn!("groq model listing failed: {}", e);
                return fallback_models();
            },
        };
        match response.json::<ModelList>().await {
            Ok(list) if !list.data.is_empty() => list.data.into_iter().map(|m| m.id).collect(),
            Ok(_) => fallback_models(),
            Err(e) => {
                warn!("failed to decode groq model list: {}", e);
                fallback_models()
            },
        }
    }
}
