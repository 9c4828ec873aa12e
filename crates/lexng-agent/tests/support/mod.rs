// Scripted completion backend shared by the orchestrator tests.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use lexng_core::completion::{CompletionBackend, GenerationOptions};
use lexng_core::{DocumentUpload, Result};

/// Which prompt family a call belongs to, recognised from the prompt text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    FullAnalysis,
    Entities,
    Clauses,
    Insights,
    Translation,
    Generation,
    Regeneration,
    Unknown,
}

pub fn classify(prompt: &str) -> Call {
    if prompt.contains("document analyzer API") {
        Call::FullAnalysis
    } else if prompt.contains("legal entity extraction expert") {
        Call::Entities
    } else if prompt.contains("legal clause extraction expert") {
        Call::Clauses
    } else if prompt.contains("Nigerian legal document analyzer with expertise") {
        Call::Insights
    } else if prompt.starts_with("Translate the following text") {
        Call::Translation
    } else if prompt.contains("contract and legal document drafting") {
        Call::Generation
    } else if prompt.contains("You are a legal document generator") {
        Call::Regeneration
    } else {
        Call::Unknown
    }
}

type Responder = Box<dyn Fn(Call, &str) -> Result<String> + Send + Sync>;

pub struct ScriptedBackend {
    available: bool,
    responder: Responder,
    calls: Mutex<Vec<(Call, String)>>,
}

impl ScriptedBackend {
    pub fn new(responder: impl Fn(Call, &str) -> Result<String> + Send + Sync + 'static) -> Self {
        Self {
            available: true,
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(Call, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.calls().iter().filter(|(c, _)| *c == call).count()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn generate(&self, prompt: &str, _options: &GenerationOptions) -> Result<String> {
        let call = classify(prompt);
        self.calls.lock().unwrap().push((call, prompt.to_string()));
        (self.responder)(call, prompt)
    }
}

pub const ENTITIES_JSON: &str = r#"[
  {"text": "Lagos State", "type": "LOCATION", "relevance": 0.9},
  {"text": "Adebayo Okonkwo", "type": "PERSON", "relevance": 0.8}
]"#;

pub const CLAUSES_JSON: &str = r#"```json
[
  {"title": "Termination", "type": "OBLIGATION", "content": "Either party may terminate on 7 days notice.", "sentiment": "negative"},
  {"title": "Payment", "type": "OBLIGATION", "content": "Rent is payable annually.", "sentiment": "neutral"}
]
```"#;

pub const INSIGHTS_JSON: &str = r#"{
  "summary": "A tenancy agreement for premises in Lagos.",
  "riskAnalysis": [{"title": "Short notice", "severity": "HIGH", "description": "Seven days is short."}],
  "nigerianLawReferences": [{"title": "Lagos Tenancy Law", "type": "STATUTE", "citation": "Tenancy Law of Lagos State 2011", "relevance": 0.9, "description": "Governs notice periods."}]
}"#;

/// Well-formed output for every staged extraction call.
pub fn happy(call: Call, _prompt: &str) -> Result<String> {
    Ok(match call {
        Call::Entities => ENTITIES_JSON.into(),
        Call::Clauses => CLAUSES_JSON.into(),
        Call::Insights => INSIGHTS_JSON.into(),
        Call::Translation => "translated text".into(),
        Call::Generation => "DEED OF LEASE\n\n1. Premises".into(),
        Call::Regeneration => "TENANCY AGREEMENT\n\n1. Termination".into(),
        Call::FullAnalysis | Call::Unknown => "{}".into(),
    })
}

pub fn upload(name: &str, text: &str, language: &str) -> DocumentUpload {
    DocumentUpload {
        document_name: name.into(),
        text: text.into(),
        language: language.into(),
    }
}
