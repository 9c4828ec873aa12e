use std::collections::HashMap;
use std::path::Path;

use crate::completion::GenerationOptions;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const SCOUT_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";
pub const MIXTRAL_MODEL: &str = "mixtral-8x7b-32768";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisMode {
    /// Entities, clauses, then summary/risks/references as separate calls.
    #[default]
    Staged,
    /// One call returning the whole analysis object.
    SinglePass,
}

impl AnalysisMode {
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "single_pass" | "single-pass" => Self::SinglePass,
            _ => Self::Staged,
        }
    }
}

/// Sampling options per call site. JSON tasks run cold, free text runs warmer.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskProfiles {
    pub analysis: GenerationOptions,
    pub entities: GenerationOptions,
    pub clauses: GenerationOptions,
    pub insights: GenerationOptions,
    pub translation: GenerationOptions,
    pub generation: GenerationOptions,
    pub regeneration: GenerationOptions,
}

impl Default for TaskProfiles {
    fn default() -> Self {
        Self {
            analysis: GenerationOptions::new(0.1, 4000).with_model(SCOUT_MODEL),
            entities: GenerationOptions::new(0.2, 1000),
            clauses: GenerationOptions::new(0.3, 2000),
            insights: GenerationOptions::new(0.2, 2000).with_model(SCOUT_MODEL),
            translation: GenerationOptions::new(0.3, 2000),
            generation: GenerationOptions::new(0.5, 4000).with_model(SCOUT_MODEL),
            regeneration: GenerationOptions::new(0.2, 4000).with_model(MIXTRAL_MODEL),
        }
    }
}

/// Full application configuration. Read from the environment first, then `.env`.
#[derive(Debug, Clone)]
pub struct Config {
    // Completion service
    pub groq_api_key: String,
    pub groq_base_url: String,
    pub default_model: String,
    pub request_timeout_s: u64,
    pub max_retries: u32,
    pub max_concurrent_requests: usize,
    pub profiles: TaskProfiles,

    // Analysis
    pub working_language: String,
    pub analysis_mode: AnalysisMode,
    /// Serve the sample analysis for unknown ids (test fixtures only).
    pub sample_fixtures: bool,

    // Web
    pub web_bind: String,
    pub web_port: u16,
    pub max_upload_bytes: usize,
    /// Include diagnostic detail (model output excerpts) in error responses.
    pub dev_diagnostics: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

pub fn parse_dotenv(path: impl AsRef<Path>) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let Ok(contents) = std::fs::read_to_string(path) else {
        return map;
    };
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            let v = v.trim().trim_matches('"');
            map.insert(k.trim().to_string(), v.to_string());
        }
    }
    map
}

struct Source<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Source<F> {
    fn get_str(&self, key: &str, default: &str) -> String {
        (self.lookup)(key).unwrap_or_else(|| default.to_string())
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        match (self.lookup)(key).as_deref() {
            Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(_) => default,
            None => default,
        }
    }

    fn get_parsed<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        (self.lookup)(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Overlay `<PREFIX>_MODEL`, `<PREFIX>_TEMPERATURE`, `<PREFIX>_MAX_TOKENS`.
    fn profile(&self, prefix: &str, base: GenerationOptions) -> GenerationOptions {
        let mut opts = base;
        if let Some(model) = (self.lookup)(&format!("{prefix}_MODEL")).filter(|m| !m.is_empty()) {
            opts.model = Some(model);
        }
        if let Some(t) = (self.lookup)(&format!("{prefix}_TEMPERATURE")).and_then(|v| v.parse().ok()) {
            opts.temperature = Some(t);
        }
        if let Some(n) = (self.lookup)(&format!("{prefix}_MAX_TOKENS")).and_then(|v| v.parse().ok()) {
            opts.max_tokens = Some(n);
        }
        opts
    }
}

impl Config {
    pub fn from_env() -> Self {
        let dotenv = parse_dotenv(".env");
        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| dotenv.get(key).cloned()))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let src = Source { lookup };
        let base = TaskProfiles::default();
        let profiles = TaskProfiles {
            analysis: src.profile("ANALYSIS", base.analysis),
            entities: src.profile("ENTITIES", base.entities),
            clauses: src.profile("CLAUSES", base.clauses),
            insights: src.profile("INSIGHTS", base.insights),
            translation: src.profile("TRANSLATION", base.translation),
            generation: src.profile("GENERATION", base.generation),
            regeneration: src.profile("REGENERATION", base.regeneration),
        };

        Config {
            groq_api_key: src.get_str("GROQ_API_KEY", "").trim().to_string(),
            groq_base_url: src.get_str("GROQ_BASE_URL", DEFAULT_BASE_URL),
            default_model: src.get_str("GROQ_DEFAULT_MODEL", SCOUT_MODEL),
            request_timeout_s: src.get_parsed("GROQ_TIMEOUT_S", 60),
            max_retries: src.get_parsed("GROQ_MAX_RETRIES", 1),
            max_concurrent_requests: src.get_parsed::<usize>("GROQ_MAX_CONCURRENT", 4).max(1),
            profiles,
            working_language: src.get_str("WORKING_LANGUAGE", "en"),
            analysis_mode: AnalysisMode::from_label(&src.get_str("ANALYSIS_MODE", "staged")),
            sample_fixtures: src.get_bool("SAMPLE_FIXTURES", false),
            web_bind: src.get_str("WEB_BIND", "127.0.0.1"),
            web_port: src.get_parsed("WEB_PORT", 3000),
            max_upload_bytes: src.get_parsed("MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
            dev_diagnostics: src.get_bool("DEV_DIAGNOSTICS", false),
        }
    }

    pub fn completion_configured(&self) -> bool {
        !self.groq_api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_without_credentials() {
        let c = Config::default();
        assert!(!c.completion_configured());
        assert_eq!(c.groq_base_url, DEFAULT_BASE_URL);
        assert_eq!(c.working_language, "en");
        assert_eq!(c.analysis_mode, AnalysisMode::Staged);
        assert!(!c.sample_fixtures);
        assert_eq!(c.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(c.profiles.generation.temperature, Some(0.5));
        assert_eq!(c.profiles.regeneration.model.as_deref(), Some(MIXTRAL_MODEL));
    }

    #[test]
    fn profile_overrides_apply_per_task() {
        let c = from_pairs(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("ENTITIES_TEMPERATURE", "0.05"),
            ("GENERATION_MODEL", "llama-3.3-70b"),
            ("ANALYSIS_MODE", "single"),
            ("GROQ_MAX_CONCURRENT", "0"),
        ]);
        assert!(c.completion_configured());
        assert_eq!(c.profiles.entities.temperature, Some(0.05));
        assert_eq!(c.profiles.entities.max_tokens, Some(1000));
        assert_eq!(c.profiles.generation.model.as_deref(), Some("llama-3.3-70b"));
        assert_eq!(c.profiles.clauses, TaskProfiles::default().clauses);
        assert_eq!(c.analysis_mode, AnalysisMode::SinglePass);
        assert_eq!(c.max_concurrent_requests, 1);
    }

    #[test]
    fn dotenv_file_is_parsed() {
        use std::io::Write;
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "# comment\nGROQ_API_KEY=\"gsk_abc\"\n\nWEB_PORT = 8080").unwrap();
        let map = parse_dotenv(tmp.path());
        assert_eq!(map.get("GROQ_API_KEY").map(String::as_str), Some("gsk_abc"));
        assert_eq!(map.get("WEB_PORT").map(String::as_str), Some("8080"));
    }

    #[test]
    fn missing_dotenv_is_empty() {
        assert!(parse_dotenv("/nonexistent/.env").is_empty());
    }
}
