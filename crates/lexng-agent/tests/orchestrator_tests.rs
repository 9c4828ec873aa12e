// Orchestration tests for lexng_agent::LegalService against a scripted
// completion backend (no network).

mod support;

use std::sync::Arc;

use lexng_agent::analysis::FALLBACK_SUMMARY;
use lexng_agent::LegalService;
use lexng_core::completion::{CompletionBackend, UnavailableBackend};
use lexng_core::config::{AnalysisMode, Config};
use lexng_core::store::DocumentStore;
use lexng_core::{AnalysisPatch, DocumentSpec, Error, ErrorKind, Sentiment, TranslationResult};
use lexng_domains::legal;
use support::{happy, upload, Call, ScriptedBackend};
use tracing_test::traced_test;

fn service_with(config: Config, backend: Arc<dyn CompletionBackend>) -> LegalService {
    LegalService::new(&config, backend, Arc::new(DocumentStore::new()))
}

fn live(backend: &Arc<ScriptedBackend>) -> LegalService {
    service_with(Config::default(), backend.clone())
}

fn offline() -> LegalService {
    service_with(Config::default(), Arc::new(UnavailableBackend::default()))
}

// =============================================================================
// Staged analysis
// =============================================================================

#[tokio::test]
async fn test_staged_analysis_assembles_and_stores() {
    let backend = Arc::new(ScriptedBackend::new(happy));
    let svc = live(&backend);

    let id = svc
        .analyze(upload("lease.txt", "This tenancy is made in Lagos.", "en"))
        .await
        .unwrap();

    let record = svc.get_analysis(&id).unwrap();
    assert_eq!(record.language, "en");
    assert_eq!(record.summary, "A tenancy agreement for premises in Lagos.");
    assert_eq!(record.entities.len(), 2);
    assert_eq!(record.key_clauses.len(), 2);
    assert_eq!(record.risk_analysis.len(), 1);
    assert_eq!(record.nigerian_law_references.len(), 1);
    assert_eq!(backend.count(Call::Translation), 0);

    // Negative clause picks up the revision suggestion, neutral stays bare.
    let termination = &record.key_clauses[0];
    assert_eq!(termination.sentiment, Sentiment::Negative);
    assert_eq!(termination.suggestion.as_deref(), Some(legal::REVISION_SUGGESTION));
    assert!(record.key_clauses[1].suggestion.is_none());
}

#[tokio::test]
#[traced_test]
async fn test_french_upload_survives_translation_failure() {
    let backend = Arc::new(ScriptedBackend::new(|call, prompt| match call {
        Call::Translation => Err(Error::Network("connection reset".into())),
        _ => happy(call, prompt),
    }));
    let svc = live(&backend);
    let text = "Le présent contrat de bail est conclu à Lagos.";

    let id = svc.analyze(upload("bail.txt", text, "fr")).await.unwrap();

    let record = svc.get_analysis(&id).unwrap();
    assert_eq!(record.language, "fr");
    assert_eq!(record.entities.len(), 2);
    assert_ne!(record.summary, FALLBACK_SUMMARY);
    assert_eq!(backend.count(Call::Translation), 1);

    // Extraction ran on the original French text.
    let calls = backend.calls();
    let (_, entity_prompt) = calls.iter().find(|(c, _)| *c == Call::Entities).unwrap();
    assert!(entity_prompt.contains(text));
    assert!(logs_contain("translation failed"));
}

#[tokio::test]
async fn test_translated_text_feeds_extraction() {
    let backend = Arc::new(ScriptedBackend::new(|call, prompt| match call {
        Call::Translation => Ok("The lease is made in Lagos.".into()),
        _ => happy(call, prompt),
    }));
    let svc = live(&backend);

    svc.analyze(upload("bail.txt", "Le bail est conclu à Lagos.", "fr"))
        .await
        .unwrap();

    let calls = backend.calls();
    let (_, clause_prompt) = calls.iter().find(|(c, _)| *c == Call::Clauses).unwrap();
    assert!(clause_prompt.contains("The lease is made in Lagos."));
}

#[tokio::test]
async fn test_malformed_insights_degrade_summary() {
    let backend = Arc::new(ScriptedBackend::new(|call, prompt| match call {
        Call::Insights => Ok("not json".into()),
        _ => happy(call, prompt),
    }));
    let svc = live(&backend);

    let id = svc.analyze(upload("a.txt", "text", "en")).await.unwrap();

    let record = svc.get_analysis(&id).unwrap();
    assert!(!record.id.is_empty());
    assert_eq!(record.summary, "not json");
    assert!(record.risk_analysis.is_empty());
    assert!(record.nigerian_law_references.is_empty());
    assert_eq!(record.entities.len(), 2);
}

#[tokio::test]
async fn test_bad_entity_output_degrades_to_empty_list() {
    let backend = Arc::new(ScriptedBackend::new(|call, prompt| match call {
        Call::Entities => Ok("Here are the entities you asked for".into()),
        Call::Clauses => Err(Error::Network("timeout".into())),
        _ => happy(call, prompt),
    }));
    let svc = live(&backend);

    let id = svc.analyze(upload("a.txt", "text", "en")).await.unwrap();

    let record = svc.get_analysis(&id).unwrap();
    assert!(record.entities.is_empty());
    assert!(record.key_clauses.is_empty());
    assert_eq!(record.risk_analysis.len(), 1);
}

#[tokio::test]
async fn test_fatal_step_stores_fallback_record() {
    let backend = Arc::new(ScriptedBackend::new(|call, prompt| match call {
        Call::Insights => Err(Error::Network("502 bad gateway".into())),
        _ => happy(call, prompt),
    }));
    let svc = live(&backend);

    let id = svc.analyze(upload("a.txt", "text", "yo")).await.unwrap();

    let record = svc.get_analysis(&id).unwrap();
    assert_eq!(record.summary, FALLBACK_SUMMARY);
    assert_eq!(record.language, "yo");
    assert!(record.entities.is_empty());
    assert!(record.key_clauses.is_empty());
    assert!(record.risk_analysis.is_empty());
    assert!(record.nigerian_law_references.is_empty());
}

#[tokio::test]
async fn test_empty_upload_is_rejected() {
    let backend = Arc::new(ScriptedBackend::new(happy));
    let svc = live(&backend);

    let err = svc.analyze(upload("empty.txt", "  \n ", "en")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
    assert!(svc.list_analyses().is_empty());
    assert!(backend.calls().is_empty());
}

// =============================================================================
// Single-pass analysis
// =============================================================================

fn single_pass() -> Config {
    Config {
        analysis_mode: AnalysisMode::SinglePass,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_single_pass_uses_one_call() {
    let backend = Arc::new(ScriptedBackend::new(|call, _| {
        assert_eq!(call, Call::FullAnalysis);
        Ok(r#"{"summary": "S", "entities": [], "keyClauses": [], "riskAnalysis": [], "nigerianLawReferences": []}"#.into())
    }));
    let svc = service_with(single_pass(), backend.clone());

    let id = svc.analyze(upload("a.txt", "text", "en")).await.unwrap();

    assert_eq!(svc.get_analysis(&id).unwrap().summary, "S");
    assert_eq!(backend.calls().len(), 1);
}

#[tokio::test]
async fn test_single_pass_missing_field_falls_back() {
    let backend = Arc::new(ScriptedBackend::new(|_, _| {
        Ok(r#"{"summary": "S", "entities": []}"#.into())
    }));
    let svc = service_with(single_pass(), backend.clone());

    let id = svc.analyze(upload("a.txt", "text", "en")).await.unwrap();

    assert_eq!(svc.get_analysis(&id).unwrap().summary, FALLBACK_SUMMARY);
}

// =============================================================================
// Offline mode
// =============================================================================

#[tokio::test]
async fn test_offline_analysis_uses_demo_fixtures() {
    let svc = offline();
    assert!(!svc.is_live());

    let id = svc
        .analyze(upload("cama.pdf", legal::SAMPLE_DOCUMENT_TEXT, "en"))
        .await
        .unwrap();

    let record = svc.get_analysis(&id).unwrap();
    assert_eq!(record.summary, legal::DEMO_SUMMARY);
    assert_eq!(record.entities, legal::demo_entities());
    assert_eq!(record.key_clauses, legal::demo_clauses());
    assert_eq!(record.risk_analysis, legal::demo_risks());
    assert_eq!(record.nigerian_law_references, legal::demo_references());
}

#[tokio::test]
async fn test_offline_translation_is_annotated() {
    let svc = offline();
    let r = svc.translate("Sannu", "ha", "en").await.unwrap();
    assert!(r.translated_text.contains("Configure Groq API"));
    assert!(r.translated_text.ends_with("Sannu"));
}

// =============================================================================
// Record access
// =============================================================================

#[tokio::test]
async fn test_update_merges_fields() {
    let svc = offline();
    let id = svc.analyze(upload("a.txt", "text", "en")).await.unwrap();
    let before = svc.get_analysis(&id).unwrap();

    let patch = AnalysisPatch {
        summary: Some("X".into()),
        ..Default::default()
    };
    svc.update_analysis(&id, &patch).unwrap();

    let after = svc.get_analysis(&id).unwrap();
    assert_eq!(after.summary, "X");
    assert_eq!(after.entities, before.entities);
    assert_eq!(after.key_clauses, before.key_clauses);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(after.document_name, before.document_name);
}

#[test]
fn test_missing_record_is_absent() {
    let svc = offline();
    assert!(svc.get_analysis("nonexistent-id").is_none());
    assert!(svc.update_analysis("nonexistent-id", &AnalysisPatch::default()).is_none());
    assert!(!svc.delete_analysis("nonexistent-id"));
}

#[test]
fn test_sample_fixture_flag_serves_unstored_sample() {
    let config = Config {
        sample_fixtures: true,
        ..Config::default()
    };
    let svc = service_with(config, Arc::new(UnavailableBackend::default()));

    let sample = svc.get_analysis("demo-123").unwrap();
    assert_eq!(sample.id, "demo-123");
    assert_eq!(sample.key_clauses.len(), 3);
    assert!(svc.store().is_empty());
}

// =============================================================================
// Translation
// =============================================================================

#[tokio::test]
async fn test_same_language_translation_is_identity_without_calls() {
    let backend = Arc::new(ScriptedBackend::new(happy));
    let svc = live(&backend);

    for lang in ["en", "fr", "yo", ""] {
        let r = svc.translate("Section 19 applies.", lang, lang).await.unwrap();
        assert_eq!(r, TranslationResult::identity("Section 19 applies.", lang));
    }
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_translate_analysis_overlays_without_mutating() {
    let backend = Arc::new(ScriptedBackend::new(|call, prompt| match call {
        Call::Translation => Ok(format!("FR:{}", prompt.len())),
        _ => happy(call, prompt),
    }));
    let svc = live(&backend);
    let id = svc.analyze(upload("a.txt", "text", "en")).await.unwrap();
    let before = svc.get_analysis(&id).unwrap();

    let overlay = svc.translate_analysis(&id, "fr").await.unwrap();

    assert_eq!(overlay.language, "fr");
    assert!(overlay.summary.starts_with("FR:"));
    assert_eq!(overlay.clause_contents.len(), before.key_clauses.len());
    assert_eq!(overlay.risk_descriptions.len(), before.risk_analysis.len());
    assert_eq!(overlay.reference_descriptions.len(), before.nigerian_law_references.len());
    assert_eq!(svc.get_analysis(&id).unwrap(), before);
}

#[tokio::test]
async fn test_translate_analysis_fails_whole_pass_on_one_error() {
    let backend = Arc::new(ScriptedBackend::new(|call, prompt| match call {
        Call::Translation if prompt.contains("Seven days is short.") => {
            Err(Error::Network("reset".into()))
        },
        Call::Translation => Ok("ok".into()),
        _ => happy(call, prompt),
    }));
    let svc = live(&backend);
    let id = svc.analyze(upload("a.txt", "text", "en")).await.unwrap();

    let err = svc.translate_analysis(&id, "fr").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransientNetworkError);
}

#[tokio::test]
async fn test_translate_analysis_same_language_and_missing_id() {
    let svc = offline();
    let id = svc.analyze(upload("a.txt", "text", "en")).await.unwrap();
    let record = svc.get_analysis(&id).unwrap();

    let overlay = svc.translate_analysis(&id, "en").await.unwrap();
    assert_eq!(overlay.summary, record.summary);

    let err = svc.translate_analysis("missing", "fr").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// =============================================================================
// Generation
// =============================================================================

fn spec(kind: &str) -> DocumentSpec {
    DocumentSpec {
        kind: kind.into(),
        requirements: "Two-year lease of a warehouse in Apapa".into(),
        parties: None,
        title: None,
    }
}

#[tokio::test]
async fn test_free_document_non_empty_in_both_modes() {
    let backend = Arc::new(ScriptedBackend::new(happy));
    let services = [live(&backend), offline()];

    for svc in &services {
        for kind in ["contract", "agreement", "mou", "letter", "clause", "lease"] {
            let out = svc.generate_free_document(&spec(kind)).await.unwrap();
            assert!(!out.document.trim().is_empty(), "{kind}");
            assert!(!out.title.trim().is_empty(), "{kind}");
        }
    }
}

#[tokio::test]
async fn test_live_title_is_first_output_line() {
    let backend = Arc::new(ScriptedBackend::new(happy));
    let svc = live(&backend);
    let out = svc.generate_free_document(&spec("lease")).await.unwrap();
    assert_eq!(out.title, "DEED OF LEASE");
}

#[tokio::test]
async fn test_blank_live_output_is_malformed() {
    let backend = Arc::new(ScriptedBackend::new(|_, _| Ok("   ".into())));
    let svc = live(&backend);
    let err = svc.generate_free_document(&spec("lease")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedModelOutput);
}

#[tokio::test]
async fn test_free_document_requires_inputs() {
    let svc = offline();
    let mut s = spec("mou");
    s.requirements = " ".into();
    let err = svc.generate_free_document(&s).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
}

#[tokio::test]
async fn test_generate_from_missing_analysis_is_not_found() {
    let backend = Arc::new(ScriptedBackend::new(happy));
    let svc = live(&backend);

    let err = svc.generate_from_analysis("abc", None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(svc.get_analysis("abc").is_none());
    assert!(svc.store().is_empty());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_generate_from_inline_record_stores_it() {
    let svc = offline();
    let mut inline = legal::sample_analysis("other", chrono::Utc::now());
    inline.document_name = "tenancy.docx".into();

    let out = svc.generate_from_analysis("abc", Some(inline)).await.unwrap();

    assert_eq!(out.analysis_id, "abc");
    assert_eq!(out.document_name, "tenancy.docx");
    assert!(out.document.starts_with("DOCUMENT: tenancy.docx"));
    assert!(out.document.contains("[IMPROVED:"));
    assert_eq!(svc.get_analysis("abc").unwrap().document_name, "tenancy.docx");
}

#[tokio::test]
async fn test_live_regeneration_uses_stored_record() {
    let backend = Arc::new(ScriptedBackend::new(happy));
    let svc = live(&backend);
    let id = svc.analyze(upload("lease.txt", "text", "en")).await.unwrap();

    let out = svc.generate_from_analysis(&id, None).await.unwrap();

    assert_eq!(out.document_name, "lease.txt");
    assert!(out.document.starts_with("TENANCY AGREEMENT"));
    let calls = backend.calls();
    let (_, prompt) = calls.iter().find(|(c, _)| *c == Call::Regeneration).unwrap();
    assert!(prompt.contains(legal::REVISION_SUGGESTION));
}

#[tokio::test]
async fn test_offline_models_fall_back() {
    let models = offline().list_models().await;
    assert!(models.iter().any(|m| m == "mixtral-8x7b-32768"));
}
