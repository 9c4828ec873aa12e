// Integration tests for lexng_core::store shared across tasks.

use std::sync::Arc;

use chrono::Utc;
use lexng_core::store::{DocumentStore, StoreEvent};
use lexng_core::{AnalysisPatch, Clause, DocumentAnalysis, Sentiment};

fn record(id: &str) -> DocumentAnalysis {
    DocumentAnalysis {
        id: id.into(),
        document_name: "contract.txt".into(),
        language: "en".into(),
        summary: "summary".into(),
        entities: vec![],
        key_clauses: vec![Clause {
            title: "Termination".into(),
            kind: "OBLIGATION".into(),
            content: "Either party may terminate.".into(),
            sentiment: Sentiment::Neutral,
            suggestion: None,
        }],
        risk_analysis: vec![],
        nigerian_law_references: vec![],
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn concurrent_writers_last_write_wins_per_id() {
    let store = Arc::new(DocumentStore::new());
    let mut handles = Vec::new();
    for i in 0..16 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let mut r = record(&format!("doc-{}", i % 4));
            r.summary = format!("writer {i}");
            store.save(r);
        }));
    }
    for h in handles {
        h.await.unwrap();
    }
    assert_eq!(store.len(), 4);
    for r in store.list_all() {
        assert!(r.summary.starts_with("writer "));
    }
}

#[test]
fn clause_edit_round_trips_through_patch_json() {
    let store = DocumentStore::new();
    store.save(record("a"));

    // The editing UI sends the whole clause array with a blank suggestion opened.
    let body = serde_json::json!({
        "keyClauses": [{
            "title": "Termination",
            "type": "OBLIGATION",
            "content": "Either party may terminate.",
            "sentiment": "neutral",
            "suggestion": ""
        }]
    });
    let patch: AnalysisPatch = serde_json::from_value(body).unwrap();
    let updated = store.update("a", &patch).unwrap();
    assert_eq!(updated.key_clauses[0].suggestion.as_deref(), Some(""));
    assert_eq!(updated.summary, "summary");
}

#[test]
fn store_event_serializes_with_type_tag() {
    let v = serde_json::to_value(StoreEvent::Deleted { id: "x".into() }).unwrap();
    assert_eq!(v, serde_json::json!({"type": "deleted", "id": "x"}));
}
