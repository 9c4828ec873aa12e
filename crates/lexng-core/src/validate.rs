//! Turn raw completion text into typed records.
//!
//! Strict at the top level: unparseable JSON or a missing/wrong-shaped
//! required field is `MalformedModelOutput`. Lenient below that: bad array
//! elements are dropped and missing optional sub-fields get defaults.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::text::truncate_chars;
use crate::types::{
    Clause, Entity, EntityType, LegalReference, ReferenceType, Risk, Sentiment, Severity,
};

pub const DEFAULT_RELEVANCE: f64 = 0.5;
pub const MISSING_DESCRIPTION: &str = "No description provided.";
pub const MISSING_CITATION: &str = "Citation not provided.";
pub const MISSING_SUMMARY: &str = "Summary not available.";
pub const DEFAULT_CLAUSE_TYPE: &str = "GENERAL";

/// Full analysis object as returned by the single-pass prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPayload {
    pub summary: String,
    pub entities: Vec<Entity>,
    pub key_clauses: Vec<Clause>,
    pub risk_analysis: Vec<Risk>,
    pub nigerian_law_references: Vec<LegalReference>,
}

/// Summary, risks and references produced together by one call.
#[derive(Debug, Clone, PartialEq)]
pub struct Insights {
    pub summary: String,
    pub risk_analysis: Vec<Risk>,
    pub nigerian_law_references: Vec<LegalReference>,
}

/// Strip whitespace and a surrounding Markdown code fence, if any.
pub fn strip_code_fence(text: &str) -> &str {
    let t = text.trim();
    let Some(rest) = t.strip_prefix("```") else {
        return t;
    };
    // Drop the info string (e.g. "json") on the opening line.
    let body = match rest.find('\n') {
        Some(nl) => &rest[nl + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

pub fn parse_json(raw: &str) -> Result<Value> {
    let cleaned = strip_code_fence(raw);
    serde_json::from_str(cleaned)
        .map_err(|e| Error::malformed(format!("response is not valid JSON: {e}"), cleaned))
}

/// Validate the single-pass analysis object.
pub fn parse_full_analysis(raw: &str) -> Result<AnalysisPayload> {
    let value = parse_json(raw)?;
    let cleaned = strip_code_fence(raw);
    let obj = value
        .as_object()
        .ok_or_else(|| Error::malformed("expected a JSON object", cleaned))?;

    let summary = required_summary(obj, cleaned)?;
    let entities = required_array(obj, "entities", cleaned)?;
    let key_clauses = required_array(obj, "keyClauses", cleaned)?;
    let risks = required_array(obj, "riskAnalysis", cleaned)?;
    let references = required_array(obj, "nigerianLawReferences", cleaned)?;

    Ok(AnalysisPayload {
        summary,
        entities: entities.iter().filter_map(entity_from_value).collect(),
        key_clauses: key_clauses.iter().filter_map(clause_from_value).collect(),
        risk_analysis: risks.iter().filter_map(risk_from_value).collect(),
        nigerian_law_references: references.iter().filter_map(reference_from_value).collect(),
    })
}

/// Validate an entity list. Accepts a bare array or `{"entities": [...]}`.
pub fn parse_entities(raw: &str) -> Result<Vec<Entity>> {
    let value = parse_json(raw)?;
    let items = top_level_array(&value, &["entities"], raw)?;
    Ok(items.iter().filter_map(entity_from_value).collect())
}

/// Validate a clause list. Accepts a bare array or `{"keyClauses"|"clauses": [...]}`.
pub fn parse_clauses(raw: &str) -> Result<Vec<Clause>> {
    let value = parse_json(raw)?;
    let items = top_level_array(&value, &["keyClauses", "clauses"], raw)?;
    Ok(items.iter().filter_map(clause_from_value).collect())
}

/// Validate the joint summary/risk/reference object. Only `summary` is
/// required; absent arrays default to empty.
pub fn parse_insights(raw: &str) -> Result<Insights> {
    let value = parse_json(raw)?;
    let cleaned = strip_code_fence(raw);
    let obj = value
        .as_object()
        .ok_or_else(|| Error::malformed("expected a JSON object", cleaned))?;
    let summary = required_summary(obj, cleaned)?;
    Ok(Insights {
        summary,
        risk_analysis: optional_array(obj, "riskAnalysis")
            .iter()
            .filter_map(risk_from_value)
            .collect(),
        nigerian_law_references: optional_array(obj, "nigerianLawReferences")
            .iter()
            .filter_map(reference_from_value)
            .collect(),
    })
}

/// Degraded summary for output that could not be parsed: the first three
/// non-blank lines, joined and cut to 200 characters.
pub fn heuristic_summary(raw: &str) -> String {
    let joined = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("```"))
        .take(3)
        .collect::<Vec<_>>()
        .join(" ");
    let cut = truncate_chars(&joined, 200).trim();
    if cut.is_empty() {
        MISSING_SUMMARY.to_string()
    } else {
        cut.to_string()
    }
}

// ── Top-level shape checks ───────────────────────────────────────────────

fn required_summary(obj: &Map<String, Value>, raw: &str) -> Result<String> {
    let summary = match obj.get("summary") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    if summary.is_empty() {
        return Err(Error::malformed("missing or empty `summary`", raw));
    }
    Ok(summary)
}

fn required_array<'a>(obj: &'a Map<String, Value>, key: &str, raw: &str) -> Result<&'a Vec<Value>> {
    obj.get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::malformed(format!("missing or non-array `{key}`"), raw))
}

fn optional_array<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    match obj.get(key) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            debug!(field = key, found = %type_name(other), "ignoring non-array field");
            &[]
        }
        None => &[],
    }
}

fn top_level_array<'a>(value: &'a Value, keys: &[&str], raw: &str) -> Result<&'a Vec<Value>> {
    if let Some(items) = value.as_array() {
        return Ok(items);
    }
    if let Some(obj) = value.as_object() {
        for key in keys {
            if let Some(items) = obj.get(*key).and_then(Value::as_array) {
                return Ok(items);
            }
        }
    }
    Err(Error::malformed(
        "expected a JSON array",
        strip_code_fence(raw),
    ))
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Element conversion ───────────────────────────────────────────────────

fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn relevance_field(obj: &Map<String, Value>) -> f64 {
    let v = match obj.get("relevance") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    match v {
        Some(r) if r.is_finite() => r.clamp(0.0, 1.0),
        _ => DEFAULT_RELEVANCE,
    }
}

pub fn entity_from_value(v: &Value) -> Option<Entity> {
    let obj = v.as_object()?;
    Some(Entity {
        text: str_field(obj, "text")?,
        kind: str_field(obj, "type")
            .map(|t| EntityType::from_label(&t))
            .unwrap_or(EntityType::LegalTerm),
        relevance: relevance_field(obj),
    })
}

pub fn clause_from_value(v: &Value) -> Option<Clause> {
    let obj = v.as_object()?;
    let title = str_field(obj, "title");
    let content = str_field(obj, "content");
    if title.is_none() && content.is_none() {
        return None;
    }
    // Keep presence: `null`/absent means no suggestion, a string (even blank) is kept.
    let suggestion = match obj.get("suggestion") {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    };
    Some(Clause {
        title: title.clone().unwrap_or_else(|| "Untitled clause".to_string()),
        kind: str_field(obj, "type").unwrap_or_else(|| DEFAULT_CLAUSE_TYPE.to_string()),
        content: content.or(title).unwrap_or_default(),
        sentiment: str_field(obj, "sentiment")
            .map(|s| Sentiment::from_label(&s))
            .unwrap_or_default(),
        suggestion,
    })
}

pub fn risk_from_value(v: &Value) -> Option<Risk> {
    let obj = v.as_object()?;
    let related = obj.get("relatedClauses").and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(|i| i.as_str().map(str::trim).filter(|s| !s.is_empty()))
            .map(str::to_string)
            .collect::<Vec<_>>()
    });
    Some(Risk {
        title: str_field(obj, "title")?,
        severity: str_field(obj, "severity")
            .map(|s| Severity::from_label(&s))
            .unwrap_or_default(),
        description: str_field(obj, "description").unwrap_or_else(|| MISSING_DESCRIPTION.to_string()),
        recommendation: str_field(obj, "recommendation"),
        related_clauses: related,
    })
}

pub fn reference_from_value(v: &Value) -> Option<LegalReference> {
    let obj = v.as_object()?;
    Some(LegalReference {
        title: str_field(obj, "title")?,
        kind: str_field(obj, "type")
            .map(|t| ReferenceType::from_label(&t))
            .unwrap_or_default(),
        citation: str_field(obj, "citation").unwrap_or_else(|| MISSING_CITATION.to_string()),
        relevance: relevance_field(obj),
        description: str_field(obj, "description").unwrap_or_else(|| MISSING_DESCRIPTION.to_string()),
    })
}
