use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Enumerations ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Person,
    Organization,
    Location,
    Date,
    LegalTerm,
}

impl EntityType {
    /// Lenient parse of a model-supplied label. Unknown labels become `LegalTerm`.
    pub fn from_label(s: &str) -> Self {
        match normalize_label(s).as_str() {
            "PERSON" | "PEOPLE" => Self::Person,
            "ORGANIZATION" | "ORGANISATION" | "ORG" => Self::Organization,
            "LOCATION" | "PLACE" => Self::Location,
            "DATE" | "TIME" => Self::Date,
            _ => Self::LegalTerm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Self::Positive,
            "negative" => Self::Negative,
            _ => Self::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

impl Severity {
    pub fn from_label(s: &str) -> Self {
        match normalize_label(s).as_str() {
            "LOW" => Self::Low,
            "HIGH" | "CRITICAL" => Self::High,
            _ => Self::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferenceType {
    #[default]
    Statute,
    CaseLaw,
    Regulation,
    Constitution,
}

impl ReferenceType {
    pub fn from_label(s: &str) -> Self {
        match normalize_label(s).as_str() {
            "CASE_LAW" | "CASE" | "CASELAW" => Self::CaseLaw,
            "REGULATION" => Self::Regulation,
            "CONSTITUTION" => Self::Constitution,
            _ => Self::Statute,
        }
    }
}

fn normalize_label(s: &str) -> String {
    s.trim().to_ascii_uppercase().replace([' ', '-'], "_")
}

// ── Analysis record ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: EntityType,
    /// In `[0, 1]`.
    pub relevance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    #[serde(default)]
    pub sentiment: Sentiment,
    /// `None` means "no suggestion"; `Some("")` is a blank suggestion the
    /// editor has opened but not filled in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub title: String,
    #[serde(default)]
    pub severity: Severity,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_clauses: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalReference {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ReferenceType,
    pub citation: String,
    /// In `[0, 1]`.
    pub relevance: f64,
    pub description: String,
}

/// The unit of analysis work and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAnalysis {
    pub id: String,
    pub document_name: String,
    /// Language the uploader declared for the original document.
    pub language: String,
    pub summary: String,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub key_clauses: Vec<Clause>,
    #[serde(default)]
    pub risk_analysis: Vec<Risk>,
    #[serde(default)]
    pub nigerian_law_references: Vec<LegalReference>,
    pub created_at: DateTime<Utc>,
}

/// Shallow-merge update for a stored analysis. `id` and `createdAt` are not
/// patchable; unknown fields in the JSON body are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<Entity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_clauses: Option<Vec<Clause>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_analysis: Option<Vec<Risk>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nigerian_law_references: Option<Vec<LegalReference>>,
}

impl AnalysisPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Replace every field present in the patch; leave the rest untouched.
    pub fn apply_to(&self, record: &mut DocumentAnalysis) {
        if let Some(v) = &self.document_name {
            record.document_name = v.clone();
        }
        if let Some(v) = &self.language {
            record.language = v.clone();
        }
        if let Some(v) = &self.summary {
            record.summary = v.clone();
        }
        if let Some(v) = &self.entities {
            record.entities = v.clone();
        }
        if let Some(v) = &self.key_clauses {
            record.key_clauses = v.clone();
        }
        if let Some(v) = &self.risk_analysis {
            record.risk_analysis = v.clone();
        }
        if let Some(v) = &self.nigerian_law_references {
            record.nigerian_law_references = v.clone();
        }
    }
}

// ── Inputs and transient outputs ─────────────────────────────────────────

/// An uploaded document whose text has already been obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpload {
    pub document_name: String,
    pub text: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub original_language: String,
    pub translated_language: String,
    pub original_text: String,
    pub translated_text: String,
}

impl TranslationResult {
    pub fn identity(text: &str, language: &str) -> Self {
        Self {
            original_language: language.to_string(),
            translated_language: language.to_string(),
            original_text: text.to_string(),
            translated_text: text.to_string(),
        }
    }
}

/// Translated overlay for a stored analysis, indexed like the record's arrays.
/// Never written back to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisTranslation {
    pub language: String,
    pub summary: String,
    pub clause_contents: Vec<String>,
    pub risk_descriptions: Vec<String>,
    pub reference_descriptions: Vec<String>,
}

impl AnalysisTranslation {
    pub fn untranslated(analysis: &DocumentAnalysis) -> Self {
        Self {
            language: analysis.language.clone(),
            summary: analysis.summary.clone(),
            clause_contents: analysis.key_clauses.iter().map(|c| c.content.clone()).collect(),
            risk_descriptions: analysis.risk_analysis.iter().map(|r| r.description.clone()).collect(),
            reference_descriptions: analysis
                .nigerian_law_references
                .iter()
                .map(|r| r.description.clone())
                .collect(),
        }
    }
}

/// Free-form request for a new legal document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub requirements: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parties: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedDocument {
    pub document: String,
    pub title: String,
}
