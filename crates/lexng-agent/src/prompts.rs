//! Prompt construction for every completion call site. Pure string building.

use lexng_core::text::truncate_chars;
use lexng_core::{DocumentAnalysis, DocumentSpec};
use serde_json::json;

/// Characters of document text embedded in the single-pass analysis prompt.
pub const FULL_ANALYSIS_CHARS: usize = 5000;
/// Characters embedded in entity, clause and insight prompts.
pub const EXTRACTION_CHARS: usize = 3000;
pub const MAX_CLAUSES: usize = 5;

/// Single-pass prompt returning the whole analysis object.
pub fn full_analysis_prompt(text: &str) -> String {
    format!(
        r#"[SYSTEM: You MUST respond with ONLY valid JSON. Do not include any natural language text before or after the JSON. The response must be parseable as JSON.]

You are a Nigerian legal document analyzer API that MUST return ONLY valid JSON.

Analyze this legal document and return a JSON object with exactly this structure:
{{
  "summary": "string (max 300 words)",
  "entities": [
    {{"text": "string", "type": "PERSON|ORGANIZATION|LOCATION|DATE|LEGAL_TERM", "relevance": 0.0}}
  ],
  "keyClauses": [
    {{"title": "string", "type": "string", "content": "string", "sentiment": "positive|neutral|negative"}}
  ],
  "riskAnalysis": [
    {{"title": "string", "severity": "HIGH|MEDIUM|LOW", "description": "string", "recommendation": "string"}}
  ],
  "nigerianLawReferences": [
    {{"title": "string", "type": "STATUTE|CASE_LAW|REGULATION|CONSTITUTION", "citation": "string", "relevance": 0.0, "description": "string"}}
  ]
}}

Relevance values are numbers between 0 and 1.

Document content:
{document}

[SYSTEM: Remember to respond with ONLY the JSON object. No other text.]"#,
        document = truncate_chars(text, FULL_ANALYSIS_CHARS),
    )
}

pub fn entity_prompt(text: &str) -> String {
    format!(
        r#"You are a legal entity extraction expert. Extract named entities from the following legal text.
Focus on organizations, people, locations, dates, and legal terms.

For each entity, provide:
1. The exact text of the entity
2. The type (ORGANIZATION, PERSON, LOCATION, DATE, LEGAL_TERM)
3. A relevance score between 0 and 1

Respond with ONLY a JSON array, no other text:
[
  {{"text": "entity text", "type": "ENTITY_TYPE", "relevance": 0.95}}
]

Text:
{text}"#,
        text = truncate_chars(text, EXTRACTION_CHARS),
    )
}

pub fn clause_prompt(text: &str) -> String {
    format!(
        r#"You are a legal clause extraction expert. Extract key clauses from the following legal text.
For each clause, provide:
1. A concise title
2. The type of clause (e.g., RIGHTS, RESTRICTION, ADMINISTRATIVE, OBLIGATION)
3. The exact content of the clause
4. The sentiment (positive, neutral, negative)

Respond with ONLY a JSON array, no other text:
[
  {{"title": "clause title", "type": "clause type", "content": "clause content", "sentiment": "sentiment"}}
]

Extract up to {MAX_CLAUSES} key clauses.

Text:
{text}"#,
        text = truncate_chars(text, EXTRACTION_CHARS),
    )
}

/// Summary, risk analysis and law references requested together.
pub fn insights_prompt(text: &str) -> String {
    format!(
        r#"You are a Nigerian legal document analyzer with expertise in Nigerian law. Analyze the following legal document and provide:

1. A detailed, concrete summary (max 300 words) that captures the key legal implications
2. Specific risk analysis with severity levels, including exact references to problematic clauses
3. Precise Nigerian law references (statutes, case law, regulations, constitution) with section numbers and years

Focus specifically on Nigerian legal context, including:
- Nigerian Companies and Allied Matters Act (CAMA) with specific sections
- Nigerian Constitution articles and sections
- Nigerian case law precedents with citation details
- Nigerian regulatory frameworks with specific regulations

Your analysis must be concrete, specific, and actionable, not general or vague.

Respond with ONLY JSON with the following structure:
{{
  "summary": "...",
  "riskAnalysis": [{{"title": "...", "severity": "HIGH/MEDIUM/LOW", "description": "...", "recommendation": "...", "relatedClauses": ["..."]}}],
  "nigerianLawReferences": [{{"title": "...", "type": "STATUTE/CASE_LAW/REGULATION/CONSTITUTION", "citation": "...", "relevance": 0.9, "description": "..."}}]
}}

Document:
{document}"#,
        document = truncate_chars(text, EXTRACTION_CHARS),
    )
}

/// Plain-text translation prompt. `None` when no translation is needed, so
/// callers can return the input without calling the service.
pub fn translation_prompt(text: &str, from: &str, to: &str) -> Option<String> {
    if same_language(from, to) {
        return None;
    }
    Some(format!(
        "Translate the following text from {from} to {to}.\n\
         Maintain all legal terminology and formatting.\n\
         Respond with the translated text only.\n\n\
         Text to translate:\n{text}\n\n\
         Translated text:"
    ))
}

pub fn same_language(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Drafting prompt for a new document from a free specification.
pub fn generation_prompt(spec: &DocumentSpec) -> String {
    let mut s = String::from(
        "You are a Nigerian legal expert specializing in contract and legal document drafting.\n\n\
         Create a detailed, concrete legal document in Nigerian legal context with the following specifications:\n\n",
    );
    s.push_str(&format!("TYPE OF DOCUMENT: {}\n", spec.kind.trim()));
    if let Some(title) = spec.title.as_deref().filter(|t| !t.trim().is_empty()) {
        s.push_str(&format!("SUGGESTED TITLE: {}\n", title.trim()));
    }
    if let Some(parties) = spec.parties.as_deref().filter(|p| !p.trim().is_empty()) {
        s.push_str(&format!("PARTIES INVOLVED:\n{}\n", parties.trim()));
    }
    s.push_str(&format!("\nREQUIREMENTS/SPECIFICATIONS:\n{}\n\n", spec.requirements.trim()));
    s.push_str(GENERATION_CHECKLIST);
    s
}

const GENERATION_CHECKLIST: &str = "\
Please generate a complete, properly formatted legal document that:
1. Is fully compliant with Nigerian law with specific references to relevant statutes and sections
2. Includes all necessary sections and clauses for this type of document with proper numbering
3. References relevant Nigerian legislation with specific section numbers and case law where appropriate
4. Uses proper legal language and formatting with defined terms
5. Is professional and ready for review by legal counsel

The document MUST include:
- Proper document title and reference number
- Date and place of execution with specific format
- Proper identification of all parties with full legal names and addresses
- Recitals/background section with specific facts and circumstances
- All relevant clauses based on the requirements with proper numbering (1.1, 1.2, etc.)
- Specific remedies for breach with exact procedures
- Governing law and jurisdiction clause with specific reference to Nigerian courts
- Signature blocks for all parties with witness provisions
- Any schedules or appendices as needed with proper formatting

If any information is missing or unclear, make reasonable assumptions that would be standard in Nigerian legal practice, but make them specific and concrete.

Assume the document will be governed by Nigerian law and jurisdiction.
Start the document with its title on the first line.
Respond with the plain-text document only, no markdown or commentary.
";

/// Regeneration prompt for a stored analysis. Suggestions on clauses are
/// accepted edits and must be applied.
pub fn regeneration_prompt(analysis: &DocumentAnalysis) -> String {
    let payload = json!({
        "summary": analysis.summary,
        "keyClauses": analysis.key_clauses,
    });
    format!(
        "You are a legal document generator. Generate a clean, well-formatted legal document based on the following analysis.\n\
         The document should incorporate all the key clauses, with any suggested improvements applied.\n\n\
         Document Name: {name}\n\
         Language: {language}\n\n\
         Analysis: {payload}\n\n\
         Generate a complete, professional legal document in plain text format that would be suitable for conversion to PDF.\n\
         Use proper legal formatting, numbering, and structure.\n\
         Respond with the plain-text document only, no markdown or commentary.",
        name = analysis.document_name,
        language = analysis.language,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lexng_core::{Clause, Sentiment};

    #[test]
    fn analysis_prompt_truncates_document() {
        let text = "a".repeat(FULL_ANALYSIS_CHARS + 50);
        let p = full_analysis_prompt(&text);
        assert!(p.contains(&"a".repeat(FULL_ANALYSIS_CHARS)));
        assert!(!p.contains(&"a".repeat(FULL_ANALYSIS_CHARS + 1)));
        assert!(p.contains("\"nigerianLawReferences\""));
        assert!(p.contains("ONLY valid JSON"));
    }

    #[test]
    fn extraction_prompts_use_shorter_window() {
        let text = "b".repeat(EXTRACTION_CHARS + 10);
        for p in [entity_prompt(&text), clause_prompt(&text), insights_prompt(&text)] {
            assert!(!p.contains(&"b".repeat(EXTRACTION_CHARS + 1)));
        }
        assert!(clause_prompt("x").contains("up to 5 key clauses"));
        assert!(entity_prompt("x").contains("LEGAL_TERM"));
    }

    #[test]
    fn translation_prompt_skips_same_language() {
        assert!(translation_prompt("hello", "en", "EN").is_none());
        let p = translation_prompt("bonjour", "fr", "en").unwrap();
        assert!(p.contains("from fr to en"));
        assert!(p.contains("bonjour"));
    }

    #[test]
    fn generation_prompt_omits_empty_optionals() {
        let spec = DocumentSpec {
            kind: "lease".into(),
            requirements: "two-year lease in Ikeja".into(),
            parties: None,
            title: Some("  ".into()),
        };
        let p = generation_prompt(&spec);
        assert!(p.contains("TYPE OF DOCUMENT: lease"));
        assert!(!p.contains("SUGGESTED TITLE"));
        assert!(!p.contains("PARTIES INVOLVED"));
        assert!(p.contains("Signature blocks"));
        assert!(p.trim_end().ends_with("Respond with the plain-text document only, no markdown or commentary."));
    }

    #[test]
    fn regeneration_prompt_carries_suggestions() {
        let analysis = DocumentAnalysis {
            id: "x".into(),
            document_name: "nda.txt".into(),
            language: "en".into(),
            summary: "An NDA.".into(),
            entities: vec![],
            key_clauses: vec![Clause {
                title: "Term".into(),
                kind: "OBLIGATION".into(),
                content: "Two years.".into(),
                sentiment: Sentiment::Negative,
                suggestion: Some("Reduce to one year.".into()),
            }],
            risk_analysis: vec![],
            nigerian_law_references: vec![],
            created_at: Utc::now(),
        };
        let p = regeneration_prompt(&analysis);
        assert!(p.contains("Document Name: nda.txt"));
        assert!(p.contains("Reduce to one year."));
        assert!(p.contains("\"keyClauses\""));
        assert!(p.ends_with("Respond with the plain-text document only, no markdown or commentary."));
    }
}
