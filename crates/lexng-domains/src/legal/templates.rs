//! Deterministic document skeletons used when documents cannot be drafted by
//! the completion service.

use chrono::NaiveDate;
use lexng_core::text::{capitalize, truncate_chars};
use lexng_core::{DocumentAnalysis, DocumentSpec, GeneratedDocument};

pub const PLACEHOLDER_PARTY_A: &str = "COMPANY A";
pub const PLACEHOLDER_PARTY_B: &str = "COMPANY B";

const ARBITRATION_ACT: &str =
    "the Arbitration and Conciliation Act, Cap A18, Laws of the Federation of Nigeria, 2004";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Agreement,
    Mou,
    Letter,
    Clause,
    Other,
}

impl DocumentKind {
    /// Case-insensitive match on the requested document type.
    pub fn from_type(kind: &str) -> Self {
        match kind.trim().to_lowercase().as_str() {
            "contract" | "agreement" => Self::Agreement,
            "mou" => Self::Mou,
            "letter" => Self::Letter,
            "clause" => Self::Clause,
            _ => Self::Other,
        }
    }
}

/// Long-form date as used on Nigerian instruments, e.g. "5 March 2025".
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

/// Party names from the first two lines of a free-text parties field, each
/// taken as the first non-empty comma-separated segment. Missing names
/// become placeholders.
pub fn parse_parties(parties: Option<&str>) -> (String, String) {
    let mut names = parties.unwrap_or_default().lines().take(2).map(|line| {
        line.split(',')
            .map(str::trim)
            .find(|segment| !segment.is_empty())
            .unwrap_or_default()
            .to_string()
    });
    let pick = |name: Option<String>, fallback: &str| {
        name.filter(|n| !n.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    };
    let a = pick(names.next(), PLACEHOLDER_PARTY_A);
    let b = pick(names.next(), PLACEHOLDER_PARTY_B);
    (a, b)
}

fn excerpt(requirements: &str, chars: usize) -> String {
    format!("{}...", truncate_chars(requirements.trim(), chars))
}

fn signature_block(party: &str) -> String {
    format!(
        "SIGNED for and on behalf of {party}:\n\n\
         ________________________\n\
         Name:\n\
         Position:\n\
         Date:\n"
    )
}

/// Render the offline document for a free-form specification.
pub fn render_template(spec: &DocumentSpec, date: NaiveDate) -> GeneratedDocument {
    let title = spec
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} Agreement", capitalize(spec.kind.trim())));
    let date = format_date(date);
    let (party_a, party_b) = parse_parties(spec.parties.as_deref());
    let req = &spec.requirements;

    let document = match DocumentKind::from_type(&spec.kind) {
        DocumentKind::Agreement => format!(
            r#"{heading}

THIS AGREEMENT is made this {date}

BETWEEN:

{party_a} (hereinafter referred to as "the First Party")

AND

{party_b} (hereinafter referred to as "the Second Party")

WHEREAS:

1. The parties wish to enter into an agreement regarding {purpose}
2. Both parties have agreed to the terms set forth in this document.

NOW THEREFORE, in consideration of the mutual covenants contained herein, the parties agree as follows:

1. INTERPRETATION
   1.1 In this Agreement, unless the context otherwise requires:
       "Agreement" means this agreement including any schedules attached hereto;
       "Effective Date" means the date first written above;
       "Nigerian Law" means the laws of the Federal Republic of Nigeria.

2. SCOPE OF AGREEMENT
   2.1 The parties agree to {scope}
   2.2 This agreement shall be governed by Nigerian law, particularly the Contract Law of Nigeria.

3. TERM AND TERMINATION
   3.1 This Agreement shall commence on the Effective Date and shall continue until terminated in accordance with the provisions contained herein.
   3.2 Either party may terminate this Agreement by giving thirty (30) days written notice to the other party.

4. GOVERNING LAW
   4.1 This Agreement shall be governed by and construed in accordance with the laws of the Federal Republic of Nigeria.
   4.2 Any dispute arising out of or in connection with this Agreement shall be referred to arbitration under {ARBITRATION_ACT}.

IN WITNESS WHEREOF, the parties hereto have executed this Agreement as of the date first above written.

{sig_a}
{sig_b}
WITNESSES:

1. ________________________
   Name:
   Address:

2. ________________________
   Name:
   Address:
"#,
            heading = title.to_uppercase(),
            purpose = excerpt(req, 100),
            scope = excerpt(req, 150),
            sig_a = signature_block(&party_a),
            sig_b = signature_block(&party_b),
        ),
        DocumentKind::Mou => format!(
            r#"MEMORANDUM OF UNDERSTANDING

THIS MEMORANDUM OF UNDERSTANDING is made this {date}

BETWEEN:

{party_a} (hereinafter referred to as "the First Party")

AND

{party_b} (hereinafter referred to as "the Second Party")

1. PURPOSE
   This Memorandum of Understanding ("MOU") sets forth the understanding and intentions of the parties regarding {purpose}

2. SCOPE
   The parties intend to {scope}

3. NON-BINDING NATURE
   This MOU is not intended to create legal relations between the parties or be legally enforceable, except for the provisions relating to confidentiality and governing law.

4. CONFIDENTIALITY
   The parties agree to maintain the confidentiality of any information shared during the course of this MOU.

5. GOVERNING LAW
   This MOU shall be governed by the laws of the Federal Republic of Nigeria.

{sig_a}
{sig_b}"#,
            purpose = excerpt(req, 100),
            scope = excerpt(req, 150),
            sig_a = signature_block(&party_a),
            sig_b = signature_block(&party_b),
        ),
        DocumentKind::Letter => format!(
            r#"[LETTERHEAD]

{date}

{party_b}
[Address]

Dear Sir/Madam,

RE: {title}

I write on behalf of {party_a} regarding {purpose}

{body}

In accordance with Nigerian law, specifically [relevant Nigerian law], we hereby request that you [specific action required].

Please do not hesitate to contact us if you require any clarification on the above.

Yours faithfully,

________________________
For: {party_a}
Name:
Position:
"#,
            purpose = excerpt(req, 100),
            body = excerpt(req, 200),
        ),
        DocumentKind::Clause => format!(
            r#"LEGAL CLAUSE

{title}

{body}

This clause shall be interpreted in accordance with the laws of the Federal Republic of Nigeria, particularly [relevant Nigerian law].

Any dispute arising from this clause shall be resolved through arbitration in accordance with {ARBITRATION_ACT}.
"#,
            body = excerpt(req, 300),
        ),
        DocumentKind::Other => format!(
            r#"{heading}

THIS DOCUMENT is created on {date}

This document addresses the following requirements:

{req}

The content of this document is governed by the relevant laws of the Federal Republic of Nigeria.

[This is a demo document generated without API access. For a complete legal document, please configure the Groq API key.]
"#,
            heading = title.to_uppercase(),
            req = req.trim(),
        ),
    };

    GeneratedDocument { document, title }
}

/// Offline regeneration of a stored analysis: clauses with any non-blank
/// suggestion applied inline, followed by the legal references.
pub fn render_analysis_document(analysis: &DocumentAnalysis, date: NaiveDate) -> String {
    let clauses = analysis
        .key_clauses
        .iter()
        .map(|clause| {
            let content = match &clause.suggestion {
                Some(s) if !s.trim().is_empty() => {
                    format!("{}\n\n[IMPROVED: {}]", clause.content, s)
                }
                _ => clause.content.clone(),
            };
            format!("{}\n\n{}", clause.title.to_uppercase(), content)
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let references = analysis
        .nigerian_law_references
        .iter()
        .map(|r| format!("- {} ({}): {}", r.title, r.citation, r.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "DOCUMENT: {name}\n\
DATE: {date}\n\
SUMMARY: {summary}\n\n\
{clauses}\n\n\
LEGAL REFERENCES:\n\
{references}\n\n\
[This document was generated in demo mode. Configure the Groq API for more detailed document generation.]\n",
        name = analysis.document_name,
        date = format_date(date),
        summary = analysis.summary,
    )
}
