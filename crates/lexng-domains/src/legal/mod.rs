pub mod templates;

use chrono::{DateTime, Utc};
use lexng_core::{
    Clause, DocumentAnalysis, Entity, EntityType, LegalReference, ReferenceType, Risk, Sentiment,
    Severity,
};

/// Text analysed for uploads we cannot extract text from (PDF/DOCX).
pub const SAMPLE_DOCUMENT_TEXT: &str = "\
COMPANIES AND ALLIED MATTERS ACT, 2020

ARRANGEMENT OF SECTIONS

PART A—CORPORATE AFFAIRS COMMISSION

1. Establishment of the Corporate Affairs Commission.
2. Establishment of Governing Board of the Commission.
3. Tenure of office.
4. Remuneration and allowances.
5. Functions of the Commission.
6. Powers of the Commission.
7. Appointment of Registrar-General.
8. Appointment of staff.
9. Right to request for information.
10. Fund of the Commission.
11. Expenditure of the Commission.
12. Annual accounts, audit and estimates.
13. Annual report.

PART B—INCORPORATION OF COMPANIES AND INCIDENTAL MATTERS

CHAPTER 1—FORMATION OF COMPANY

14. Right to form a company.
15. Partnership, etc., of more than 20 members when permitted.
16. Capacity of individual to form company.
17. Types of companies.
18. Private company.
19. Restriction on the transfer of shares by a private company.
20. Consequences of default in complying with conditions constituting a private company.
21. Public company.
22. Unlimited company.
23. Company limited by guarantee.
24. Prohibited associations.

CHAPTER 2—MEMORANDUM AND ARTICLES OF ASSOCIATION

25. Requirements with respect to the memorandum of a company.
26. Form of memorandum.
27. Restriction on alteration of memorandum.
28. Alteration of memorandum.
29. Power to alter conditions in memorandum which could have been contained in articles.
30. Articles for regulating companies.
31. Form and contents of articles.
32. Company limited by guarantee.
33. Effect of memorandum and articles.
34. Effect of altered memorandum and articles on members.
35. Member's right to copies of memorandum, etc.
36. Copies of memorandum issued to embody alterations.
";

pub const DEMO_SUMMARY: &str = "This document appears to contain sections of the Companies and \
Allied Matters Act (CAMA) 2020, which is the primary legal framework for the regulation of \
companies in Nigeria. It outlines the establishment of the Corporate Affairs Commission, its \
powers and functions, and various types of companies that can be registered under Nigerian law.";

/// Suggestion attached to negative clauses that arrive without one.
pub const REVISION_SUGGESTION: &str =
    "Consider revising this clause to provide more clarity and balance between parties.";

pub fn demo_entities() -> Vec<Entity> {
    vec![
        entity("Corporate Affairs Commission", EntityType::Organization, 0.92),
        entity("Registrar-General", EntityType::Person, 0.87),
        entity("Nigeria", EntityType::Location, 0.95),
        entity("2020", EntityType::Date, 0.93),
    ]
}

pub fn demo_clauses() -> Vec<Clause> {
    vec![
        Clause {
            title: "Establishment of the Corporate Affairs Commission".into(),
            kind: "ADMINISTRATIVE".into(),
            content: "1. Establishment of the Corporate Affairs Commission - This section \
                establishes the Corporate Affairs Commission as the primary regulatory body for \
                company registration and administration in Nigeria."
                .into(),
            sentiment: Sentiment::Neutral,
            suggestion: None,
        },
        Clause {
            title: "Right to Form a Company".into(),
            kind: "RIGHTS".into(),
            content: "14. Right to form a company - Any two or more persons may form and \
                incorporate a company by complying with the requirements of this Act in respect \
                of registration of the company."
                .into(),
            sentiment: Sentiment::Positive,
            suggestion: None,
        },
    ]
}

pub fn demo_risks() -> Vec<Risk> {
    vec![
        Risk {
            title: "Non-compliance with Commission Requirements".into(),
            severity: Severity::High,
            description: "Failure to comply with the Corporate Affairs Commission requirements \
                could lead to significant penalties or dissolution of the company."
                .into(),
            recommendation: Some(
                "Ensure regular compliance checks and timely filing of all required documents."
                    .into(),
            ),
            related_clauses: Some(vec![
                "Establishment of the Corporate Affairs Commission".into(),
                "Powers of the Commission".into(),
            ]),
        },
        Risk {
            title: "Improper Share Transfer".into(),
            severity: Severity::Medium,
            description: "Improper transfer of shares in private companies could lead to legal \
                disputes and regulatory sanctions."
                .into(),
            recommendation: Some(
                "Establish clear share transfer protocols in company articles and follow \
                 prescribed procedures."
                    .into(),
            ),
            related_clauses: Some(vec!["Private Company Restrictions".into()]),
        },
    ]
}

pub fn demo_references() -> Vec<LegalReference> {
    vec![
        LegalReference {
            title: "Companies and Allied Matters Act".into(),
            kind: ReferenceType::Statute,
            citation: "CAMA 2020".into(),
            relevance: 0.98,
            description: "The primary legislation governing company registration, \
                administration, and winding up in Nigeria, enacted in 2020 to replace the 1990 Act."
                .into(),
        },
        LegalReference {
            title: "Constitution of the Federal Republic of Nigeria".into(),
            kind: ReferenceType::Constitution,
            citation: "1999 Constitution (as amended)".into(),
            relevance: 0.75,
            description: "The fundamental law of Nigeria that provides the framework for business \
                operations and legal entities."
                .into(),
        },
    ]
}

/// Complete sample analysis, served for unknown ids only when sample
/// fixtures are switched on.
pub fn sample_analysis(id: &str, created_at: DateTime<Utc>) -> DocumentAnalysis {
    let mut key_clauses = demo_clauses();
    key_clauses.push(Clause {
        title: "Private Company Restrictions".into(),
        kind: "RESTRICTION".into(),
        content: "19. Restriction on the transfer of shares by a private company - A private \
            company shall restrict the transfer of its shares in the manner prescribed under this Act."
            .into(),
        sentiment: Sentiment::Negative,
        suggestion: Some(
            "Consider adding specific conditions under which share transfers may be permitted to \
             provide clarity to shareholders."
                .into(),
        ),
    });
    DocumentAnalysis {
        id: id.to_string(),
        document_name: "Sample-CAMA-Document.pdf".into(),
        language: "en".into(),
        summary: "This document contains the first sections of the Companies and Allied Matters \
            Act (CAMA) 2020, which is the primary legal framework for the regulation of companies \
            in Nigeria. It outlines the establishment of the Corporate Affairs Commission, its \
            powers and functions, and various types of companies that can be registered under \
            Nigerian law."
            .into(),
        entities: demo_entities(),
        key_clauses,
        risk_analysis: demo_risks(),
        nigerian_law_references: demo_references(),
        created_at,
    }
}

fn entity(text: &str, kind: EntityType, relevance: f64) -> Entity {
    Entity {
        text: text.into(),
        kind,
        relevance,
    }
}
