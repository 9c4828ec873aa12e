//! Fixed Nigerian-law content used when no completion service is configured:
//! demo extraction results, the sample CAMA excerpt, and document templates.

pub mod legal;

pub use legal::templates::{render_analysis_document, render_template, DocumentKind};
