//! Completion backend, prompts and the analysis/generation orchestrators.

pub mod analysis;
pub mod draft;
pub mod extract;
pub mod generation;
pub mod groq;
pub mod prompts;
pub mod service;
pub mod translate;

pub use service::LegalService;
