//! Client SDK for the lexng server: an HTTP client and a local keyed store
//! that syncs with it.

pub mod client;
pub mod error;
pub mod local;

pub use client::LexngClient;
pub use error::{ClientError, Result};
pub use local::{LocalStore, SyncReport};
