pub mod completion;
pub mod config;
pub mod error;
pub mod store;
pub mod text;
pub mod types;
pub mod validate;

pub use error::{Error, ErrorKind, Result};
pub use types::*;
