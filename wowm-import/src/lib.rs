//! wowm-import library interface
//!
//! Bulk item import for the marketplace backend: a plain-text item list is
//! parsed into records, then submitted one at a time to the backend's
//! item creation endpoint.

pub mod client;
pub mod driver;
pub mod error;
pub mod input;
pub mod parser;
pub mod professions;
pub mod prompt;
pub mod session;
pub mod template;

pub use crate::error::{ImportError, ImportResult};
pub use crate::parser::{parse_import_text, ImportRecord};
pub use crate::professions::Profession;
