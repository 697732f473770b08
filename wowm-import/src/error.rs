//! Error types for wowm-import
//!
//! Input rejections are raised before any request is sent. Per-record
//! submission failures are counted by the driver and never surface here.

use std::path::PathBuf;
use thiserror::Error;

/// Import error type
#[derive(Debug, Error)]
pub enum ImportError {
    /// Input file does not have a `.txt` extension
    #[error("Only .txt files are accepted: {0:?}")]
    UnsupportedFileType(PathBuf),

    /// Input file exceeds the size limit
    #[error("File is too large ({size} bytes, maximum {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    /// Input file is not UTF-8 text
    #[error("File is not valid UTF-8: {0:?}")]
    InvalidEncoding(PathBuf),

    /// Parsing produced no importable records
    #[error("No valid items found in {0:?}")]
    NoValidItems(PathBuf),

    /// Empty batch handed to the driver
    #[error("No items to process")]
    EmptyBatch,

    /// A batch is already being processed by this driver
    #[error("An import is already running")]
    SessionActive,

    /// Operator answered "no" to the large-batch confirmation
    #[error("Import of {0} items declined by operator")]
    ConfirmationDeclined(usize),

    /// Single item rejected before submission
    #[error("Invalid item: {0}")]
    InvalidItem(String),

    /// Profession name not present in the profession table
    #[error("Unknown profession: {0}")]
    UnknownProfession(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;
