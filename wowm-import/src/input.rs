//! Import file loading
//!
//! Rejects anything that is not a small UTF-8 `.txt` file before it is
//! parsed, so a bad file never reaches the backend.

use crate::error::{ImportError, ImportResult};
use crate::parser::{parse_import_text, ImportRecord};
use std::path::Path;
use tracing::debug;

/// Maximum accepted import file size (100 KiB)
pub const MAX_FILE_BYTES: u64 = 100 * 1024;

const UTF8_BOM: char = '\u{FEFF}';

/// Read an import file after validating extension, size and encoding
pub fn load_import_file(path: &Path) -> ImportResult<String> {
    let is_txt = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("txt"))
        .unwrap_or(false);
    if !is_txt {
        return Err(ImportError::UnsupportedFileType(path.to_path_buf()));
    }

    let size = std::fs::metadata(path)?.len();
    if size > MAX_FILE_BYTES {
        return Err(ImportError::FileTooLarge {
            size,
            max: MAX_FILE_BYTES,
        });
    }

    let bytes = std::fs::read(path)?;
    let content =
        String::from_utf8(bytes).map_err(|_| ImportError::InvalidEncoding(path.to_path_buf()))?;

    match content.strip_prefix(UTF8_BOM) {
        Some(stripped) => Ok(stripped.to_string()),
        None => Ok(content),
    }
}

/// Load and parse an import file; an empty result is rejected
pub fn read_import_records(path: &Path) -> ImportResult<Vec<ImportRecord>> {
    let content = load_import_file(path)?;
    let records = parse_import_text(&content);

    if records.is_empty() {
        return Err(ImportError::NoValidItems(path.to_path_buf()));
    }

    debug!(file = %path.display(), "Import file loaded");
    Ok(records)
}
