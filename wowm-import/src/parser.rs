//! Bulk import text parser
//!
//! Line grammar: `name[,decor][,profession]`
//!
//! - Blank lines and lines starting with `#` are skipped
//! - Lines longer than [`MAX_LINE_CHARS`] are skipped
//! - `decor` (any case) in any position after the name marks the item decorative
//! - The first profession keyword (English or Spanish) sets the profession
//! - Any other token directly after the name is part of the name
//!   (`Sword, of Doom` stays one name)
//!
//! Parsing is pure: no I/O and no state beyond the input text.

use crate::error::{ImportError, ImportResult};
use crate::professions::Profession;
use serde::Serialize;
use tracing::{debug, info};

/// Maximum length of an import line and of an item name, in characters
pub const MAX_LINE_CHARS: usize = 255;

const DECOR_TOKEN: &str = "decor";

/// One importable item parsed from a text line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRecord {
    /// Item name, trimmed and non-empty
    pub name: String,
    pub is_decor: bool,
    pub profession: Option<Profession>,
    /// Trimmed source line, kept for diagnostics
    pub original_line: String,
    /// 1-based line number in the source text
    pub line_number: usize,
}

impl ImportRecord {
    /// Build a record for a single item entered directly
    pub fn single(name: &str, is_decor: bool, profession: Option<Profession>) -> ImportResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ImportError::InvalidItem("item name is empty".to_string()));
        }
        if name.chars().count() > MAX_LINE_CHARS {
            return Err(ImportError::InvalidItem(format!(
                "item name is longer than {} characters",
                MAX_LINE_CHARS
            )));
        }

        Ok(Self {
            name: name.to_string(),
            is_decor,
            profession,
            original_line: name.to_string(),
            line_number: 1,
        })
    }
}

/// Per-file statistics shown before an import is started
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseSummary {
    pub total: usize,
    pub with_profession: usize,
    pub decor: usize,
}

impl ParseSummary {
    pub fn from_records(records: &[ImportRecord]) -> Self {
        Self {
            total: records.len(),
            with_profession: records.iter().filter(|r| r.profession.is_some()).count(),
            decor: records.iter().filter(|r| r.is_decor).count(),
        }
    }
}

/// Parse import text into records, preserving input order
pub fn parse_import_text(content: &str) -> Vec<ImportRecord> {
    let records: Vec<ImportRecord> = content
        .split('\n')
        .enumerate()
        .filter_map(|(index, line)| parse_line(line, index + 1))
        .collect();

    let summary = ParseSummary::from_records(&records);
    info!(
        items = summary.total,
        decor = summary.decor,
        with_profession = summary.with_profession,
        "Parsed import text"
    );

    records
}

/// Parse a single line; `None` means the line is skipped
pub fn parse_line(line: &str, line_number: usize) -> Option<ImportRecord> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    if trimmed.chars().count() > MAX_LINE_CHARS {
        debug!(line_number, "Skipping line longer than {} characters", MAX_LINE_CHARS);
        return None;
    }

    let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
    let (first, rest) = parts.split_first()?;
    if first.is_empty() {
        debug!(line_number, line = %trimmed, "Skipping line with empty item name");
        return None;
    }

    let mut name = first.to_string();
    let mut is_decor = false;
    let mut profession = None;

    // Empty parts (`Sword,`, `Sword,,decor`) are dropped before positions are counted
    for (offset, part) in rest.iter().filter(|p| !p.is_empty()).enumerate() {
        let position = offset + 1;

        if part.eq_ignore_ascii_case(DECOR_TOKEN) {
            is_decor = true;
        } else if let Some(found) = Profession::from_keyword(part) {
            if profession.is_none() {
                profession = Some(found);
            }
        } else if position == 1 {
            name.push_str(", ");
            name.push_str(part);
        } else {
            debug!(line_number, token = %part, "Ignoring unrecognized token");
        }
    }

    let name = name.trim().to_string();
    if name.is_empty() || name.chars().count() > MAX_LINE_CHARS {
        debug!(line_number, line = %trimmed, "Skipping line with unusable item name");
        return None;
    }

    Some(ImportRecord {
        name,
        is_decor,
        profession,
        original_line: trimmed.to_string(),
        line_number,
    })
}
