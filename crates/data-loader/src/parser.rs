//! Parser for success-rate table artifacts.
//!
//! Format: one `name::rate` entry per line, UTF-8.
//!
//! ```text
//! Christopher Nolan::0.85
//! Steven Spielberg::0.8
//! ```
//!
//! Line order is insertion order. Names may contain anything except a line
//! break; the rate is everything after the last `::`.

use crate::error::{DataLoadError, Result};
use crate::types::SuccessRateTable;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Parse a success-rate table file
pub fn parse_success_rates(path: &Path) -> Result<SuccessRateTable> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;

    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    parse_success_rates_str(&content, &file)
}

/// Parse table content that is already in memory.
///
/// `file` is only used to label errors.
pub fn parse_success_rates_str(content: &str, file: &str) -> Result<SuccessRateTable> {
    let mut entries = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue; // Skip empty lines
        }

        let (name, rate_str) = line.rsplit_once("::").ok_or_else(|| DataLoadError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: "Missing '::' separator".to_string(),
        })?;

        if name.trim().is_empty() {
            return Err(DataLoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: "Missing name".to_string(),
            });
        }

        let rate: f64 = rate_str.trim().parse().map_err(|e| DataLoadError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: format!("Invalid rate: {}", e),
        })?;

        if !rate.is_finite() {
            return Err(DataLoadError::InvalidValue {
                field: format!("rate for {}", name),
                value: rate_str.trim().to_string(),
            });
        }

        // Names are stored verbatim; only the folded index trims them
        entries.push((name.to_string(), rate));
    }

    Ok(SuccessRateTable::from_entries(entries))
}
