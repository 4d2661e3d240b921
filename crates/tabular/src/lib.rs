//! Tabular - delimited table column extraction
//!
//! This crate provides:
//! - UTF-8 decoding of uploaded table files
//! - Best-effort field delimiter sniffing (comma fallback)
//! - Header lookup by trimmed, case-sensitive column name
//! - Row-aligned column extraction that never drops or reorders rows
//!
//! # Example
//!
//! ```
//! let values = tabular::extract(b"Name,Code\nA,123\nB,\nC,456\n", "Code").unwrap();
//! assert_eq!(values, vec!["123", "", "456"]);
//! ```

mod sniff;
mod table;

pub use sniff::{detect_delimiter, sniff_delimiter, DEFAULT_DELIMITER, SNIFF_SAMPLE_CHARS};
pub use table::Table;

use thiserror::Error;

/// Errors that can occur while reading a table
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Table is empty")]
    EmptyTable,

    #[error("Column '{column}' not found. Available: {available:?}")]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    #[error("Table is not valid UTF-8: {0}")]
    Encoding(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for table operations
pub type Result<T> = std::result::Result<T, TableError>;

/// Extract one value per data row from the named column
///
/// The result has exactly one entry per row after the header, in source
/// order. Blank or short rows produce empty strings.
pub fn extract(raw: &[u8], column: &str) -> Result<Vec<String>> {
    Table::parse(raw)?.column(column)
}

/// Trimmed header names, or an empty list for an empty table
pub fn headers(raw: &[u8]) -> Result<Vec<String>> {
    Ok(Table::parse(raw)?.headers())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_keeps_blank_cells() {
        let values = extract(b"Name,Code\nA,123\nB,\nC,456\n", "Code").unwrap();
        assert_eq!(values, vec!["123", "", "456"]);
    }

    #[test]
    fn test_extract_trailing_space_in_column_name() {
        let values = extract(b"Name,Code\nA,123\n", "Code ").unwrap();
        assert_eq!(values, vec!["123"]);
    }

    #[test]
    fn test_extract_is_idempotent() {
        let raw = b"Name;Code\nA;1\n\nB; 2 \n";
        assert_eq!(extract(raw, "Code").unwrap(), extract(raw, "Code").unwrap());
        assert_eq!(extract(raw, "Code").unwrap(), vec!["1", "", "2"]);
    }

    #[test]
    fn test_extract_missing_column() {
        let err = extract(b"Name,Code\nA,1\n", "Serial").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Column 'Serial' not found. Available: [\"Name\", \"Code\"]"
        );
    }

    #[test]
    fn test_extract_empty_input() {
        assert!(matches!(extract(b"", "Code"), Err(TableError::EmptyTable)));
        assert!(matches!(extract(b"\n\n", "Code"), Err(TableError::EmptyTable)));
    }

    #[test]
    fn test_headers() {
        assert_eq!(headers(b" Name ; Code \n1;2").unwrap(), vec!["Name", "Code"]);
        assert!(headers(b"").unwrap().is_empty());
    }
}
