//! Delimited table parsing and column lookup

use crate::sniff::detect_delimiter;
use crate::{Result, TableError};

/// A parsed delimited table
///
/// Row 0 is the header. Blank lines between records are kept as rows with
/// zero cells so that data rows stay aligned with their line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Vec<String>>,
    delimiter: u8,
}

impl Table {
    /// Decode raw bytes as UTF-8 and parse them with a sniffed delimiter
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let text = decode(raw)?;
        Self::parse_with_delimiter(text, detect_delimiter(text))
    }

    /// Parse text with an explicit delimiter
    pub fn parse_with_delimiter(text: &str, delimiter: u8) -> Result<Self> {
        let data = text.as_bytes();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(data);

        let mut rows = Vec::new();
        let mut record = csv::StringRecord::new();
        let mut position = 0usize;
        while reader.read_record(&mut record)? {
            if !rows.is_empty() {
                rows.extend(std::iter::repeat_with(Vec::new).take(blank_lines_at(data, position)));
            }
            rows.push(record.iter().map(str::to_string).collect());
            position = reader.position().byte() as usize;
        }
        if !rows.is_empty() {
            rows.extend(std::iter::repeat_with(Vec::new).take(blank_lines_at(data, position)));
        }

        Ok(Self { rows, delimiter })
    }

    /// All rows, header included
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// The delimiter the table was parsed with
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Header names with surrounding whitespace removed
    pub fn headers(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|header| header.iter().map(|h| h.trim().to_string()).collect())
            .unwrap_or_default()
    }

    /// Resolve a column name against the trimmed header
    ///
    /// Matching is case-sensitive; the requested name is trimmed too. The
    /// first matching column wins when names repeat.
    pub fn column_index(&self, column: &str) -> Result<usize> {
        if self.rows.is_empty() {
            return Err(TableError::EmptyTable);
        }

        let wanted = column.trim();
        let headers = self.headers();
        headers
            .iter()
            .position(|h| h == wanted)
            .ok_or_else(|| TableError::ColumnNotFound {
                column: column.to_string(),
                available: headers.clone(),
            })
    }

    /// One value per data row for the named column
    ///
    /// Empty rows and rows too short to reach the column yield an empty
    /// string; other cells are trimmed. Order and length follow the data rows.
    pub fn column(&self, column: &str) -> Result<Vec<String>> {
        let index = self.column_index(column)?;

        Ok(self.rows[1..]
            .iter()
            .map(|row| {
                row.get(index)
                    .map(|cell| cell.trim().to_string())
                    .unwrap_or_default()
            })
            .collect())
    }
}

/// Decode table bytes as UTF-8, dropping a leading byte order mark
fn decode(raw: &[u8]) -> Result<&str> {
    let raw = raw.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(raw);
    std::str::from_utf8(raw).map_err(|e| TableError::Encoding(e.to_string()))
}

/// Count the empty lines starting at `position`
///
/// `\r\n`, `\r` and `\n` each end one line. A `\n` right after `\r` belongs
/// to the same line ending, even when the `\r` was consumed with the
/// previous record.
fn blank_lines_at(data: &[u8], position: usize) -> usize {
    let mut lines = 0;
    let mut index = position;
    while let Some(&byte) = data.get(index) {
        match byte {
            b'\r' => lines += 1,
            b'\n' if index > 0 && data[index - 1] == b'\r' => {}
            b'\n' => lines += 1,
            _ => break,
        }
        index += 1;
    }
    lines
}
