//! Field delimiter detection
//!
//! Best-effort: a candidate wins when it occurs the same number of times on
//! (nearly) every line of the sample, header line included. Dialects where
//! that does not hold are not detected and callers fall back to a comma.

use std::collections::HashMap;

/// Maximum number of characters inspected when sniffing
pub const SNIFF_SAMPLE_CHARS: usize = 4096;

/// Default delimiter when sniffing finds nothing
pub const DEFAULT_DELIMITER: u8 = b',';

/// Delimiters tried first when several candidates are equally consistent
const PREFERRED: [u8; 5] = [b',', b'\t', b';', b' ', b':'];

/// Lowest fraction of lines that must agree on a candidate's count
const MIN_CONSISTENCY: f64 = 0.9;

/// Take at most [`SNIFF_SAMPLE_CHARS`] characters from the start of `text`
pub fn sample(text: &str) -> &str {
    match text.char_indices().nth(SNIFF_SAMPLE_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Pick the delimiter for `text`, defaulting to a comma
pub fn detect_delimiter(text: &str) -> u8 {
    let mut sample = sample(text);
    if sample.len() < text.len() {
        // drop the cut-off last line
        if let Some(end) = sample.rfind('\n') {
            sample = &sample[..end];
        }
    }

    match sniff_delimiter(sample) {
        Some(delimiter) => {
            tracing::debug!(delimiter = %char::from(delimiter), "sniffed delimiter");
            delimiter
        }
        None => {
            tracing::debug!("could not sniff delimiter, using comma");
            DEFAULT_DELIMITER
        }
    }
}

/// Guess the field delimiter of a sample
///
/// Returns `None` when no candidate character is consistent across lines,
/// e.g. for single-column tables.
pub fn sniff_delimiter(sample: &str) -> Option<u8> {
    let lines: Vec<&str> = sample
        .split(['\n', '\r'])
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        return None;
    }

    // candidate -> per-line occurrence counts
    let mut counts: HashMap<u8, Vec<usize>> = HashMap::new();
    for (index, line) in lines.iter().enumerate() {
        for (byte, count) in count_candidates(line) {
            counts.entry(byte).or_insert_with(|| vec![0; lines.len()])[index] = count;
        }
    }

    // (candidate, mode count, fraction of lines at the mode)
    // The header must split into the same number of fields as the data, so a
    // character that only shows up inside values (`:` in URLs) never qualifies.
    let mut scored: Vec<(u8, usize, f64)> = counts
        .into_iter()
        .filter_map(|(byte, per_line)| {
            let (mode, hits) = mode(&per_line);
            (mode > 0 && per_line[0] == mode)
                .then_some((byte, mode, hits as f64 / lines.len() as f64))
        })
        .collect();
    if scored.is_empty() {
        return None;
    }

    let best_consistency = scored
        .iter()
        .map(|&(_, _, consistency)| consistency)
        .fold(0.0, f64::max);
    if best_consistency < MIN_CONSISTENCY {
        return None;
    }
    scored.retain(|&(_, _, consistency)| consistency == best_consistency);

    if let Some(&preferred) = PREFERRED
        .iter()
        .find(|p| scored.iter().any(|&(byte, _, _)| byte == **p))
    {
        return Some(preferred);
    }

    scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.first().map(|&(byte, _, _)| byte)
}

/// Count delimiter candidates on one line, ignoring text inside double quotes
fn count_candidates(line: &str) -> HashMap<u8, usize> {
    let mut counts = HashMap::new();
    let mut in_quotes = false;
    for byte in line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if !in_quotes && is_candidate(byte) {
            *counts.entry(byte).or_insert(0) += 1;
        }
    }
    counts
}

fn is_candidate(byte: u8) -> bool {
    byte == b'\t' || byte == b' ' || (byte.is_ascii_punctuation() && byte != b'\'')
}

/// Most frequent value and how often it occurs (ties go to the larger value)
fn mode(values: &[usize]) -> (usize, usize) {
    let mut frequency: HashMap<usize, usize> = HashMap::new();
    for &value in values {
        *frequency.entry(value).or_insert(0) += 1;
    }
    frequency
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
        .unwrap_or((0, 0))
}
