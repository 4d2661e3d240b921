//! Integration tests for column extraction

use pretty_assertions::assert_eq;
use tabular::{extract, Table, TableError};

#[test]
fn test_one_value_per_data_row() {
    let cases: [(&str, usize); 5] = [
        ("Code\n", 0),
        ("Name,Code\nA,1\nB\nC,3\n", 3),
        ("Name,Code\nA,1\n\n\nD,4", 4),
        ("Name,Code,Extra\n,,\nx\n", 2),
        ("Name;Code\r\nA;1\r\n\r\nB;\r\n", 3),
    ];

    for (raw, rows) in cases {
        let values = extract(raw.as_bytes(), "Code").unwrap();
        assert_eq!(values.len(), rows, "table {raw:?}");
    }
}

#[test]
fn test_semicolon_table_with_decimal_commas() {
    let raw = "Ticket;Price\nT-1;1,50\nT-2;2,75\n";
    assert_eq!(extract(raw.as_bytes(), "Price").unwrap(), vec!["1,50", "2,75"]);
    assert_eq!(extract(raw.as_bytes(), "Ticket").unwrap(), vec!["T-1", "T-2"]);
}

#[test]
fn test_tab_separated_table() {
    let raw = "id\tpayload\n1\thttps://example.com/a?x=1,2\n2\t\n";
    assert_eq!(
        extract(raw.as_bytes(), "payload").unwrap(),
        vec!["https://example.com/a?x=1,2", ""]
    );
}

#[test]
fn test_single_column_table_defaults_to_comma() {
    let table = Table::parse(b"Code\nABC\n\nDEF\n").unwrap();
    assert_eq!(table.delimiter(), b',');
    assert_eq!(table.column("Code").unwrap(), vec!["ABC", "", "DEF"]);
}

#[test]
fn test_quoted_cells_are_unquoted_and_trimmed() {
    let raw = "Name,Code\n\"Doe, J\",\"  42 \"\n";
    assert_eq!(extract(raw.as_bytes(), "Code").unwrap(), vec!["42"]);
    assert_eq!(extract(raw.as_bytes(), "Name").unwrap(), vec!["Doe, J"]);
}

#[test]
fn test_utf8_payloads() {
    let raw = "ชื่อ,รหัส\nก,๑๒๓\n";
    assert_eq!(extract(raw.as_bytes(), "รหัส").unwrap(), vec!["๑๒๓"]);
}

#[test]
fn test_column_not_found_lists_available_columns() {
    match extract(b"Name,Code\n", "code") {
        Err(TableError::ColumnNotFound { column, available }) => {
            assert_eq!(column, "code");
            assert_eq!(available, vec!["Name", "Code"]);
        }
        other => panic!("expected ColumnNotFound, got {other:?}"),
    }
}

fn single_column(header: &str, values: &[String]) -> String {
    let mut raw = format!("{header}\n");
    for value in values {
        raw.push_str(value);
        raw.push('\n');
    }
    raw
}

#[test]
fn test_single_column_urls_are_not_split() {
    let urls: Vec<String> = (0..25)
        .map(|i| format!("https://tickets.example.com/t/{i}"))
        .collect();
    let raw = single_column("url", &urls);

    assert_eq!(Table::parse(raw.as_bytes()).unwrap().delimiter(), b',');
    assert_eq!(extract(raw.as_bytes(), "url").unwrap(), urls);
}

#[test]
fn test_single_column_decimals_are_not_split() {
    let amounts: Vec<String> = (0..12).map(|i| format!("{i}.50")).collect();
    let raw = single_column("amount", &amounts);
    assert_eq!(extract(raw.as_bytes(), "amount").unwrap(), amounts);
}

#[test]
fn test_single_column_dates_are_not_split() {
    let dates: Vec<String> = (1..=12).map(|d| format!("2024-03-{d:02}")).collect();
    let raw = single_column("date", &dates);
    assert_eq!(extract(raw.as_bytes(), "date").unwrap(), dates);
}

#[test]
fn test_single_column_emails_are_not_split() {
    let emails: Vec<String> = (0..12).map(|i| format!("guest{i}@example.com")).collect();
    let raw = single_column("email", &emails);
    assert_eq!(extract(raw.as_bytes(), "email").unwrap(), emails);
}
