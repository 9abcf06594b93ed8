use std::collections::HashMap;

use serde_json::Value;

use crate::config::SheetHeaders;
use crate::sheets::types::{CallStatus, WorkItem};

/// Render a cell the way it reads in the sheet. Whole numbers lose their
/// trailing `.0` so phone numbers survive unformatted reads.
pub fn cell_text(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
                    _ => n.to_string(),
                }
            }
        }
        Value::Bool(b) => b.to_string().to_uppercase(),
        other => other.to_string(),
    }
}

/// Map a values grid (first row = header names) to work items.
///
/// `header_rows` rows are skipped; data record `i` sits on sheet row
/// `header_rows + 1 + i`.
pub fn map_work_items(values: &[Vec<Value>], headers: &SheetHeaders, header_rows: u32) -> Vec<WorkItem> {
    let header_index: HashMap<String, usize> = values
        .first()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(i, cell)| (cell_text(cell).trim().to_string(), i))
                .collect()
        })
        .unwrap_or_default();

    let field = |row: &[Value], name: &str| -> String {
        header_index
            .get(name)
            .and_then(|&i| row.get(i))
            .map(cell_text)
            .unwrap_or_default()
    };

    values
        .iter()
        .skip(header_rows as usize)
        .enumerate()
        .map(|(i, row)| WorkItem {
            row: header_rows + 1 + i as u32,
            patient_name: field(row, &headers.patient_name),
            phone_number: field(row, &headers.phone_number),
            operation_type: field(row, &headers.operation_type),
            status: CallStatus::parse(&field(row, &headers.call_status)),
        })
        .collect()
}

/// Column number to letters: 1 -> A, 27 -> AA.
pub fn column_letters(mut column: u32) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Quote a worksheet title for use in A1 notation.
pub fn quoted_sheet(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// A1 reference of a single cell, e.g. `'Sheet1'!D5`.
pub fn a1_cell(sheet_title: &str, row: u32, column: u32) -> String {
    format!("{}!{}{row}", quoted_sheet(sheet_title), column_letters(column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn grid(rows: Value) -> Vec<Vec<Value>> {
        serde_json::from_value(rows).unwrap()
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(1), "A");
        assert_eq!(column_letters(4), "D");
        assert_eq!(column_letters(26), "Z");
        assert_eq!(column_letters(27), "AA");
        assert_eq!(column_letters(52), "AZ");
        assert_eq!(column_letters(703), "AAA");
    }

    #[test]
    fn test_a1_cell_quotes_title() {
        assert_eq!(a1_cell("Sheet1", 5, 4), "'Sheet1'!D5");
        assert_eq!(a1_cell("Patient's list", 2, 5), "'Patient''s list'!E2");
    }

    #[test]
    fn test_cell_text_numbers() {
        assert_eq!(cell_text(&json!(919999999999u64)), "919999999999");
        assert_eq!(cell_text(&json!(919999999999.0)), "919999999999");
        assert_eq!(cell_text(&json!(1.5)), "1.5");
        assert_eq!(cell_text(&json!(null)), "");
    }

    #[test]
    fn test_map_work_items_uses_header_names() {
        let values = grid(json!([
            ["Patient_name", "Phone_number", "Operation_type", "Call_status", "Recording"],
            ["ramesh", "919999999999", "Cataract", "PENDING"],
            [],
            ["sita", 918888888888u64, "Retina", "SUCCESS", "https://x/y.mp3"]
        ]));

        let items = map_work_items(&values, &SheetHeaders::default(), 1);
        assert_eq!(items.len(), 3);

        assert_eq!(items[0].row, 2);
        assert_eq!(items[0].patient_name, "ramesh");
        assert_eq!(items[0].phone_number, "919999999999");
        assert_eq!(items[0].operation_type, "Cataract");
        assert_eq!(items[0].status, CallStatus::Pending);

        // Blank interior rows keep their slot so later row numbers stay right
        assert_eq!(items[1].row, 3);
        assert_eq!(items[1].status, CallStatus::Other(String::new()));

        assert_eq!(items[2].row, 4);
        assert_eq!(items[2].phone_number, "918888888888");
        assert_eq!(items[2].status, CallStatus::Success);
    }

    #[test]
    fn test_map_work_items_empty_sheet() {
        assert!(map_work_items(&[], &SheetHeaders::default(), 1).is_empty());
    }
}
