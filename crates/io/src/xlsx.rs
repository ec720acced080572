// Workbook ingestion (xlsx, xlsm, xls, xlsb, ods) - first sheet only

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use vitrine_core::{RawRecord, RawValue};

/// Read the first sheet of a workbook. Its first row is the header row.
///
/// Empty cells under a header become empty text so every header is present
/// in every record. Rows with no content at all are skipped.
pub fn import_records(path: &Path) -> Result<Vec<RawRecord>, String> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open workbook: {}", e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let first_sheet = sheet_names
        .first()
        .ok_or_else(|| "Workbook contains no sheets".to_string())?;

    let range = workbook
        .worksheet_range(first_sheet)
        .map_err(|e| format!("Failed to read sheet '{}': {}", first_sheet, e))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(header_text).collect(),
        None => return Ok(Vec::new()),
    };

    let mut records = Vec::new();
    for row in rows {
        if row.iter().all(is_blank) {
            continue;
        }

        let mut raw = RawRecord::new();
        for (idx, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let value = row.get(idx).map(cell_value).unwrap_or_else(|| RawValue::Text(String::new()));
            raw.push(header.clone(), value);
        }
        records.push(raw);
    }

    tracing::debug!(sheet = %first_sheet, records = records.len(), "read workbook");
    Ok(records)
}

fn header_text(cell: &Data) -> String {
    match cell_value(cell).to_text() {
        Some(text) => text,
        None => String::new(),
    }
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn cell_value(cell: &Data) -> RawValue {
    match cell {
        Data::Empty => RawValue::Text(String::new()),
        Data::String(s) => RawValue::Text(s.clone()),
        Data::Float(n) => RawValue::Number(*n),
        Data::Int(n) => RawValue::Number(*n as f64),
        Data::Bool(b) => RawValue::Bool(*b),
        Data::Error(e) => RawValue::Text(format!("#{:?}", e)),
        // Date cells keep their serial number, as the sheet stores them
        Data::DateTime(dt) => RawValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => RawValue::Text(s.clone()),
        Data::DurationIso(s) => RawValue::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use tempfile::tempdir;

    #[test]
    fn first_sheet_with_typed_cells() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("products.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Image Name").unwrap();
        sheet.write_string(0, 1, "Model Name").unwrap();
        sheet.write_string(0, 2, "Offer Price").unwrap();
        sheet.write_string(0, 3, "Material").unwrap();
        sheet.write_string(1, 0, "chair.jpg").unwrap();
        sheet.write_string(1, 1, "Oak Chair").unwrap();
        sheet.write_number(1, 2, 2500.0).unwrap();
        sheet.write_string(3, 0, "desk.jpg").unwrap();
        sheet.write_number(3, 2, 1999.5).unwrap();

        let second = workbook.add_worksheet();
        second.write_string(0, 0, "Image Name").unwrap();
        second.write_string(1, 0, "ignored.jpg").unwrap();

        workbook.save(&path).unwrap();

        let records = import_records(&path).unwrap();
        assert_eq!(records.len(), 2, "blank row 3 is skipped, second sheet ignored");
        assert_eq!(records[0].get("Image Name"), Some(&RawValue::Text("chair.jpg".into())));
        assert_eq!(records[0].get("Offer Price"), Some(&RawValue::Number(2500.0)));
        assert_eq!(records[0].get("Material"), Some(&RawValue::Text(String::new())));
        assert_eq!(records[1].get("Model Name"), Some(&RawValue::Text(String::new())));
        assert_eq!(records[1].get("Offer Price"), Some(&RawValue::Number(1999.5)));
    }

    #[test]
    fn corrupt_workbook_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"this is not a zip archive").unwrap();
        assert!(import_records(&path).is_err());
    }
}
