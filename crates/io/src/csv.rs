// Delimited-text ingestion (CSV, TSV, semicolon, pipe)

use std::path::Path;

use vitrine_core::{RawRecord, RawValue};

/// Read a delimited file with a header row into raw records.
pub fn import_records(path: &Path) -> Result<Vec<RawRecord>, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    let content = decode_bytes(bytes);
    let delimiter = sniff_delimiter(&content);
    import_records_from_str(&content, delimiter)
}

/// Decode as UTF-8, falling back to Windows-1252 (common for Excel-exported
/// CSVs). A leading byte-order mark is dropped.
pub fn decode_bytes(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };
    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Header line must split into more than one field
        if counts[0] <= 1 {
            continue;
        }

        // Lines agreeing with the header's field count, weighted by that count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Parse delimited text whose first row is the header row.
///
/// Blank lines are skipped. Short rows are accepted; their missing trailing
/// fields are simply absent from the record. Columns with an empty header
/// are ignored.
pub fn import_records_from_str(content: &str, delimiter: u8) -> Result<Vec<RawRecord>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let mut raw = RawRecord::new();
        for (idx, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            if let Some(value) = record.get(idx) {
                raw.push(header.clone(), RawValue::Text(value.to_string()));
            }
        }
        records.push(raw);
    }

    Ok(records)
}
