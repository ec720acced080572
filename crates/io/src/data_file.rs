//! Data-file ingestion: pick a parser by extension, normalize the records,
//! and feed the result to a [`CatalogueStore`].

use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use vitrine_core::normalize::normalize_records;
use vitrine_core::{CatalogueError, CatalogueStore, DataFileParseError, HeaderSynonyms, LoadOutcome, NormalizedRows, RawRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// CSV / TSV / other delimited text.
    Delimited,
    /// Binary spreadsheet workbook; only the first sheet is read.
    Workbook,
}

impl DataFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Self::Workbook,
            _ => Self::Delimited,
        }
    }
}

/// Name shown for the loaded data file.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read raw records without normalizing them.
pub fn read_records(path: &Path) -> Result<Vec<RawRecord>, DataFileParseError> {
    let result = match DataFormat::from_path(path) {
        DataFormat::Workbook => crate::xlsx::import_records(path),
        DataFormat::Delimited => crate::csv::import_records(path),
    };
    result.map_err(|reason| DataFileParseError::new(display_name(path), reason))
}

/// Parse and normalize a data file.
pub fn parse_data_file(path: &Path, synonyms: &HeaderSynonyms) -> Result<NormalizedRows, DataFileParseError> {
    let records = read_records(path)?;
    let normalized = normalize_records(&records, synonyms);
    tracing::info!(
        file = %display_name(path),
        records = records.len(),
        rows = normalized.rows.len(),
        dropped = normalized.dropped,
        "parsed data file"
    );
    Ok(normalized)
}

/// [`parse_data_file`] on tokio's blocking pool.
pub async fn parse_data_file_async(
    path: PathBuf,
    synonyms: HeaderSynonyms,
) -> Result<NormalizedRows, DataFileParseError> {
    let name = display_name(&path);
    tokio::task::spawn_blocking(move || parse_data_file(&path, &synonyms))
        .await
        .map_err(|e| DataFileParseError::new(name, format!("parser task failed: {e}")))?
}

/// Load a data file into a shared store.
///
/// The lock is held only to take a load ticket and to apply the result;
/// parsing happens with the store unlocked. If the session is reset in the
/// meantime the parsed rows are discarded ([`LoadOutcome::Stale`]).
pub async fn load_data_file(
    store: &Mutex<CatalogueStore>,
    path: &Path,
    synonyms: &HeaderSynonyms,
) -> Result<LoadOutcome, CatalogueError> {
    let ticket = store.lock().begin_data_load();
    let parsed = parse_data_file_async(path.to_path_buf(), synonyms.clone()).await;
    store
        .lock()
        .complete_data_load(ticket, display_name(path), parsed.map(|n| n.rows))
}
