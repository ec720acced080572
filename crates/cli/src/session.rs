// Assembles a catalogue session from command-line inputs:
// images, then the data file, then the edit script.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use vitrine_config::Settings;
use vitrine_core::{CatalogueStore, ExportOptions, LoadOutcome};

use crate::script::{self, EditScript};
use crate::CliError;

pub struct SessionInputs {
    pub images: Vec<PathBuf>,
    pub data: Option<PathBuf>,
    pub script: Option<PathBuf>,
}

impl SessionInputs {
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.data.is_none() && self.script.is_none()
    }
}

/// Run the inputs against a fresh store and return it.
pub async fn assemble(inputs: &SessionInputs, settings: &Settings) -> Result<CatalogueStore, CliError> {
    if inputs.is_empty() {
        return Err(CliError::args("nothing to build")
            .with_hint("pass --images, --data or --script"));
    }

    let store = Mutex::new(CatalogueStore::new());

    if !inputs.images.is_empty() {
        let batch = vitrine_io::load_images(&inputs.images).map_err(CliError::from)?;
        let created = store.lock().add_images(batch);
        tracing::info!(products = created.len(), "images added");
    }

    if let Some(data) = &inputs.data {
        match vitrine_io::load_data_file(&store, data, &settings.headers).await {
            Ok(LoadOutcome::Applied { rows, purged, created }) => {
                tracing::info!(rows, purged, created, "data file applied");
            }
            Ok(LoadOutcome::Stale) => {}
            Err(e) => return Err(CliError::catalogue(e)),
        }
    }

    if let Some(path) = &inputs.script {
        let edits = EditScript::load(path).map_err(CliError::script)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let report = script::apply(&edits, &store, base_dir, &settings.headers)
            .await
            .map_err(CliError::script)?;
        if report.refused > 0 {
            eprintln!("warning: {} manual product(s) without a title were not added", report.refused);
        }
    }

    Ok(store.into_inner())
}

/// Export options from settings, with command-line overrides and the logo loaded.
pub fn export_options(
    settings: &Settings,
    contact: Option<String>,
    logo: Option<PathBuf>,
) -> Result<ExportOptions, CliError> {
    let mut options = settings.export_options();
    if let Some(contact) = contact {
        options.contact_number = contact;
    }
    if let Some(path) = logo.or_else(|| settings.logo_path.clone()) {
        let image = vitrine_io::load_image(&path).map_err(CliError::from)?;
        options.logo = Some(Arc::new(image));
    }
    Ok(options)
}

/// One line per unmatched pool image, for stderr.
pub fn unmatched_report(store: &CatalogueStore) -> Option<String> {
    let unmatched = store.unmatched_images();
    if unmatched.is_empty() {
        return None;
    }
    let names: Vec<&str> = unmatched.iter().map(|img| img.filename.as_str()).collect();
    Some(format!("{} image(s) without a matching row: {}", names.len(), names.join(", ")))
}
