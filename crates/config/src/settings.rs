// Application settings
// Loaded from ~/.config/vitrine/settings.json

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vitrine_core::{ExportOptions, HeaderSynonyms};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Export template
    #[serde(rename = "export.contactNumber")]
    pub contact_number: String,

    #[serde(rename = "export.currencyLabel")]
    pub currency_label: String,

    #[serde(rename = "export.enquiryBaseUrl")]
    pub enquiry_base_url: String,

    #[serde(rename = "export.logoPath")]
    pub logo_path: Option<PathBuf>,

    // Spreadsheet headers
    #[serde(rename = "headers")]
    pub headers: HeaderSynonyms,
}

impl Default for Settings {
    fn default() -> Self {
        let export = ExportOptions::default();
        Self {
            contact_number: export.contact_number,
            currency_label: export.currency_label,
            enquiry_base_url: export.enquiry_base_url,
            logo_path: None,
            headers: HeaderSynonyms::default(),
        }
    }
}

const DEFAULT_FILE: &str = r#"{
    // Enquiry link: <enquiryBaseUrl>/<contactNumber>?text=...
    "export.contactNumber": "",
    "export.currencyLabel": "Rs.",
    "export.enquiryBaseUrl": "https://wa.me",

    // Image shown in the top-left corner of every page
    "export.logoPath": null,

    // Accepted spreadsheet headers, tried in order
    "headers": {
        "imageKey": ["Image Name", "image name", "Image", "Filename"],
        "title": ["Model Name", "model name", "Product Name", "Title"],
        "material": ["Material", "material", "Subtext", "Subtitle"],
        "description": ["Configuration", "configuration", "Description", "Desc"],
        "price": ["Offer Price", "offer price", "Price", "MRP"]
    }
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vitrine")
            .join("settings.json")
    }

    /// Load from the default location. A missing file means defaults.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&Self::config_path())
    }

    /// Load from `path`. Lines starting with `//` are comments.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the commented default file unless one already exists.
    /// Returns whether a file was written.
    pub fn write_default_file(path: &Path) -> Result<bool, SettingsError> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, DEFAULT_FILE).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(true)
    }

    /// Export options without the logo, which the caller loads from
    /// [`Settings::logo_path`].
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            contact_number: self.contact_number.clone(),
            currency_label: self.currency_label.clone(),
            enquiry_base_url: self.enquiry_base_url.clone(),
            logo: None,
        }
    }
}
