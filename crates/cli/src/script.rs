//! Edit scripts: a TOML list of store operations replayed in order.
//!
//! ```toml
//! [[step]]
//! op = "add_images"
//! paths = ["photos/"]
//!
//! [[step]]
//! op = "load_data"
//! path = "products.xlsx"
//!
//! [[step]]
//! op = "update"
//! index = 0
//! price = "2400"
//!
//! [[step]]
//! op = "reorder"
//! from = 2
//! to = 0
//! ```
//!
//! Products are addressed by their 0-based position in the list at the
//! moment the step runs. Relative paths resolve against the script's
//! directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Deserialize;
use thiserror::Error;

use vitrine_core::{CatalogueError, CatalogueStore, HeaderSynonyms, LoadOutcome, ManualProduct, ProductId, ProductPatch};
use vitrine_io::IoError;

#[derive(Debug, Deserialize)]
pub struct EditScript {
    #[serde(rename = "step", default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    AddImages {
        paths: Vec<PathBuf>,
    },
    LoadData {
        path: PathBuf,
    },
    AddProduct {
        title: String,
        #[serde(default)]
        image: Option<PathBuf>,
        #[serde(default)]
        price: String,
        #[serde(default)]
        material: String,
        #[serde(default)]
        description: String,
    },
    Update {
        index: usize,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        price: Option<String>,
        #[serde(default)]
        material: Option<String>,
        #[serde(default)]
        description: Option<String>,
    },
    ReplaceImage {
        index: usize,
        path: PathBuf,
    },
    Remove {
        index: usize,
    },
    Reorder {
        from: usize,
        to: usize,
    },
    /// Start over. Refused unless `confirm = true`.
    Reset {
        #[serde(default)]
        confirm: bool,
    },
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Self::AddImages { .. } => "add_images",
            Self::LoadData { .. } => "load_data",
            Self::AddProduct { .. } => "add_product",
            Self::Update { .. } => "update",
            Self::ReplaceImage { .. } => "replace_image",
            Self::Remove { .. } => "remove",
            Self::Reorder { .. } => "reorder",
            Self::Reset { .. } => "reset",
        }
    }
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("cannot read script {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid script: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("step {step} ({op}): {source}")]
    Catalogue {
        step: usize,
        op: &'static str,
        #[source]
        source: CatalogueError,
    },
    #[error("step {step} ({op}): {source}")]
    Io {
        step: usize,
        op: &'static str,
        #[source]
        source: IoError,
    },
    #[error("step {step} (reset): refusing to reset without `confirm = true`")]
    UnconfirmedReset { step: usize },
}

impl EditScript {
    pub fn from_toml(input: &str) -> Result<Self, ScriptError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let input = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&input)
    }
}

/// Summary of a replayed script.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScriptReport {
    pub applied: usize,
    /// Manual entries refused for a missing title.
    pub refused: usize,
    pub stale_loads: usize,
}

/// Replay `script` against the shared store. Stops at the first failing step;
/// steps before it stay applied.
pub async fn apply(
    script: &EditScript,
    store: &Mutex<CatalogueStore>,
    base_dir: &Path,
    synonyms: &HeaderSynonyms,
) -> Result<ScriptReport, ScriptError> {
    let mut report = ScriptReport::default();

    for (idx, step) in script.steps.iter().enumerate() {
        let number = idx + 1;
        let op = step.name();
        let catalogue_err = |source| ScriptError::Catalogue { step: number, op, source };
        let io_err = |source| ScriptError::Io { step: number, op, source };

        tracing::debug!(step = number, op, "applying script step");

        match step {
            Step::AddImages { paths } => {
                let paths: Vec<PathBuf> = paths.iter().map(|p| base_dir.join(p)).collect();
                let batch = vitrine_io::load_images(&paths).map_err(io_err)?;
                store.lock().add_images(batch);
            }
            Step::LoadData { path } => {
                let outcome = vitrine_io::load_data_file(store, &base_dir.join(path), synonyms)
                    .await
                    .map_err(catalogue_err)?;
                if outcome == LoadOutcome::Stale {
                    report.stale_loads += 1;
                }
            }
            Step::AddProduct { title, image, price, material, description } => {
                let image = match image {
                    Some(path) => Some(Arc::new(vitrine_io::load_image(&base_dir.join(path)).map_err(io_err)?)),
                    None => None,
                };
                let entry = ManualProduct {
                    image,
                    title: title.clone(),
                    price: price.clone(),
                    material: material.clone(),
                    description: description.clone(),
                };
                if let Err(e) = store.lock().add_manual_product(entry) {
                    tracing::warn!(step = number, "manual product not added: {e}");
                    report.refused += 1;
                    continue;
                }
            }
            Step::Update { index, title, price, material, description } => {
                let patch = ProductPatch {
                    title: title.clone(),
                    price: price.clone(),
                    material: material.clone(),
                    description: description.clone(),
                };
                let mut guard = store.lock();
                let id = product_at(&guard, *index).map_err(catalogue_err)?;
                guard.update_product_fields(id, patch).map_err(catalogue_err)?;
            }
            Step::ReplaceImage { index, path } => {
                let image = vitrine_io::load_image(&base_dir.join(path)).map_err(io_err)?;
                let mut guard = store.lock();
                let id = product_at(&guard, *index).map_err(catalogue_err)?;
                guard.replace_product_image(id, image).map_err(catalogue_err)?;
            }
            Step::Remove { index } => {
                let mut guard = store.lock();
                let id = product_at(&guard, *index).map_err(catalogue_err)?;
                guard.remove_product(id);
            }
            Step::Reorder { from, to } => {
                store.lock().reorder_product(*from, *to).map_err(catalogue_err)?;
            }
            Step::Reset { confirm } => {
                if !confirm {
                    return Err(ScriptError::UnconfirmedReset { step: number });
                }
                store.lock().reset_all();
            }
        }

        report.applied += 1;
    }

    Ok(report)
}

fn product_at(store: &CatalogueStore, index: usize) -> Result<ProductId, CatalogueError> {
    store
        .products()
        .get(index)
        .map(|p| p.id)
        .ok_or(CatalogueError::IndexOutOfRange {
            index,
            len: store.products().len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn titles(store: &Mutex<CatalogueStore>) -> Vec<String> {
        store.lock().products().iter().map(|p| p.title.clone()).collect()
    }

    #[test]
    fn parses_every_op() {
        let script = EditScript::from_toml(
            r#"
[[step]]
op = "add_images"
paths = ["photos"]

[[step]]
op = "load_data"
path = "products.csv"

[[step]]
op = "add_product"
title = "Desk"

[[step]]
op = "update"
index = 0
price = "10"

[[step]]
op = "replace_image"
index = 0
path = "new.jpg"

[[step]]
op = "remove"
index = 1

[[step]]
op = "reorder"
from = 1
to = 0

[[step]]
op = "reset"
confirm = true
"#,
        )
        .unwrap();

        assert_eq!(script.steps.len(), 8);
        assert_eq!(
            script.steps[3],
            Step::Update { index: 0, title: None, price: Some("10".into()), material: None, description: None }
        );
        assert_eq!(script.steps[7], Step::Reset { confirm: true });
    }

    #[test]
    fn unknown_op_is_rejected() {
        assert!(matches!(
            EditScript::from_toml("[[step]]\nop = \"explode\"\n"),
            Err(ScriptError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn replays_against_store() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("photos")).unwrap();
        fs::write(dir.path().join("photos/chair.jpg"), [1u8]).unwrap();
        fs::write(dir.path().join("photos/lamp.png"), [2u8]).unwrap();
        fs::write(
            dir.path().join("products.csv"),
            "Image Name,Model Name,Offer Price\nchair.jpg,Oak Chair,2500\nlamp.png,Brass Lamp,900\n",
        )
        .unwrap();

        let script = EditScript::from_toml(
            r#"
[[step]]
op = "add_images"
paths = ["photos"]

[[step]]
op = "load_data"
path = "products.csv"

[[step]]
op = "add_product"
title = "   "

[[step]]
op = "add_product"
title = "Gift Card"
price = "500"

[[step]]
op = "update"
index = 0
price = "2400"

[[step]]
op = "reorder"
from = 2
to = 0
"#,
        )
        .unwrap();

        let store = Mutex::new(CatalogueStore::new());
        let report = apply(&script, &store, dir.path(), &HeaderSynonyms::default()).await.unwrap();

        assert_eq!(report, ScriptReport { applied: 5, refused: 1, stale_loads: 0 });
        assert_eq!(titles(&store), vec!["Gift Card", "Oak Chair", "Brass Lamp"]);
        assert_eq!(store.lock().products()[1].price, "2400");
    }

    #[tokio::test]
    async fn out_of_range_step_stops_the_replay() {
        let script = EditScript::from_toml("[[step]]\nop = \"remove\"\nindex = 3\n").unwrap();
        let store = Mutex::new(CatalogueStore::new());
        let err = apply(&script, &store, Path::new("."), &HeaderSynonyms::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ScriptError::Catalogue { step: 1, source: CatalogueError::IndexOutOfRange { index: 3, len: 0 }, .. }
        ));
    }

    #[tokio::test]
    async fn reset_needs_confirmation() {
        let script = EditScript::from_toml("[[step]]\nop = \"reset\"\n").unwrap();
        let store = Mutex::new(CatalogueStore::new());
        let err = apply(&script, &store, Path::new("."), &HeaderSynonyms::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptError::UnconfirmedReset { step: 1 }));
    }
}
