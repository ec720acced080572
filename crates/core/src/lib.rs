//! `vitrine-core`: product catalogue engine.
//!
//! Pure engine crate: receives decoded images and raw spreadsheet records,
//! keeps the session state, and projects the product list into pages.
//! No CLI or IO dependencies.

pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod projection;
pub mod store;

pub use error::{CatalogueError, DataFileParseError, ValidationError};
pub use matcher::reconcile;
pub use model::{
    DataRow, ImageAsset, ManualProduct, Product, ProductId, ProductPatch, ProductSource, RawRecord,
    RawValue,
};
pub use normalize::{normalize_records, HeaderSynonyms, NormalizedRows};
pub use projection::{project, CataloguePage, ExportOptions};
pub use store::{CatalogueStore, LoadOutcome, LoadTicket};
