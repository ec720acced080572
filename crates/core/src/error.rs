use thiserror::Error;

use crate::model::ProductId;

/// Spreadsheet content could not be read. The store is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse data file '{file}': {reason}")]
pub struct DataFileParseError {
    pub file: String,
    pub reason: String,
}

impl DataFileParseError {
    pub fn new(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

/// Manual entry refused before anything is created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("a product title is required")]
    MissingTitle,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogueError {
    #[error(transparent)]
    DataFileParse(#[from] DataFileParseError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no product with id {0}")]
    UnknownProduct(ProductId),
    #[error("position {index} is out of range for {len} product(s)")]
    IndexOutOfRange { index: usize, len: usize },
}
