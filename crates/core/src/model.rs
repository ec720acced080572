use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// An uploaded picture. Identity is the filename; the payload is never
/// hashed or compared.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub filename: String,
    pub media_type: String,
    pub bytes: Arc<[u8]>,
}

impl ImageAsset {
    pub fn new(filename: impl Into<String>, media_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            filename: filename.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Filename with the final extension segment removed.
    ///
    /// `chair.jpg` → `chair`, `oak.chair.png` → `oak.chair`. Names with no
    /// dot, or whose only dot is the leading one (`.hidden`), are returned
    /// unchanged.
    pub fn stem(&self) -> &str {
        match self.filename.rfind('.') {
            Some(idx) if idx > 0 => &self.filename[..idx],
            _ => &self.filename,
        }
    }
}

impl fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAsset")
            .field("filename", &self.filename)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet rows
// ---------------------------------------------------------------------------

/// A single cell value as delivered by a spreadsheet parser, before
/// normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl RawValue {
    /// Coerce to trimmed text. `None` for `Null`.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.trim().to_string()),
            Self::Number(n) => Some(format_number(*n)),
            Self::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Self::Null => None,
        }
    }
}

/// Integers without decimals, everything else in shortest form.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// One heterogeneous spreadsheet record: header → value, in header order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: Vec<(String, RawValue)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: RawValue) {
        self.fields.push((key.into(), value));
    }

    /// Value under an exact key. The first occurrence wins for duplicated headers.
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, RawValue)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, RawValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// A normalized metadata row. `image_key` is never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRow {
    pub image_key: String,
    pub title: String,
    pub material: String,
    pub description: String,
    pub price: String,
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(Uuid);

impl ProductId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Where a product's fields came from. Display/audit only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSource {
    Manual,
    Matched,
}

impl fmt::Display for ProductSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::Matched => write!(f, "matched"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub image: Option<Arc<ImageAsset>>,
    pub title: String,
    pub price: String,
    pub material: String,
    pub description: String,
    pub source: ProductSource,
}

impl Product {
    pub fn image_filename(&self) -> Option<&str> {
        self.image.as_deref().map(|img| img.filename.as_str())
    }

    pub(crate) fn matched(image: Arc<ImageAsset>, row: &DataRow) -> Self {
        Self {
            id: ProductId::generate(),
            image: Some(image),
            title: row.title.clone(),
            price: row.price.clone(),
            material: row.material.clone(),
            description: row.description.clone(),
            source: ProductSource::Matched,
        }
    }

    pub(crate) fn from_image(image: Arc<ImageAsset>) -> Self {
        Self {
            id: ProductId::generate(),
            title: image.stem().to_string(),
            image: Some(image),
            price: String::new(),
            material: String::new(),
            description: String::new(),
            source: ProductSource::Manual,
        }
    }
}

/// Input of the manual entry form.
#[derive(Debug, Clone, Default)]
pub struct ManualProduct {
    pub image: Option<Arc<ImageAsset>>,
    pub title: String,
    pub price: String,
    pub material: String,
    pub description: String,
}

/// Partial update of a product's text fields. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub price: Option<String>,
    pub material: Option<String>,
    pub description: Option<String>,
}

impl ProductPatch {
    pub(crate) fn apply(self, product: &mut Product) {
        if let Some(title) = self.title {
            product.title = title;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(material) = self.material {
            product.material = material;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
    }
}
