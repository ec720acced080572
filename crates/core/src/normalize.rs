//! Row Normalizer: heterogeneous spreadsheet records → [`DataRow`].

use serde::{Deserialize, Serialize};

use crate::model::{DataRow, RawRecord, RawValue};

/// Admissible header names per target field, searched in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeaderSynonyms {
    pub image_key: Vec<String>,
    pub title: Vec<String>,
    pub material: Vec<String>,
    pub description: Vec<String>,
    pub price: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for HeaderSynonyms {
    fn default() -> Self {
        Self {
            image_key: names(&["Image Name", "image name", "Image", "Filename"]),
            title: names(&["Model Name", "model name", "Product Name", "Title"]),
            material: names(&["Material", "material", "Subtext", "Subtitle"]),
            description: names(&["Configuration", "configuration", "Description", "Desc"]),
            price: names(&["Offer Price", "offer price", "Price", "MRP"]),
        }
    }
}

/// Result of normalizing a whole file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRows {
    pub rows: Vec<DataRow>,
    /// Records discarded for lacking an image key.
    pub dropped: usize,
}

/// Look up the first synonym present in `record`.
///
/// Pass 1 tries every synonym as an exact key; pass 2 retries them
/// case-insensitively against the record's keys in header order. `Null`
/// values are not hits. No hit → empty string.
pub fn find_value(record: &RawRecord, synonyms: &[String]) -> String {
    for key in synonyms {
        if let Some(text) = record.get(key).and_then(RawValue::to_text) {
            return text;
        }
    }

    for target in synonyms {
        let target = target.to_lowercase();
        let hit = record
            .keys()
            .find(|k| k.to_lowercase() == target)
            .and_then(|k| record.get(k))
            .and_then(RawValue::to_text);
        if let Some(text) = hit {
            return text;
        }
    }

    String::new()
}

/// Normalize one record. `None` when it has no usable image key.
pub fn normalize_record(record: &RawRecord, synonyms: &HeaderSynonyms) -> Option<DataRow> {
    let image_key = find_value(record, &synonyms.image_key);
    if image_key.is_empty() {
        return None;
    }

    Some(DataRow {
        image_key,
        title: find_value(record, &synonyms.title),
        material: find_value(record, &synonyms.material),
        description: find_value(record, &synonyms.description),
        price: find_value(record, &synonyms.price),
    })
}

/// Normalize records in file order, dropping those without an image key.
pub fn normalize_records<'a, I>(records: I, synonyms: &HeaderSynonyms) -> NormalizedRows
where
    I: IntoIterator<Item = &'a RawRecord>,
{
    let mut out = NormalizedRows::default();
    for record in records {
        match normalize_record(record, synonyms) {
            Some(row) => out.rows.push(row),
            None => out.dropped += 1,
        }
    }
    if out.dropped > 0 {
        tracing::debug!(kept = out.rows.len(), dropped = out.dropped, "dropped rows without an image key");
    }
    out
}
