// JSON export of the page projection

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use vitrine_core::{CataloguePage, ProductId};

use crate::error::IoError;

#[derive(Debug, Serialize)]
pub struct CatalogueDocument<'a> {
    pub meta: DocumentMeta,
    pub pages: Vec<PageRecord<'a>>,
}

#[derive(Debug, Serialize)]
pub struct DocumentMeta {
    pub page_count: usize,
    pub engine_version: String,
    pub generated_at: String,
}

/// One page, with the image reduced to its name and media type.
#[derive(Debug, Serialize)]
pub struct PageRecord<'a> {
    pub page_number: usize,
    pub product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<&'a str>,
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_label: Option<&'a str>,
    pub contact_link: &'a str,
}

impl<'a> From<&'a CataloguePage> for PageRecord<'a> {
    fn from(page: &'a CataloguePage) -> Self {
        Self {
            page_number: page.page_number,
            product_id: page.product_id,
            image: page.image.as_deref().map(|img| img.filename.as_str()),
            media_type: page.image.as_deref().map(|img| img.media_type.as_str()),
            title: &page.title,
            material: page.material.as_deref(),
            description: page.description.as_deref(),
            price: page.price.as_deref(),
            price_label: page.price_label.as_deref(),
            contact_link: &page.contact_link,
        }
    }
}

pub fn document(pages: &[CataloguePage]) -> CatalogueDocument<'_> {
    CatalogueDocument {
        meta: DocumentMeta {
            page_count: pages.len(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        },
        pages: pages.iter().map(PageRecord::from).collect(),
    }
}

pub fn to_json_string(pages: &[CataloguePage]) -> Result<String, IoError> {
    Ok(serde_json::to_string_pretty(&document(pages))?)
}

pub fn export(pages: &[CataloguePage], path: &Path) -> Result<(), IoError> {
    let file = File::create(path).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &document(pages))?;
    tracing::info!(path = %path.display(), pages = pages.len(), "wrote JSON catalogue");
    Ok(())
}
