//! Export Projection: product list → one visual page per product.
//!
//! Recomputed on every request. The document writers in `vitrine-io`
//! consume the pages; nothing here knows about layout.

use std::sync::Arc;

use crate::model::{ImageAsset, Product, ProductId};

/// Inputs of the page template that do not come from products.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Digits only, international form (e.g. `919061926060`).
    pub contact_number: String,
    pub currency_label: String,
    pub enquiry_base_url: String,
    pub logo: Option<Arc<ImageAsset>>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            contact_number: String::new(),
            currency_label: "Rs.".into(),
            enquiry_base_url: "https://wa.me".into(),
            logo: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CataloguePage {
    /// 1-based.
    pub page_number: usize,
    pub product_id: ProductId,
    pub image: Option<Arc<ImageAsset>>,
    pub title: String,
    pub material: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    /// Boxed price text, e.g. `Rs. 2500`.
    pub price_label: Option<String>,
    pub contact_link: String,
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Pre-filled enquiry message for a product.
pub fn enquiry_message(product: &Product, options: &ExportOptions) -> String {
    if product.price.is_empty() {
        format!(
            "Hi, I'm interested in {}. Could you please provide more details?",
            product.title
        )
    } else {
        format!(
            "Hi, I'm interested in {} ({} {}). Could you please provide more details?",
            product.title, options.currency_label, product.price
        )
    }
}

pub fn contact_link(product: &Product, options: &ExportOptions) -> String {
    let base = options.enquiry_base_url.trim_end_matches('/');
    let message = enquiry_message(product, options);
    format!(
        "{base}/{}?text={}",
        options.contact_number,
        urlencoding::encode(&message)
    )
}

/// Map products, in list order, to pages.
pub fn project(products: &[Product], options: &ExportOptions) -> Vec<CataloguePage> {
    products
        .iter()
        .enumerate()
        .map(|(idx, product)| CataloguePage {
            page_number: idx + 1,
            product_id: product.id,
            image: product.image.clone(),
            title: product.title.clone(),
            material: non_empty(&product.material),
            description: non_empty(&product.description),
            price: non_empty(&product.price),
            price_label: non_empty(&product.price)
                .map(|price| format!("{} {}", options.currency_label, price)),
            contact_link: contact_link(product, options),
        })
        .collect()
}
