//! Catalogue Store: the session state and every operation that mutates it.
//!
//! All mutations are synchronous. Loading a data file is split into
//! [`CatalogueStore::begin_data_load`] and [`CatalogueStore::complete_data_load`]
//! so the caller can parse without holding the store; a load that started
//! before a [`CatalogueStore::reset_all`] is discarded on completion.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{CatalogueError, DataFileParseError, ValidationError};
use crate::matcher::reconcile;
use crate::model::{DataRow, ImageAsset, ManualProduct, Product, ProductId, ProductPatch, ProductSource};

/// Captures the session epoch at the moment a data-file load starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct LoadTicket {
    epoch: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied {
        rows: usize,
        /// Pool-derived products discarded before re-matching.
        purged: usize,
        created: usize,
    },
    /// The session was reset while the file was being parsed.
    Stale,
}

#[derive(Debug, Default)]
pub struct CatalogueStore {
    image_pool: Vec<Arc<ImageAsset>>,
    rows: Vec<DataRow>,
    data_file_name: Option<String>,
    products: Vec<Product>,
    epoch: u64,
}

impl CatalogueStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn image_pool(&self) -> &[Arc<ImageAsset>] {
        &self.image_pool
    }

    pub fn rows(&self) -> &[DataRow] {
        &self.rows
    }

    pub fn data_file_name(&self) -> Option<&str> {
        self.data_file_name.as_deref()
    }

    /// Pool images that no product currently refers to, in arrival order.
    pub fn unmatched_images(&self) -> Vec<&Arc<ImageAsset>> {
        let used: HashSet<&str> = self.products.iter().filter_map(Product::image_filename).collect();
        let mut seen = HashSet::new();
        let mut stranded = Vec::new();
        for img in &self.image_pool {
            let name = img.filename.as_str();
            if !used.contains(name) && seen.insert(name) {
                stranded.push(img);
            }
        }
        stranded
    }

    // -----------------------------------------------------------------------
    // Images + data
    // -----------------------------------------------------------------------

    /// Append a batch to the pool and reconcile only that batch against the
    /// current rows and products.
    pub fn add_images(&mut self, batch: Vec<ImageAsset>) -> Vec<ProductId> {
        let batch: Vec<Arc<ImageAsset>> = batch.into_iter().map(Arc::new).collect();
        self.image_pool.extend(batch.iter().cloned());

        let created = reconcile(&batch, &self.rows, &self.products);
        let ids: Vec<ProductId> = created.iter().map(|p| p.id).collect();
        self.products.extend(created);

        tracing::info!(
            images = batch.len(),
            pool = self.image_pool.len(),
            created = ids.len(),
            "added images"
        );
        ids
    }

    pub fn begin_data_load(&self) -> LoadTicket {
        LoadTicket { epoch: self.epoch }
    }

    /// Apply the outcome of parsing a data file.
    ///
    /// On success the row set is replaced wholesale, every product whose
    /// image filename is in the pool is discarded, and the whole pool is
    /// reconciled afresh. On failure nothing changes.
    pub fn complete_data_load(
        &mut self,
        ticket: LoadTicket,
        file_name: impl Into<String>,
        parsed: Result<Vec<DataRow>, DataFileParseError>,
    ) -> Result<LoadOutcome, CatalogueError> {
        if ticket.epoch != self.epoch {
            tracing::warn!(
                started = ticket.epoch,
                current = self.epoch,
                "discarding data file load that finished after a reset"
            );
            return Ok(LoadOutcome::Stale);
        }

        let rows = parsed.map_err(|e| {
            tracing::warn!(error = %e, "data file load failed, keeping previous rows");
            e
        })?;

        self.rows = rows;
        self.data_file_name = Some(file_name.into());

        let pool_names: HashSet<&str> = self.image_pool.iter().map(|img| img.filename.as_str()).collect();
        let before = self.products.len();
        self.products
            .retain(|p| p.image_filename().map_or(true, |name| !pool_names.contains(name)));
        let purged = before - self.products.len();

        let created = reconcile(&self.image_pool, &self.rows, &[]);
        let created_count = created.len();
        self.products.extend(created);

        tracing::info!(
            file = self.data_file_name.as_deref().unwrap_or_default(),
            rows = self.rows.len(),
            purged,
            created = created_count,
            "loaded data file"
        );

        Ok(LoadOutcome::Applied {
            rows: self.rows.len(),
            purged,
            created: created_count,
        })
    }

    /// Synchronous convenience for callers that already hold parsed rows.
    pub fn load_rows(
        &mut self,
        file_name: impl Into<String>,
        parsed: Result<Vec<DataRow>, DataFileParseError>,
    ) -> Result<LoadOutcome, CatalogueError> {
        let ticket = self.begin_data_load();
        self.complete_data_load(ticket, file_name, parsed)
    }

    // -----------------------------------------------------------------------
    // Product edits
    // -----------------------------------------------------------------------

    pub fn add_manual_product(&mut self, entry: ManualProduct) -> Result<ProductId, ValidationError> {
        if entry.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }

        let product = Product {
            id: ProductId::generate(),
            image: entry.image,
            title: entry.title,
            price: entry.price,
            material: entry.material,
            description: entry.description,
            source: ProductSource::Manual,
        };
        let id = product.id;
        self.products.push(product);
        tracing::debug!(%id, "added manual product");
        Ok(id)
    }

    pub fn remove_product(&mut self, id: ProductId) -> Option<Product> {
        let idx = self.products.iter().position(|p| p.id == id)?;
        Some(self.products.remove(idx))
    }

    pub fn update_product_fields(&mut self, id: ProductId, patch: ProductPatch) -> Result<(), CatalogueError> {
        let product = self.product_mut(id)?;
        patch.apply(product);
        Ok(())
    }

    pub fn replace_product_image(&mut self, id: ProductId, image: ImageAsset) -> Result<(), CatalogueError> {
        let product = self.product_mut(id)?;
        product.image = Some(Arc::new(image));
        Ok(())
    }

    /// Move the product at `from` so it ends up at `to`; everything else
    /// keeps its relative order.
    pub fn reorder_product(&mut self, from: usize, to: usize) -> Result<(), CatalogueError> {
        let len = self.products.len();
        for index in [from, to] {
            if index >= len {
                return Err(CatalogueError::IndexOutOfRange { index, len });
            }
        }
        let moved = self.products.remove(from);
        self.products.insert(to, moved);
        Ok(())
    }

    /// Drop every collection and invalidate in-flight loads.
    pub fn reset_all(&mut self) {
        self.image_pool.clear();
        self.rows.clear();
        self.data_file_name = None;
        self.products.clear();
        self.epoch += 1;
        tracing::info!(epoch = self.epoch, "session reset");
    }

    fn product_mut(&mut self, id: ProductId) -> Result<&mut Product, CatalogueError> {
        self.products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(CatalogueError::UnknownProduct(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn img(name: &str) -> ImageAsset {
        ImageAsset::new(name, "image/jpeg", vec![7u8; 8])
    }

    fn row(key: &str, title: &str, price: &str) -> DataRow {
        DataRow {
            image_key: key.into(),
            title: title.into(),
            price: price.into(),
            ..Default::default()
        }
    }

    fn titles(store: &CatalogueStore) -> Vec<&str> {
        store.products().iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn images_without_data_become_manual_products() {
        let mut store = CatalogueStore::new();
        store.add_images(vec![img("chair.jpg")]);
        let p = &store.products()[0];
        assert_eq!(p.title, "chair");
        assert_eq!(p.source, ProductSource::Manual);
        assert_eq!(p.price, "");
    }

    #[test]
    fn rows_then_images_match() {
        let mut store = CatalogueStore::new();
        store.load_rows("data.csv", Ok(vec![row("chair.jpg", "Oak Chair", "2500")])).unwrap();
        assert!(store.products().is_empty());

        store.add_images(vec![img("chair.jpg")]);
        let p = &store.products()[0];
        assert_eq!(p.title, "Oak Chair");
        assert_eq!(p.price, "2500");
        assert_eq!(p.source, ProductSource::Matched);
    }

    #[test]
    fn re_adding_an_image_is_idempotent() {
        let mut store = CatalogueStore::new();
        store.add_images(vec![img("a.jpg")]);
        let created = store.add_images(vec![img("a.jpg")]);
        assert!(created.is_empty());
        assert_eq!(store.products().len(), 1);
        assert_eq!(store.image_pool().len(), 2);
    }

    #[test]
    fn failed_load_changes_nothing() {
        let mut store = CatalogueStore::new();
        store.load_rows("first.csv", Ok(vec![row("a.jpg", "A", "")])).unwrap();
        store.add_images(vec![img("a.jpg")]);

        let err = store
            .load_rows("broken.xlsx", Err(DataFileParseError::new("broken.xlsx", "not a zip")))
            .unwrap_err();
        assert!(matches!(err, CatalogueError::DataFileParse(_)));
        assert_eq!(store.data_file_name(), Some("first.csv"));
        assert_eq!(store.rows().len(), 1);
        assert_eq!(titles(&store), vec!["A"]);
    }

    #[test]
    fn reload_replaces_rows_and_rederives_pool_products() {
        let mut store = CatalogueStore::new();
        store.add_images(vec![img("a.jpg"), img("b.jpg")]);
        assert_eq!(titles(&store), vec!["a", "b"]);

        let outcome = store
            .load_rows("v1.csv", Ok(vec![row("b.jpg", "Bee", "10"), row("c.jpg", "Sea", "")]))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Applied { rows: 2, purged: 2, created: 1 });
        assert_eq!(titles(&store), vec!["Bee"]);

        store.load_rows("v2.csv", Ok(vec![row("a.jpg", "Ay", "5")])).unwrap();
        assert_eq!(store.rows().len(), 1);
        assert_eq!(titles(&store), vec!["Ay"]);
        assert_eq!(store.data_file_name(), Some("v2.csv"));
    }

    #[test]
    fn reload_keeps_manual_products_outside_the_pool() {
        let mut store = CatalogueStore::new();
        store
            .add_manual_product(ManualProduct {
                image: Some(Arc::new(img("studio.png"))),
                title: "Studio Desk".into(),
                ..Default::default()
            })
            .unwrap();
        store
            .add_manual_product(ManualProduct {
                title: "No Picture".into(),
                ..Default::default()
            })
            .unwrap();
        store.add_images(vec![img("a.jpg")]);

        store.load_rows("data.csv", Ok(vec![row("a.jpg", "Ay", "")])).unwrap();
        assert_eq!(titles(&store), vec!["Studio Desk", "No Picture", "Ay"]);
    }

    #[test]
    fn edits_are_lost_for_pool_products_on_reload() {
        let mut store = CatalogueStore::new();
        let ids = store.add_images(vec![img("a.jpg")]);
        store
            .update_product_fields(ids[0], ProductPatch { title: Some("Edited".into()), ..Default::default() })
            .unwrap();
        store.load_rows("data.csv", Ok(vec![row("a.jpg", "From Sheet", "")])).unwrap();
        assert_eq!(titles(&store), vec!["From Sheet"]);
        assert!(store.product(ids[0]).is_none());
    }

    #[test]
    fn stranded_images_are_retried_only_on_reload() {
        let mut store = CatalogueStore::new();
        store.load_rows("v1.csv", Ok(vec![row("a.jpg", "A", "")])).unwrap();
        store.add_images(vec![img("late.jpg")]);
        assert!(store.products().is_empty());
        assert_eq!(store.unmatched_images().len(), 1);

        store.add_images(vec![img("a.jpg")]);
        assert_eq!(titles(&store), vec!["A"]);

        store
            .load_rows("v2.csv", Ok(vec![row("a.jpg", "A", ""), row("late.jpg", "Late", "")]))
            .unwrap();
        // Pool order decides: late.jpg arrived first.
        assert_eq!(titles(&store), vec!["Late", "A"]);
        assert!(store.unmatched_images().is_empty());
    }

    #[test]
    fn reload_with_no_rows_falls_back_to_image_titles() {
        let mut store = CatalogueStore::new();
        store.load_rows("v1.csv", Ok(vec![row("a.jpg", "A", "")])).unwrap();
        store.add_images(vec![img("a.jpg"), img("b.jpg")]);
        assert_eq!(titles(&store), vec!["A"]);

        store.load_rows("empty.csv", Ok(vec![])).unwrap();
        assert_eq!(titles(&store), vec!["a", "b"]);
    }

    #[test]
    fn manual_entry_requires_title() {
        let mut store = CatalogueStore::new();
        let err = store
            .add_manual_product(ManualProduct { title: "   ".into(), ..Default::default() })
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingTitle);
        assert!(store.products().is_empty());
    }

    #[test]
    fn update_and_replace_image() {
        let mut store = CatalogueStore::new();
        let ids = store.add_images(vec![img("a.jpg")]);
        store
            .update_product_fields(
                ids[0],
                ProductPatch {
                    price: Some("99".into()),
                    material: Some("Teak".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        store.replace_product_image(ids[0], img("a-v2.jpg")).unwrap();

        let p = store.product(ids[0]).unwrap();
        assert_eq!(p.title, "a");
        assert_eq!(p.price, "99");
        assert_eq!(p.material, "Teak");
        assert_eq!(p.image_filename(), Some("a-v2.jpg"));
    }

    #[test]
    fn unknown_product_is_an_error() {
        let mut store = CatalogueStore::new();
        let ghost = ProductId::generate();
        assert_eq!(
            store.update_product_fields(ghost, ProductPatch::default()),
            Err(CatalogueError::UnknownProduct(ghost))
        );
        assert!(store.remove_product(ghost).is_none());
    }

    #[test]
    fn remove_product() {
        let mut store = CatalogueStore::new();
        let ids = store.add_images(vec![img("a.jpg"), img("b.jpg")]);
        let removed = store.remove_product(ids[0]).unwrap();
        assert_eq!(removed.title, "a");
        assert_eq!(titles(&store), vec!["b"]);
        // Still in the pool, just not listed.
        assert_eq!(store.unmatched_images()[0].filename, "a.jpg");
    }

    #[test]
    fn reorder_moves_one_entry() {
        let mut store = CatalogueStore::new();
        store.add_images(vec![img("a.jpg"), img("b.jpg"), img("c.jpg"), img("d.jpg")]);
        store.reorder_product(0, 2).unwrap();
        assert_eq!(titles(&store), vec!["b", "c", "a", "d"]);
        store.reorder_product(3, 0).unwrap();
        assert_eq!(titles(&store), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn reorder_out_of_range_leaves_list_alone() {
        let mut store = CatalogueStore::new();
        store.add_images(vec![img("a.jpg"), img("b.jpg")]);
        assert_eq!(
            store.reorder_product(0, 2),
            Err(CatalogueError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(titles(&store), vec!["a", "b"]);
    }

    #[test]
    fn reset_clears_everything() {
        let mut store = CatalogueStore::new();
        store.load_rows("data.csv", Ok(vec![row("a.jpg", "A", "")])).unwrap();
        store.add_images(vec![img("a.jpg")]);
        store.reset_all();
        assert!(store.products().is_empty());
        assert!(store.image_pool().is_empty());
        assert!(store.rows().is_empty());
        assert!(store.data_file_name().is_none());

        // Back on the fallback path.
        store.add_images(vec![img("a.jpg")]);
        assert_eq!(titles(&store), vec!["a"]);
    }

    #[test]
    fn load_finishing_after_reset_is_discarded() {
        let mut store = CatalogueStore::new();
        store.add_images(vec![img("a.jpg")]);
        let ticket = store.begin_data_load();
        store.reset_all();

        let outcome = store
            .complete_data_load(ticket, "late.csv", Ok(vec![row("a.jpg", "A", "")]))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Stale);
        assert!(store.rows().is_empty());
        assert!(store.data_file_name().is_none());
    }
}
