use std::collections::HashSet;
use std::sync::Arc;

use crate::model::{DataRow, ImageAsset, Product};

/// Turn newly available images into products.
///
/// Filenames already carried by `existing` are never reused, nor is a
/// filename repeated within `new_images`. With rows present, an image
/// becomes a `Matched` product only if some row's image key equals its
/// filename exactly (first such row wins); unmatched images produce
/// nothing. With no rows at all, every unused image becomes a `Manual`
/// product titled after its filename stem.
pub fn reconcile(
    new_images: &[Arc<ImageAsset>],
    active_rows: &[DataRow],
    existing: &[Product],
) -> Vec<Product> {
    let mut used: HashSet<&str> = existing.iter().filter_map(Product::image_filename).collect();
    let mut created = Vec::new();

    for image in new_images {
        if used.contains(image.filename.as_str()) {
            continue;
        }

        if active_rows.is_empty() {
            created.push(Product::from_image(Arc::clone(image)));
            used.insert(&image.filename);
            continue;
        }

        if let Some(row) = active_rows.iter().find(|row| row.image_key == image.filename) {
            created.push(Product::matched(Arc::clone(image), row));
            used.insert(&image.filename);
        }
    }

    tracing::debug!(
        scanned = new_images.len(),
        rows = active_rows.len(),
        created = created.len(),
        "reconciled image batch"
    );

    created
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProductSource;

    fn img(name: &str) -> Arc<ImageAsset> {
        Arc::new(ImageAsset::new(name, "image/jpeg", vec![1u8, 2, 3]))
    }

    fn row(key: &str, title: &str, price: &str) -> DataRow {
        DataRow {
            image_key: key.into(),
            title: title.into(),
            price: price.into(),
            ..Default::default()
        }
    }

    #[test]
    fn exact_match_copies_row_fields() {
        let rows = vec![DataRow {
            image_key: "chair.jpg".into(),
            title: "Oak Chair".into(),
            material: "Oak".into(),
            description: "Solid".into(),
            price: "2500".into(),
        }];
        let out = reconcile(&[img("chair.jpg")], &rows, &[]);
        assert_eq!(out.len(), 1);
        let p = &out[0];
        assert_eq!(p.source, ProductSource::Matched);
        assert_eq!(p.title, "Oak Chair");
        assert_eq!(p.material, "Oak");
        assert_eq!(p.description, "Solid");
        assert_eq!(p.price, "2500");
        assert_eq!(p.image_filename(), Some("chair.jpg"));
    }

    #[test]
    fn match_is_case_sensitive_and_full_string() {
        let rows = vec![row("Chair.jpg", "A", ""), row("chair", "B", "")];
        let out = reconcile(&[img("chair.jpg")], &rows, &[]);
        assert!(out.is_empty());
    }

    #[test]
    fn first_matching_row_wins() {
        let rows = vec![row("a.jpg", "First", "1"), row("a.jpg", "Second", "2")];
        let out = reconcile(&[img("a.jpg")], &rows, &[]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "First");
    }

    #[test]
    fn unmatched_images_are_left_out_when_rows_exist() {
        let rows = vec![row("a.jpg", "A", "")];
        let out = reconcile(&[img("a.jpg"), img("b.jpg")], &rows, &[]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].image_filename(), Some("a.jpg"));
    }

    #[test]
    fn fallback_without_rows() {
        let out = reconcile(&[img("chair.jpg"), img("desk.v2.png")], &[], &[]);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|p| p.source == ProductSource::Manual));
        assert_eq!(out[0].title, "chair");
        assert_eq!(out[1].title, "desk.v2");
        assert!(out.iter().all(|p| p.price.is_empty() && p.material.is_empty() && p.description.is_empty()));
    }

    #[test]
    fn existing_filenames_are_skipped() {
        let rows = vec![row("a.jpg", "A", "")];
        let first = reconcile(&[img("a.jpg")], &rows, &[]);
        let second = reconcile(&[img("a.jpg")], &rows, &first);
        assert!(second.is_empty());

        let fallback = reconcile(&[img("a.jpg")], &[], &first);
        assert!(fallback.is_empty());
    }

    #[test]
    fn duplicate_within_batch_yields_one_product() {
        let out = reconcile(&[img("a.jpg"), img("a.jpg")], &[], &[]);
        assert_eq!(out.len(), 1);

        let rows = vec![row("a.jpg", "A", "")];
        let out = reconcile(&[img("a.jpg"), img("a.jpg")], &rows, &[]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn ids_are_unique() {
        let out = reconcile(&[img("a.jpg"), img("b.jpg"), img("c.jpg")], &[], &[]);
        assert_ne!(out[0].id, out[1].id);
        assert_ne!(out[1].id, out[2].id);
        assert_ne!(out[0].id, out[2].id);
    }
}
