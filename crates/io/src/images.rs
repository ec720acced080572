// Image ingestion from disk

use std::fs;
use std::path::{Path, PathBuf};

use vitrine_core::ImageAsset;

use crate::error::IoError;

/// `image/*` media type guessed from the extension, if any.
pub fn image_media_type(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .filter(|m| m.type_() == mime_guess::mime::IMAGE)
        .map(|m| m.essence_str().to_string())
}

/// Read a single image. Non-image files are rejected.
pub fn load_image(path: &Path) -> Result<ImageAsset, IoError> {
    let media_type = image_media_type(path).ok_or_else(|| IoError::NotAnImage(path.to_path_buf()))?;
    let bytes = fs::read(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(ImageAsset::new(filename, media_type, bytes))
}

/// Read an upload batch.
///
/// Directories contribute their direct children in filename order. Files
/// that are not images are skipped, the way a drop zone filters by MIME
/// type; files that are images but cannot be read are errors.
pub fn load_images(paths: &[PathBuf]) -> Result<Vec<ImageAsset>, IoError> {
    let mut images = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut children: Vec<PathBuf> = fs::read_dir(path)
                .map_err(|source| IoError::Read {
                    path: path.clone(),
                    source,
                })?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file())
                .collect();
            children.sort();
            for child in children {
                push_if_image(&child, &mut images)?;
            }
        } else {
            push_if_image(path, &mut images)?;
        }
    }
    Ok(images)
}

fn push_if_image(path: &Path, images: &mut Vec<ImageAsset>) -> Result<(), IoError> {
    if image_media_type(path).is_none() {
        tracing::warn!(path = %path.display(), "skipping non-image file");
        return Ok(());
    }
    images.push(load_image(path)?);
    Ok(())
}
