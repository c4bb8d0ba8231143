use crate::error::Result;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::debug;

/// Extensions accepted as image uploads (lowercase, no dot).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

pub fn is_image_filename(name: &str) -> bool {
    matches!(
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str())
    )
}

pub fn is_zip_filename(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".zip")
}

/// Expands a zip upload into a flat `(file name, bytes)` list of image entries.
///
/// Directories and non-image entries are skipped; entry paths are reduced to their
/// base name. Archive order is preserved.
pub fn extract_images(zip_bytes: &[u8]) -> Result<Vec<(String, Vec<u8>)>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(zip_bytes))?;
    let mut out = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let full = entry.name().to_string();
        if !is_image_filename(&full) {
            debug!(entry = %full, "skip non-image archive entry");
            continue;
        }
        let base = full
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(full.as_str())
            .to_string();
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut buf)?;
        out.push((base, buf));
    }
    Ok(out)
}
