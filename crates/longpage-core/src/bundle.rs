use crate::config::BuildConfig;
use crate::error::Result;
use serde::Serialize;
use std::io::{Cursor, Write};
use zip::DateTime;
use zip::write::SimpleFileOptions;

pub const README_NAME: &str = "README.txt";

/// Partition-scoped names inside the bundle. Pure function of (base, count, number).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionNames {
    /// Document title and `.psd` base name.
    pub document: String,
    /// Folder holding the resized images.
    pub folder: String,
    /// Script file name.
    pub script: String,
}

impl PartitionNames {
    /// `number` is 1-based. A single partition uses unqualified names.
    pub fn for_partition(base: &str, count: usize, number: usize) -> Self {
        let (document, folder) = if count > 1 {
            (format!("{base}_part{number}"), format!("images_part{number}"))
        } else {
            (base.to_string(), "images".to_string())
        };
        Self {
            script: format!("{document}_psd_build.jsx"),
            document,
            folder,
        }
    }
}

/// `img_01.jpg`, `img_02.jpg`, ... (`number` is 1-based).
pub fn asset_file_name(number: usize) -> String {
    format!("img_{number:02}.jpg")
}

pub fn composite_file_name(base: &str) -> String {
    format!("{base}.jpg")
}

pub fn archive_file_name(base: &str) -> String {
    format!("{base}_bundle.zip")
}

/// Fixed usage note shipped with every bundle.
pub fn usage_note(cfg: &BuildConfig) -> String {
    let mut s = String::new();
    s.push_str("Detail page bundle\n\n");
    s.push_str("[Rules]\n");
    s.push_str("- JPG: every image stacked into one long image\n");
    s.push_str(&format!(
        "- PSD: one build script per {} images (split automatically, at most {} scripts)\n",
        cfg.max_per_group, cfg.max_groups
    ));
    s.push_str(&format!("- Maximum images per build: {}\n", cfg.max_total));
    s.push_str(&format!(
        "- Width {} px, top {} px, bottom {} px, gap {} px\n\n",
        cfg.canvas_width, cfg.spacing.top, cfg.spacing.bottom, cfg.spacing.gap
    ));
    s.push_str("[Contents]\n");
    s.push_str("1) <name>.jpg: the full detail page\n");
    s.push_str("2) *_psd_build.jsx: Photoshop scripts (images stay smart objects)\n");
    s.push_str("3) images/ or images_part1/, images_part2/, ...: resized images used by the scripts\n\n");
    s.push_str("[Building the PSD]\n");
    s.push_str("1) Extract the whole zip, keeping the folders next to the scripts\n");
    s.push_str("2) Start Photoshop (CS or later)\n");
    s.push_str("3) File > Scripts > Browse...\n");
    s.push_str("4) Run *_psd_build.jsx\n");
    s.push_str("5) The .psd is saved in the same folder\n");
    s
}

/// One archive member.
#[derive(Debug, Clone)]
pub struct BundleEntry {
    pub path: String,
    pub bytes: Vec<u8>,
}

/// Ordered archive content. Entry order is insertion order.
#[derive(Debug, Clone, Default)]
pub struct Bundle {
    pub entries: Vec<BundleEntry>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.push(BundleEntry {
            path: path.into(),
            bytes: bytes.into(),
        });
    }

    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.path.as_str()).collect()
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.bytes.as_slice())
    }

    /// Deflate-compressed zip with fixed timestamps; equal bundles give equal bytes.
    pub fn to_zip_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let fixed_time = DateTime::from_date_and_time(1980, 1, 1, 0, 0, 0)
            .map_err(|e| crate::error::LongPageError::Archive(e.to_string()))?;
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .last_modified_time(fixed_time)
            .unix_permissions(0o644);
        for entry in &self.entries {
            zip.start_file(entry.path.as_str(), options)?;
            zip.write_all(&entry.bytes)?;
        }
        Ok(zip.finish()?.into_inner())
    }
}
