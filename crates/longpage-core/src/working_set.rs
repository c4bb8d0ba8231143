use crate::archive::{extract_images, is_zip_filename};
use crate::error::{LongPageError, Result};
use crate::model::{Fingerprint, ImageAsset};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Result of offering one payload to the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// Same bytes are already in the set; nothing changed.
    Duplicate,
}

/// Per-batch ingestion counters. Every rejected payload lands in exactly one bucket.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub added: usize,
    pub duplicates: usize,
    pub over_limit: usize,
    /// `(name, reason)` for payloads that could not be decoded or unpacked.
    pub failed: Vec<(String, String)>,
}

impl IngestReport {
    pub fn rejected(&self) -> usize {
        self.duplicates + self.over_limit + self.failed.len()
    }
}

/// Ordered, fingerprint-unique list of uploaded images.
///
/// The caller owns and mutates it between builds; a build only ever sees
/// [`WorkingSet::snapshot`].
#[derive(Debug, Clone)]
pub struct WorkingSet {
    max_total: usize,
    items: Vec<ImageAsset>,
    seen: HashSet<Fingerprint>,
}

impl WorkingSet {
    pub fn new(max_total: usize) -> Self {
        Self {
            max_total,
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn max_total(&self) -> usize {
        self.max_total
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.max_total.saturating_sub(self.items.len())
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.seen.contains(fingerprint)
    }

    /// Offers one image payload.
    ///
    /// Checks run in order: duplicate fingerprint (not an error), capacity, decode.
    pub fn add(&mut self, name: &str, bytes: Vec<u8>) -> Result<AddOutcome> {
        let fingerprint = Fingerprint::of(&bytes);
        if self.seen.contains(&fingerprint) {
            debug!(name, %fingerprint, "duplicate upload ignored");
            return Ok(AddOutcome::Duplicate);
        }
        if self.remaining() == 0 {
            return Err(LongPageError::CapacityExceeded {
                limit: self.max_total,
            });
        }
        let asset = ImageAsset::with_fingerprint(fingerprint, name, bytes)?;
        self.seen.insert(asset.fingerprint.clone());
        self.items.push(asset);
        Ok(AddOutcome::Added)
    }

    /// Offers one upload; zip archives are expanded and each image entry is offered in turn.
    pub fn add_upload(&mut self, name: &str, bytes: Vec<u8>, report: &mut IngestReport) {
        if is_zip_filename(name) {
            match extract_images(&bytes) {
                Ok(entries) => {
                    for (entry_name, entry_bytes) in entries {
                        self.offer(&entry_name, entry_bytes, report);
                    }
                }
                Err(e) => {
                    warn!(name, error = %e, "skip archive");
                    report.failed.push((name.to_string(), e.to_string()));
                }
            }
        } else {
            self.offer(name, bytes, report);
        }
    }

    fn offer(&mut self, name: &str, bytes: Vec<u8>, report: &mut IngestReport) {
        match self.add(name, bytes) {
            Ok(AddOutcome::Added) => report.added += 1,
            Ok(AddOutcome::Duplicate) => report.duplicates += 1,
            Err(LongPageError::CapacityExceeded { limit }) => {
                debug!(name, limit, "working set full");
                report.over_limit += 1;
            }
            Err(e) => {
                warn!(name, error = %e, "skip image");
                report.failed.push((name.to_string(), e.to_string()));
            }
        }
    }

    /// Offers a batch of uploads. One bad payload never stops the rest.
    pub fn ingest<I, S>(&mut self, uploads: I) -> IngestReport
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: AsRef<str>,
    {
        let mut report = IngestReport::default();
        for (name, bytes) in uploads {
            self.add_upload(name.as_ref(), bytes, &mut report);
        }
        report
    }

    /// Clears the set, then ingests `uploads`.
    pub fn replace_with<I, S>(&mut self, uploads: I) -> IngestReport
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: AsRef<str>,
    {
        self.clear();
        self.ingest(uploads)
    }

    /// Removes the asset at `index` and releases its fingerprint.
    pub fn remove(&mut self, index: usize) -> Option<ImageAsset> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        self.seen.remove(&removed.fingerprint);
        Some(removed)
    }

    pub fn remove_fingerprint(&mut self, fingerprint: &Fingerprint) -> Option<ImageAsset> {
        let index = self
            .items
            .iter()
            .position(|a| &a.fingerprint == fingerprint)?;
        self.remove(index)
    }

    /// Swaps two positions. Returns false when either index is out of range.
    pub fn swap(&mut self, a: usize, b: usize) -> bool {
        if a >= self.items.len() || b >= self.items.len() {
            return false;
        }
        self.items.swap(a, b);
        true
    }

    pub fn move_up(&mut self, index: usize) -> bool {
        index > 0 && self.swap(index - 1, index)
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        self.swap(index, index + 1)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.seen.clear();
    }

    /// Read-only view handed to a build.
    pub fn snapshot(&self) -> &[ImageAsset] {
        &self.items
    }
}
