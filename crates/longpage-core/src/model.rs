use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Content fingerprint of a raw upload (SHA-256 over the bytes, lowercase hex).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint raw bytes. Decoded pixels never take part.
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Fingerprint(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One logical input image. Immutable once created; reordering moves it, never edits it.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub fingerprint: Fingerprint,
    /// Display name (file name as uploaded or as found in an archive).
    pub name: String,
    /// Raw payload the fingerprint was computed from.
    pub bytes: Vec<u8>,
    /// Decoded still frame (first frame for animations).
    pub image: DynamicImage,
    /// Original pixel size.
    pub width: u32,
    pub height: u32,
    /// Lowercase extension hint without the dot.
    pub ext: String,
}

impl ImageAsset {
    /// Decodes `bytes` and wraps them as an asset.
    pub fn from_bytes(name: &str, bytes: Vec<u8>) -> crate::error::Result<Self> {
        let fingerprint = Fingerprint::of(&bytes);
        Self::with_fingerprint(fingerprint, name, bytes)
    }

    /// Like `from_bytes` for callers that already fingerprinted the payload.
    pub fn with_fingerprint(
        fingerprint: Fingerprint,
        name: &str,
        bytes: Vec<u8>,
    ) -> crate::error::Result<Self> {
        let image = crate::normalize::decode_still(name, &bytes)?;
        Ok(Self {
            fingerprint,
            name: name.to_string(),
            width: image.width(),
            height: image.height(),
            ext: ext_hint(name),
            bytes,
            image,
        })
    }
}

fn ext_hint(name: &str) -> String {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| "jpg".to_string())
}

/// Width-normalized RGB view of an asset, rebuilt on every build.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub key: String,
    pub rgb: RgbImage,
}

impl NormalizedImage {
    pub fn width(&self) -> u32 {
        self.rgb.width()
    }
    pub fn height(&self) -> u32 {
        self.rgb.height()
    }
}
