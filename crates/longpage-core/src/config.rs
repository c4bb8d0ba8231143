//! Build configuration for a detail page.
//! Key notes:
//!   - `canvas_width` is the width every asset, the composite and each script document share
//!   - `max_per_group` bounds how many images a single script places; `max_groups` bounds how many scripts a build may emit
//!   - `max_total` is the ingestion ceiling enforced by the working set, not by the layout engine

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How transparent pixels are turned into the fixed 3-channel output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlphaPolicy {
    /// Composite onto the opaque background colour.
    Flatten,
    /// Drop the alpha channel and keep the stored colour values.
    Discard,
}

impl FromStr for AlphaPolicy {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flatten" | "white" => Ok(Self::Flatten),
            "discard" | "drop" => Ok(Self::Discard),
            _ => Err(()),
        }
    }
}

/// Vertical spacing around and between stacked images (pixels).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Spacing {
    pub top: u32,
    pub bottom: u32,
    pub gap: u32,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            top: 180,
            bottom: 250,
            gap: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Fixed output width in pixels.
    pub canvas_width: u32,
    /// Top/bottom padding and inter-image gap.
    #[serde(default)]
    pub spacing: Spacing,

    /// Maximum images placed by one script document.
    pub max_per_group: usize,
    /// Maximum number of script documents per build.
    #[serde(default = "default_max_groups")]
    pub max_groups: usize,
    /// Maximum images the working set accepts.
    pub max_total: usize,

    /// JPEG quality (1..=100) for the composite and the resized assets.
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Policy for sources carrying an alpha channel.
    #[serde(default = "default_alpha_policy")]
    pub alpha_policy: AlphaPolicy,
    /// Canvas fill and flatten colour.
    #[serde(default = "default_background")]
    pub background: [u8; 3],

    /// Largest single `translate` step the emitted script performs.
    #[serde(default = "default_max_translate_step")]
    pub max_translate_step: u32,

    /// Normalize images on rayon when feature "parallel" is on.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            canvas_width: 900,
            spacing: Spacing::default(),
            max_per_group: 10,
            max_groups: default_max_groups(),
            max_total: 20,
            jpeg_quality: default_jpeg_quality(),
            alpha_policy: default_alpha_policy(),
            background: default_background(),
            max_translate_step: default_max_translate_step(),
            parallel: false,
        }
    }
}

impl BuildConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - The canvas width is zero
    /// - Group sizes, the translate step or the JPEG quality are out of range
    /// - `max_total` could produce more groups than `max_groups` allows
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::LongPageError;

        if self.canvas_width == 0 {
            return Err(LongPageError::InvalidDimensions {
                width: self.canvas_width,
            });
        }
        if self.max_per_group == 0 {
            return Err(LongPageError::InvalidConfig(
                "max_per_group must be at least 1".into(),
            ));
        }
        if self.max_groups == 0 {
            return Err(LongPageError::InvalidConfig(
                "max_groups must be at least 1".into(),
            ));
        }
        if self.max_translate_step == 0 {
            return Err(LongPageError::InvalidConfig(
                "max_translate_step must be at least 1".into(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(LongPageError::InvalidConfig(format!(
                "jpeg_quality ({}) must be within 1..=100",
                self.jpeg_quality
            )));
        }
        let capacity = self.max_per_group.saturating_mul(self.max_groups);
        if self.max_total > capacity {
            return Err(LongPageError::InvalidConfig(format!(
                "max_total ({}) exceeds max_groups ({}) * max_per_group ({})",
                self.max_total, self.max_groups, self.max_per_group
            )));
        }
        Ok(())
    }
}

fn default_max_groups() -> usize {
    2
}
fn default_jpeg_quality() -> u8 {
    95
}
fn default_alpha_policy() -> AlphaPolicy {
    AlphaPolicy::Flatten
}
fn default_background() -> [u8; 3] {
    [255, 255, 255]
}
fn default_max_translate_step() -> u32 {
    crate::script::DEFAULT_MAX_TRANSLATE_STEP
}

/// Builder for `BuildConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct BuildConfigBuilder {
    cfg: BuildConfig,
}

impl BuildConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: BuildConfig::default(),
        }
    }
    pub fn canvas_width(mut self, v: u32) -> Self {
        self.cfg.canvas_width = v;
        self
    }
    pub fn spacing(mut self, top: u32, bottom: u32, gap: u32) -> Self {
        self.cfg.spacing = Spacing { top, bottom, gap };
        self
    }
    pub fn top_padding(mut self, v: u32) -> Self {
        self.cfg.spacing.top = v;
        self
    }
    pub fn bottom_padding(mut self, v: u32) -> Self {
        self.cfg.spacing.bottom = v;
        self
    }
    pub fn gap(mut self, v: u32) -> Self {
        self.cfg.spacing.gap = v;
        self
    }
    pub fn max_per_group(mut self, v: usize) -> Self {
        self.cfg.max_per_group = v;
        self
    }
    pub fn max_groups(mut self, v: usize) -> Self {
        self.cfg.max_groups = v;
        self
    }
    pub fn max_total(mut self, v: usize) -> Self {
        self.cfg.max_total = v;
        self
    }
    pub fn jpeg_quality(mut self, v: u8) -> Self {
        self.cfg.jpeg_quality = v;
        self
    }
    pub fn alpha_policy(mut self, v: AlphaPolicy) -> Self {
        self.cfg.alpha_policy = v;
        self
    }
    pub fn background(mut self, v: [u8; 3]) -> Self {
        self.cfg.background = v;
        self
    }
    pub fn max_translate_step(mut self, v: u32) -> Self {
        self.cfg.max_translate_step = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> BuildConfig {
        self.cfg
    }
}

impl BuildConfig {
    /// Create a fluent builder for `BuildConfig`.
    pub fn builder() -> BuildConfigBuilder {
        BuildConfigBuilder::new()
    }
}
