//! Core library for stacking product images into one long detail page.
//!
//! - Ingestion: `WorkingSet` deduplicates uploads by content fingerprint and expands zip archives
//! - Normalization: decode to a still frame, coerce to RGB, resize to a fixed canvas width
//! - Layout: absolute vertical offsets with top/bottom padding and a uniform gap
//! - Partitioning: bounded groups, each with its own layout, one Photoshop script per group
//! - Output: one composite JPEG for the whole sequence plus a deterministic zip bundle
//!
//! Quick example:
//! ```ignore
//! use longpage_core::{BuildConfig, WorkingSet, build};
//! # fn main() -> anyhow::Result<()> {
//! let cfg = BuildConfig::default();
//! let mut set = WorkingSet::new(cfg.max_total);
//! let report = set.ingest(vec![
//!     ("a.jpg", std::fs::read("a.jpg")?),
//!     ("b.png", std::fs::read("b.png")?),
//! ]);
//! println!("added {}, rejected {}", report.added, report.rejected());
//! let out = build(set.snapshot(), "spring_sale", &cfg)?;
//! std::fs::write("spring_sale_bundle.zip", out.archive_bytes()?)?;
//! # Ok(()) }
//! ```

pub mod archive;
pub mod bundle;
pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod model;
pub mod normalize;
pub mod partition;
pub mod pipeline;
pub mod script;
pub mod working_set;

pub use config::*;
pub use error::*;
pub use export::*;
pub use layout::*;
pub use model::*;
pub use pipeline::*;
pub use working_set::*;

/// Convenience prelude for common types and functions.
/// Importing `longpage_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::bundle::{Bundle, PartitionNames};
    pub use crate::config::{AlphaPolicy, BuildConfig, BuildConfigBuilder, Spacing};
    pub use crate::layout::{LayoutPlan, Placement, plan_layout};
    pub use crate::model::{Fingerprint, ImageAsset, NormalizedImage};
    pub use crate::partition::{Partition, partition, split_ranges};
    pub use crate::script::{ScriptDocument, ScriptRequest, emit_script};
    pub use crate::working_set::{AddOutcome, IngestReport, WorkingSet};
    pub use crate::{BuildOutput, BuildSummary, LongPageError, build};
}
