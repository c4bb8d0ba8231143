use crate::bundle::{
    Bundle, PartitionNames, README_NAME, asset_file_name, composite_file_name, usage_note,
};
use crate::compositing::compose_long;
use crate::config::BuildConfig;
use crate::error::{LongPageError, Result};
use crate::export::BuildSummary;
use crate::layout::{LayoutPlan, plan_layout};
use crate::model::{ImageAsset, NormalizedImage};
use crate::normalize::{normalize_all, scaled_height};
use crate::partition::{Partition, partition};
use crate::script::{ScriptDocument, ScriptRequest, emit_script};
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

/// Largest image height a baseline JPEG can record.
pub const MAX_JPEG_HEIGHT: u32 = u16::MAX as u32;

/// Used when a requested base name sanitizes to nothing.
pub const DEFAULT_BASE_NAME: &str = "detail_page";

/// Output of one partition: its layout, names, encoded assets and script.
pub struct PartitionOutput {
    pub partition: Partition,
    pub names: PartitionNames,
    /// `(file name, JPEG bytes)` in placement order.
    pub files: Vec<(String, Vec<u8>)>,
    pub script: ScriptDocument,
}

/// Output of a build: the composite, per-partition artifacts and the bundle holding them all.
pub struct BuildOutput {
    pub base_name: String,
    pub plan: LayoutPlan,
    pub composite: RgbImage,
    pub composite_jpeg: Vec<u8>,
    pub partitions: Vec<PartitionOutput>,
    pub bundle: Bundle,
    pub summary: BuildSummary,
}

impl BuildOutput {
    /// Serializes the bundle as a zip archive.
    pub fn archive_bytes(&self) -> Result<Vec<u8>> {
        self.bundle.to_zip_bytes()
    }
}

#[instrument(skip_all, fields(count = assets.len()))]
/// Builds the composite, the per-partition scripts and the bundle from an ordered snapshot.
///
/// Notes:
/// - The composite always covers the whole sequence; only the scripts are split.
/// - Repeated fingerprints are dropped (first occurrence wins) even though a `WorkingSet` never holds any.
/// - Nothing is produced for an empty snapshot (`LongPageError::Empty`).
/// - A composite taller than [`MAX_JPEG_HEIGHT`] fails with `CanvasTooTall` before any canvas is allocated.
pub fn build(assets: &[ImageAsset], base_name: &str, cfg: &BuildConfig) -> Result<BuildOutput> {
    cfg.validate()?;

    if assets.is_empty() {
        return Err(LongPageError::Empty);
    }
    let base = sanitize_base_name(base_name);
    let unique = unique_by_fingerprint(assets);

    // geometry first: every size check runs before any pixel is resampled or painted
    let heights: Vec<u32> = unique
        .iter()
        .map(|a| scaled_height(a.width, a.height, cfg.canvas_width))
        .collect();
    let partitions = partition(&heights, cfg)?;
    let plan = plan_layout(cfg.canvas_width, &heights, cfg.spacing)?;
    if plan.total_height > MAX_JPEG_HEIGHT {
        return Err(LongPageError::CanvasTooTall {
            height: plan.total_height,
            max: MAX_JPEG_HEIGHT,
        });
    }

    let normalized = normalize_all(&unique, cfg);
    let composite = compose_long(&normalized, &plan, cfg.background)?;
    let composite_jpeg = encode_jpeg(&composite, cfg.jpeg_quality)?;
    debug!(
        height = plan.total_height,
        bytes = composite_jpeg.len(),
        "composite encoded"
    );

    let count = partitions.len();
    let mut outputs = Vec::with_capacity(count);
    for part in partitions {
        outputs.push(build_partition(part, count, &base, &normalized, cfg)?);
    }

    let mut bundle = Bundle::new();
    bundle.push(composite_file_name(&base), composite_jpeg.clone());
    bundle.push(README_NAME, usage_note(cfg));
    for out in &outputs {
        bundle.push(out.names.script.clone(), out.script.source.clone());
    }
    for out in &outputs {
        for (file, bytes) in &out.files {
            bundle.push(format!("{}/{}", out.names.folder, file), bytes.clone());
        }
    }

    let summary = BuildSummary {
        app: "longpage".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        base_name: base.clone(),
        count: normalized.len(),
        width: plan.width,
        total_height: plan.total_height,
        top: cfg.spacing.top,
        bottom: cfg.spacing.bottom,
        gap: cfg.spacing.gap,
        partitions: outputs.len(),
        partition_sizes: outputs.iter().map(|o| o.partition.len()).collect(),
        partition_heights: outputs
            .iter()
            .map(|o| o.partition.plan.total_height)
            .collect(),
        archive_entries: bundle.paths().into_iter().map(String::from).collect(),
    };

    Ok(BuildOutput {
        base_name: base,
        plan,
        composite,
        composite_jpeg,
        partitions: outputs,
        bundle,
        summary,
    })
}

fn build_partition(
    part: Partition,
    count: usize,
    base: &str,
    normalized: &[NormalizedImage],
    cfg: &BuildConfig,
) -> Result<PartitionOutput> {
    let names = PartitionNames::for_partition(base, count, part.number);
    let mut files = Vec::with_capacity(part.len());
    for (i, im) in normalized[part.range.clone()].iter().enumerate() {
        files.push((asset_file_name(i + 1), encode_jpeg(&im.rgb, cfg.jpeg_quality)?));
    }
    let file_names: Vec<String> = files.iter().map(|(name, _)| name.clone()).collect();
    let script = emit_script(&ScriptRequest {
        document_name: &names.document,
        folder: &names.folder,
        files: &file_names,
        plan: &part.plan,
        max_translate_step: cfg.max_translate_step,
        background: cfg.background,
    })?;
    debug!(
        number = part.number,
        images = part.len(),
        height = part.plan.total_height,
        "partition emitted"
    );
    Ok(PartitionOutput {
        partition: part,
        names,
        files,
        script,
    })
}

fn unique_by_fingerprint(assets: &[ImageAsset]) -> Vec<&ImageAsset> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(assets.len());
    for asset in assets {
        if seen.insert(&asset.fingerprint) {
            out.push(asset);
        } else {
            warn!(name = %asset.name, "duplicate image dropped from build");
        }
    }
    out
}

/// Encodes RGB pixels as a baseline JPEG. The encoder keeps full-resolution chroma (4:4:4).
pub fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
        encoder
            .encode_image(img)
            .map_err(|e| LongPageError::Encode(e.to_string()))?;
    }
    Ok(buf)
}

/// Turns user input into a safe base name: whitespace runs become `_`, only ASCII
/// alphanumerics, `_`, `-` and Hangul syllables are kept, at most 80 characters.
pub fn sanitize_base_name(raw: &str) -> String {
    let mut out = String::new();
    let mut in_space = false;
    for ch in raw.trim().chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || is_hangul_syllable(ch) {
            out.push(ch);
        }
    }
    let out: String = out.chars().take(80).collect();
    if out.is_empty() {
        DEFAULT_BASE_NAME.to_string()
    } else {
        out
    }
}

fn is_hangul_syllable(ch: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&ch)
}
