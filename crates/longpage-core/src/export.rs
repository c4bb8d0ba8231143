use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// What a build produced, in numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildSummary {
    pub app: String,
    pub version: String,
    pub base_name: String,
    /// Images in the composite.
    pub count: usize,
    pub width: u32,
    /// Height of the composite.
    pub total_height: u32,
    pub top: u32,
    pub bottom: u32,
    pub gap: u32,
    /// Number of script documents.
    pub partitions: usize,
    pub partition_sizes: Vec<usize>,
    pub partition_heights: Vec<u32>,
    pub archive_entries: Vec<String>,
}

impl BuildSummary {
    /// One-line human-readable summary.
    pub fn describe(&self) -> String {
        let parts = if self.partitions == 1 {
            "1 script".to_string()
        } else {
            format!("{} scripts (split {:?})", self.partitions, self.partition_sizes)
        };
        format!(
            "{} images, {}x{} px, top {} / bottom {} / gap {} px, {}",
            self.count, self.width, self.total_height, self.top, self.bottom, self.gap, parts
        )
    }
}

/// Serializes a summary as `{ meta, layout, partitions, entries }`.
pub fn to_json_summary(summary: &BuildSummary) -> Value {
    let partitions: Vec<Value> = summary
        .partition_sizes
        .iter()
        .zip(&summary.partition_heights)
        .enumerate()
        .map(|(i, (count, height))| json!({"number": i + 1, "count": count, "height": height}))
        .collect();
    json!({
        "meta": {"app": summary.app, "version": summary.version, "name": summary.base_name},
        "layout": {
            "count": summary.count,
            "width": summary.width,
            "totalHeight": summary.total_height,
            "top": summary.top,
            "bottom": summary.bottom,
            "gap": summary.gap,
        },
        "partitions": partitions,
        "entries": summary.archive_entries,
    })
}
