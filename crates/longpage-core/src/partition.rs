use crate::config::BuildConfig;
use crate::error::{LongPageError, Result};
use crate::layout::{LayoutPlan, plan_layout};
use serde::Serialize;
use std::ops::Range;

/// Contiguous slice of the full sequence with its own layout.
#[derive(Debug, Clone, Serialize)]
pub struct Partition {
    /// 1-based partition number.
    pub number: usize,
    /// Indices into the full sequence.
    pub range: Range<usize>,
    /// Offsets restart at the top padding.
    pub plan: LayoutPlan,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Splits `n` items into contiguous ranges of at most `max_per_group`.
///
/// `n <= max_per_group` gives a single range. Larger sequences give `ceil(n / max_per_group)`
/// ranges, all full except the last. More than `max_groups` ranges is an error, never a silent
/// extra group.
pub fn split_ranges(n: usize, max_per_group: usize, max_groups: usize) -> Result<Vec<Range<usize>>> {
    if n == 0 {
        return Err(LongPageError::Empty);
    }
    if max_per_group == 0 {
        return Err(LongPageError::InvalidConfig(
            "max_per_group must be at least 1".into(),
        ));
    }
    let groups = n.div_ceil(max_per_group);
    if groups > max_groups {
        return Err(LongPageError::GroupLimitExceeded {
            count: n,
            max_per_group,
            max_groups,
        });
    }
    Ok((0..groups)
        .map(|g| {
            let start = g * max_per_group;
            start..(start + max_per_group).min(n)
        })
        .collect())
}

/// Partitions a sequence of normalized heights and lays out each partition independently.
pub fn partition(heights: &[u32], cfg: &BuildConfig) -> Result<Vec<Partition>> {
    let ranges = split_ranges(heights.len(), cfg.max_per_group, cfg.max_groups)?;
    ranges
        .into_iter()
        .enumerate()
        .map(|(i, range)| {
            Ok(Partition {
                number: i + 1,
                plan: plan_layout(cfg.canvas_width, &heights[range.clone()], cfg.spacing)?,
                range,
            })
        })
        .collect()
}
