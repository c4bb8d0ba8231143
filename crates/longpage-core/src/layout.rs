use crate::config::Spacing;
use crate::error::{LongPageError, Result};
use crate::model::NormalizedImage;
use serde::{Deserialize, Serialize};

/// One image's slot in a vertical stack.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Placement {
    /// Position in the sequence the plan was computed for.
    pub index: usize,
    /// Absolute top edge (pixels).
    pub y: u32,
    pub height: u32,
}

/// Absolute vertical geometry of a stack of full-width images.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayoutPlan {
    pub width: u32,
    pub spacing: Spacing,
    pub placements: Vec<Placement>,
    pub total_height: u32,
}

impl LayoutPlan {
    pub fn for_images(images: &[NormalizedImage], width: u32, spacing: Spacing) -> Result<Self> {
        let heights: Vec<u32> = images.iter().map(|im| im.height()).collect();
        plan_layout(width, &heights, spacing)
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Top offsets in sequence order.
    pub fn offsets(&self) -> Vec<u32> {
        self.placements.iter().map(|p| p.y).collect()
    }
}

/// `top + bottom + sum(heights) + gap * (n - 1)`, or 0 for no images.
///
/// `None` when the total does not fit in `u32`.
pub fn total_height_of(heights: &[u32], spacing: Spacing) -> Option<u32> {
    if heights.is_empty() {
        return Some(0);
    }
    let sum: u64 = heights.iter().map(|&h| u64::from(h)).sum();
    let gaps = u64::from(spacing.gap) * (heights.len() as u64 - 1);
    let total = u64::from(spacing.top) + u64::from(spacing.bottom) + sum + gaps;
    u32::try_from(total).ok()
}

/// Stacks `heights` top to bottom. The first image starts at `spacing.top`; no gap follows the last.
///
/// Fails with `LayoutOverflow` when the stack is taller than `u32::MAX` pixels.
pub fn plan_layout(width: u32, heights: &[u32], spacing: Spacing) -> Result<LayoutPlan> {
    let total_height = total_height_of(heights, spacing).ok_or(LongPageError::LayoutOverflow {
        count: heights.len(),
    })?;
    // every offset is below the checked total, so plain adds cannot wrap
    let mut placements = Vec::with_capacity(heights.len());
    let mut y = u64::from(spacing.top);
    for (index, &height) in heights.iter().enumerate() {
        placements.push(Placement {
            index,
            y: y as u32,
            height,
        });
        y += u64::from(height) + u64::from(spacing.gap);
    }
    Ok(LayoutPlan {
        width,
        spacing,
        placements,
        total_height,
    })
}
