//! Shelf (row-based) packer.
//!
//! Places items left-to-right in rows of a power-of-two-wide canvas,
//! tallest first. Simpler and more predictable than the binary tree, at
//! the cost of some wasted space.

use crate::error::{Result, SpriteError};

use super::{extend, Layout, PackItem, Packer, Placement};

/// Shelf packer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShelfPacker;

impl ShelfPacker {
    pub fn new() -> Self {
        Self
    }
}

impl Packer for ShelfPacker {
    fn pack(&self, items: &[PackItem]) -> Result<Layout> {
        if items.is_empty() {
            return Ok(Layout::default());
        }

        // Build index sorted by height descending (stable sort preserves input order)
        let mut indices: Vec<usize> = (0..items.len()).collect();
        indices.sort_by(|&a, &b| items[b].height.cmp(&items[a].height));

        // Sheet width is the smallest power of two that fits
        let max_w = items.iter().map(|i| i.width).max().unwrap_or(1);
        let total_area = items
            .iter()
            .map(|i| u64::from(i.width) * u64::from(i.height))
            .fold(0u64, u64::saturating_add);
        let sqrt_area = (total_area as f64).sqrt().ceil() as u32;
        let sheet_width = next_power_of_two(max_w.max(sqrt_area))?;

        let mut cursor_x: u32 = 0;
        let mut cursor_y: u32 = 0;
        let mut row_height: u32 = 0;
        let mut positions: Vec<(u32, u32)> = vec![(0, 0); items.len()];

        for &idx in &indices {
            let w = items[idx].width;
            let h = items[idx].height;

            // Does it fit in the current row?
            let row_full = cursor_x
                .checked_add(w)
                .map_or(true, |end| end > sheet_width);
            if cursor_x > 0 && row_full {
                cursor_y = extend(cursor_y, row_height)?;
                cursor_x = 0;
                row_height = 0;
            }

            positions[idx] = (cursor_x, cursor_y);
            row_height = row_height.max(h);
            cursor_x = extend(cursor_x, w)?;
        }

        let placements = items
            .iter()
            .zip(positions)
            .map(|(item, (x, y))| Placement {
                id: item.id.clone(),
                x,
                y,
            })
            .collect();

        Ok(Layout {
            width: sheet_width,
            height: extend(cursor_y, row_height)?,
            placements,
        })
    }
}

/// Find the smallest power of two >= n.
fn next_power_of_two(n: u32) -> Result<u32> {
    n.max(1).checked_next_power_of_two().ok_or_else(|| SpriteError::Pack {
        message: "canvas exceeds u32 range".to_string(),
    })
}
