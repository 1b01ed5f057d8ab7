//! Rectangle packing.
//!
//! A [`Packer`] assigns a top-left position to every item so that no two
//! items overlap, and reports the canvas size that holds them all. Packers
//! are deterministic for a given input order. Spacing between icons is the
//! caller's business: sizes arrive already padded.

mod binary_tree;
mod shelf;

pub use binary_tree::BinaryTreePacker;
pub use shelf::ShelfPacker;

use crate::config::LayoutKind;
use crate::error::{Result, SpriteError};

/// A rectangle to place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackItem {
    pub id: String,
    pub width: u32,
    pub height: u32,
}

impl PackItem {
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
        }
    }
}

/// Where an item ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub id: String,
    pub x: u32,
    pub y: u32,
}

/// Result of packing: canvas size plus one placement per item, in the
/// same order as the input items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub placements: Vec<Placement>,
}

/// A 2D bin-packing algorithm.
pub trait Packer: Send + Sync {
    /// Place every item. `placements[i]` belongs to `items[i]`.
    fn pack(&self, items: &[PackItem]) -> Result<Layout>;
}

/// Build the packer selected by configuration.
pub fn packer_for(kind: LayoutKind) -> Box<dyn Packer> {
    match kind {
        LayoutKind::BinaryTree => Box::new(BinaryTreePacker::new()),
        LayoutKind::Shelf => Box::new(ShelfPacker::new()),
    }
}

/// Add two canvas coordinates, failing instead of wrapping.
pub(crate) fn extend(a: u32, b: u32) -> Result<u32> {
    a.checked_add(b).ok_or_else(|| SpriteError::Pack {
        message: "canvas exceeds u32 range".to_string(),
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Deterministic pseudo-random item sizes for layout checks.
    pub fn mixed_items(count: usize, seed: u64) -> Vec<PackItem> {
        let mut state = seed;
        let mut next = move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 33) % 64) as u32 + 1
        };
        (0..count)
            .map(|i| PackItem::new(format!("item-{}", i), next(), next()))
            .collect()
    }

    /// Assert the layout contract: one placement per item in order, no
    /// overlaps, everything inside the canvas.
    pub fn assert_valid_layout(items: &[PackItem], layout: &Layout) {
        assert_eq!(layout.placements.len(), items.len());

        for (item, placement) in items.iter().zip(&layout.placements) {
            assert_eq!(item.id, placement.id);
            assert!(
                placement.x + item.width <= layout.width
                    && placement.y + item.height <= layout.height,
                "{} at ({}, {}) exceeds canvas {}x{}",
                item.id,
                placement.x,
                placement.y,
                layout.width,
                layout.height
            );
        }

        for i in 0..items.len() {
            for j in (i + 1)..items.len() {
                let (a, pa) = (&items[i], &layout.placements[i]);
                let (b, pb) = (&items[j], &layout.placements[j]);
                let no_overlap = pb.x >= pa.x + a.width
                    || pa.x >= pb.x + b.width
                    || pb.y >= pa.y + a.height
                    || pa.y >= pb.y + b.height;
                assert!(no_overlap, "{} and {} overlap", a.id, b.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packer_for_each_kind() {
        let items = vec![PackItem::new("a", 10, 10), PackItem::new("b", 20, 5)];
        for kind in [LayoutKind::BinaryTree, LayoutKind::Shelf] {
            let layout = packer_for(kind).pack(&items).unwrap();
            testing::assert_valid_layout(&items, &layout);
        }
    }

    #[test]
    fn test_extend_overflow_is_pack_error() {
        assert_eq!(extend(3, 4).unwrap(), 7);
        let err = extend(u32::MAX, 1).unwrap_err();
        assert!(matches!(err, SpriteError::Pack { .. }));
        assert!(err.to_string().contains("canvas exceeds u32 range"));
    }
}
