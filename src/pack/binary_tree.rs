//! Growing binary-tree packer.
//!
//! Items are placed largest first. The tree starts as the first item's
//! rectangle; each placement splits a free node into a right and a down
//! remainder, and when nothing fits the root grows right or down, whichever
//! keeps the canvas closer to square.

use crate::error::{Result, SpriteError};

use super::{extend, Layout, PackItem, Packer, Placement};

#[derive(Debug, Clone, Copy)]
struct Node {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
    used: bool,
    right: Option<usize>,
    down: Option<usize>,
}

impl Node {
    fn free(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            used: false,
            right: None,
            down: None,
        }
    }
}

/// Arena-backed packing tree.
struct Tree {
    nodes: Vec<Node>,
    root: usize,
}

impl Tree {
    fn new(w: u32, h: u32) -> Self {
        Self {
            nodes: vec![Node::free(0, 0, w, h)],
            root: 0,
        }
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn size(&self) -> (u32, u32) {
        let root = &self.nodes[self.root];
        (root.w, root.h)
    }

    /// Place a `w`x`h` item. `Ok(None)` when the canvas cannot grow to fit.
    fn insert(&mut self, w: u32, h: u32) -> Result<Option<(u32, u32)>> {
        match self.find(self.root, w, h) {
            Some(node) => self.split(node, w, h).map(Some),
            None => self.grow(w, h),
        }
    }

    fn find(&self, index: usize, w: u32, h: u32) -> Option<usize> {
        let node = &self.nodes[index];
        if node.used {
            node.right
                .and_then(|right| self.find(right, w, h))
                .or_else(|| node.down.and_then(|down| self.find(down, w, h)))
        } else if w <= node.w && h <= node.h {
            Some(index)
        } else {
            None
        }
    }

    fn split(&mut self, index: usize, w: u32, h: u32) -> Result<(u32, u32)> {
        let node = self.nodes[index];
        let down = self.push(Node::free(node.x, extend(node.y, h)?, node.w, node.h - h));
        let right = self.push(Node::free(extend(node.x, w)?, node.y, node.w - w, h));

        let node = &mut self.nodes[index];
        node.used = true;
        node.down = Some(down);
        node.right = Some(right);
        Ok((node.x, node.y))
    }

    fn grow(&mut self, w: u32, h: u32) -> Result<Option<(u32, u32)>> {
        let (root_w, root_h) = self.size();

        let can_grow_down = w <= root_w;
        let can_grow_right = h <= root_h;

        // Keep the canvas roughly square
        let should_grow_right =
            can_grow_right && root_w.checked_add(w).is_some_and(|grown| root_h >= grown);
        let should_grow_down =
            can_grow_down && root_h.checked_add(h).is_some_and(|grown| root_w >= grown);

        if should_grow_right {
            self.grow_right(w, h)
        } else if should_grow_down {
            self.grow_down(w, h)
        } else if can_grow_right {
            self.grow_right(w, h)
        } else if can_grow_down {
            self.grow_down(w, h)
        } else {
            Ok(None)
        }
    }

    fn grow_right(&mut self, w: u32, h: u32) -> Result<Option<(u32, u32)>> {
        let (root_w, root_h) = self.size();
        let grown_w = extend(root_w, w)?;
        let right = self.push(Node::free(root_w, 0, w, root_h));
        let old_root = self.root;
        self.root = self.push(Node {
            x: 0,
            y: 0,
            w: grown_w,
            h: root_h,
            used: true,
            right: Some(right),
            down: Some(old_root),
        });

        match self.find(self.root, w, h) {
            Some(node) => self.split(node, w, h).map(Some),
            None => Ok(None),
        }
    }

    fn grow_down(&mut self, w: u32, h: u32) -> Result<Option<(u32, u32)>> {
        let (root_w, root_h) = self.size();
        let grown_h = extend(root_h, h)?;
        let down = self.push(Node::free(0, root_h, root_w, h));
        let old_root = self.root;
        self.root = self.push(Node {
            x: 0,
            y: 0,
            w: root_w,
            h: grown_h,
            used: true,
            right: Some(old_root),
            down: Some(down),
        });

        match self.find(self.root, w, h) {
            Some(node) => self.split(node, w, h).map(Some),
            None => Ok(None),
        }
    }
}

/// Binary-tree bin packer.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryTreePacker;

impl BinaryTreePacker {
    pub fn new() -> Self {
        Self
    }
}

impl Packer for BinaryTreePacker {
    fn pack(&self, items: &[PackItem]) -> Result<Layout> {
        if items.is_empty() {
            return Ok(Layout::default());
        }

        // Longest side first; sort_by is stable so ties keep input order
        let mut order: Vec<usize> = (0..items.len()).collect();
        order.sort_by(|&a, &b| max_side(&items[b]).cmp(&max_side(&items[a])));

        let first = &items[order[0]];
        let mut tree = Tree::new(first.width, first.height);
        let mut positions = vec![(0, 0); items.len()];

        for &index in &order {
            let item = &items[index];
            positions[index] = tree.insert(item.width, item.height)?.ok_or_else(|| {
                SpriteError::Pack {
                    message: format!(
                        "no room for {} ({}x{})",
                        item.id, item.width, item.height
                    ),
                }
            })?;
        }

        let (width, height) = tree.size();
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
            width,
            height,
            placements,
        })
    }
}

fn max_side(item: &PackItem) -> u32 {
    item.width.max(item.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::testing::{assert_valid_layout, mixed_items};

    #[test]
    fn test_pack_empty() {
        let layout = BinaryTreePacker::new().pack(&[]).unwrap();
        assert_eq!(layout, Layout::default());
    }

    #[test]
    fn test_pack_single_item() {
        let items = vec![PackItem::new("a", 50, 30)];
        let layout = BinaryTreePacker::new().pack(&items).unwrap();

        assert_eq!((layout.width, layout.height), (50, 30));
        assert_eq!(layout.placements[0], Placement { id: "a".into(), x: 0, y: 0 });
    }

    #[test]
    fn test_pack_two_icons_side_by_side() {
        // 80x40 and 30x30 icons padded by 10
        let items = vec![PackItem::new("a", 90, 50), PackItem::new("b", 40, 40)];
        let layout = BinaryTreePacker::new().pack(&items).unwrap();

        assert_valid_layout(&items, &layout);
        assert_eq!((layout.placements[0].x, layout.placements[0].y), (0, 0));
        assert_eq!((layout.placements[1].x, layout.placements[1].y), (0, 50));
        assert_eq!((layout.width, layout.height), (90, 90));
    }

    #[test]
    fn test_pack_equal_squares_grow_into_grid() {
        let items: Vec<_> = (0..4).map(|i| PackItem::new(format!("s{}", i), 50, 50)).collect();
        let layout = BinaryTreePacker::new().pack(&items).unwrap();

        assert_valid_layout(&items, &layout);
        assert_eq!((layout.width, layout.height), (100, 100));
    }

    #[test]
    fn test_pack_placements_follow_input_order() {
        let items = vec![
            PackItem::new("small", 5, 5),
            PackItem::new("big", 40, 40),
        ];
        let layout = BinaryTreePacker::new().pack(&items).unwrap();

        assert_eq!(layout.placements[0].id, "small");
        assert_eq!(layout.placements[1].id, "big");
        // The larger item is packed first, at the origin
        assert_eq!((layout.placements[1].x, layout.placements[1].y), (0, 0));
    }

    #[test]
    fn test_pack_zero_sized_items() {
        let items = vec![PackItem::new("a", 0, 0), PackItem::new("b", 0, 0)];
        let layout = BinaryTreePacker::new().pack(&items).unwrap();
        assert_eq!(layout.placements.len(), 2);
    }

    #[test]
    fn test_pack_is_deterministic() {
        let items = mixed_items(40, 7);
        let a = BinaryTreePacker::new().pack(&items).unwrap();
        let b = BinaryTreePacker::new().pack(&items).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_pack_mixed_sizes_never_overlap() {
        for seed in 0..20 {
            let items = mixed_items(30, seed);
            let layout = BinaryTreePacker::new().pack(&items).unwrap();
            assert_valid_layout(&items, &layout);
        }
    }

    #[test]
    fn test_pack_huge_items_near_u32_limit() {
        // Widths alone would overflow when added; growing down still fits
        let items = vec![
            PackItem::new("a", 3_000_000_000, 11),
            PackItem::new("b", 3_000_000_000, 11),
        ];
        let layout = BinaryTreePacker::new().pack(&items).unwrap();

        assert_valid_layout(&items, &layout);
        assert_eq!((layout.width, layout.height), (3_000_000_000, 22));
    }

    #[test]
    fn test_pack_canvas_overflow_is_error() {
        let items = vec![
            PackItem::new("a", 3_000_000_000, 3_000_000_000),
            PackItem::new("b", 3_000_000_000, 3_000_000_000),
        ];
        let err = BinaryTreePacker::new().pack(&items).unwrap_err();

        assert!(matches!(err, SpriteError::Pack { .. }));
        assert!(err.to_string().contains("canvas exceeds u32 range"));
    }
}
