//! Shape type: one icon packed into a sprite.

use crate::fingerprint::Fingerprint;

/// A packed icon unit.
///
/// Shapes built from source files carry their markup and fingerprint.
/// Shapes reconstructed from an existing sprite carry only the metadata
/// stored in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// Shape name (unique within a sprite), the source file stem.
    pub name: String,

    /// Width in pixels, without spacing.
    pub width: u32,

    /// Height in pixels, without spacing.
    pub height: u32,

    /// Left edge within the sprite.
    pub x: u32,

    /// Top edge within the sprite.
    pub y: u32,

    /// Source markup with prolog stripped, ready for embedding.
    pub markup: Option<String>,

    /// Fingerprint of the source file.
    pub fingerprint: Option<Fingerprint>,
}

impl Shape {
    /// Create an unplaced shape with no markup.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            x: 0,
            y: 0,
            markup: None,
            fingerprint: None,
        }
    }

    /// Set the position, builder style.
    pub fn at(mut self, x: u32, y: u32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Get the dimensions as (width, height).
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
