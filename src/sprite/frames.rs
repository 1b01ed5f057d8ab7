//! Frame metadata for a sprite.
//!
//! Outputs a TexturePacker-compatible JSON Hash file so tools other than
//! the generated CSS can address icons inside the sprite.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{Result, SpriteError};
use crate::shape::Shape;

/// Render frame metadata for `shapes` placed on a `size` canvas stored
/// as `image`.
pub fn frames_json(shapes: &[Shape], image: &str, size: (u32, u32)) -> Result<String> {
    let output = TexturePackerJson::new(shapes, image, size);
    serde_json::to_string_pretty(&output).map_err(|e| SpriteError::Pack {
        message: format!("Failed to serialize frame metadata: {}", e),
    })
}

/// Write frame metadata next to a sprite.
pub fn write_frames_json(shapes: &[Shape], image: &str, size: (u32, u32), path: &Path) -> Result<()> {
    let json = frames_json(shapes, image, size)?;
    fs::write(path, json).map_err(|e| SpriteError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write frame metadata: {}", e),
    })?;
    Ok(())
}

// --- TexturePacker JSON serialization types ---

#[derive(Serialize)]
struct TexturePackerJson {
    frames: BTreeMap<String, TPFrame>,
    meta: TPMeta,
}

#[derive(Serialize)]
struct TPFrame {
    frame: TPRect,
    rotated: bool,
    trimmed: bool,
    #[serde(rename = "spriteSourceSize")]
    sprite_source_size: TPRect,
    #[serde(rename = "sourceSize")]
    source_size: TPSize,
}

#[derive(Serialize)]
struct TPRect {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

#[derive(Serialize)]
struct TPSize {
    w: u32,
    h: u32,
}

#[derive(Serialize)]
struct TPMeta {
    app: String,
    version: String,
    image: String,
    format: String,
    size: TPSize,
    scale: String,
}

impl TexturePackerJson {
    fn new(shapes: &[Shape], image: &str, size: (u32, u32)) -> Self {
        let frames = shapes
            .iter()
            .map(|shape| {
                let frame = TPFrame {
                    frame: TPRect {
                        x: shape.x,
                        y: shape.y,
                        w: shape.width,
                        h: shape.height,
                    },
                    rotated: false,
                    trimmed: false,
                    sprite_source_size: TPRect {
                        x: 0,
                        y: 0,
                        w: shape.width,
                        h: shape.height,
                    },
                    source_size: TPSize {
                        w: shape.width,
                        h: shape.height,
                    },
                };
                (shape.name.clone(), frame)
            })
            .collect();

        TexturePackerJson {
            frames,
            meta: TPMeta {
                app: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                image: image.to_string(),
                format: "svg".to_string(),
                size: TPSize {
                    w: size.0,
                    h: size.1,
                },
                scale: "1".to_string(),
            },
        }
    }
}
