//! Sprite store: incremental sprite builds.
//!
//! Each build compares the fingerprint of the current icon set with the
//! one embedded in the sprite already on disk. When they agree (and the
//! shape counts match) the sprite is reused and its shapes are read back
//! from it; otherwise the icons are extracted, packed and serialized into
//! a new sprite. The store never writes: a fresh sprite is handed back as
//! a [`SpriteWrite`] for the caller to persist.

mod frames;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::discovery::SourceSvg;
use crate::error::{Result, SpriteError};
use crate::fingerprint::Fingerprint;
use crate::pack::{PackItem, Packer};
use crate::shape::Shape;
use crate::svg::{extract_all, PersistedSprite, SpriteArtifact};

pub use frames::{frames_json, write_frames_json};

/// Default padding reserved around each icon.
pub const DEFAULT_SPACING: u32 = 10;

/// Which path a build took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteState {
    /// Sprite rebuilt from the source icons.
    Fresh,
    /// Existing sprite reused as-is.
    Cached,
}

/// A sprite that needs to be written to disk.
#[derive(Debug, Clone)]
pub struct SpriteWrite {
    pub path: PathBuf,
    pub contents: String,
    /// Canvas size.
    pub size: (u32, u32),
}

/// Outcome of [`SpriteStore::build`].
#[derive(Debug, Clone)]
pub struct StoreResult {
    pub state: SpriteState,
    /// Placed shapes, in source order when fresh and document order when cached.
    pub shapes: Vec<Shape>,
    /// Present only on the fresh path.
    pub write: Option<SpriteWrite>,
}

/// Builds sprites for one icon set at a time. Holds no per-sprite state.
pub struct SpriteStore {
    packer: Box<dyn Packer>,
    spacing: u32,
}

impl SpriteStore {
    pub fn new(packer: Box<dyn Packer>, spacing: u32) -> Self {
        Self { packer, spacing }
    }

    pub fn spacing(&self) -> u32 {
        self.spacing
    }

    /// Produce positioned shapes for `sources`, reusing the sprite at
    /// `sprite_path` when it is still current.
    pub fn build(&self, sources: &[SourceSvg], sprite_path: &Path) -> Result<StoreResult> {
        let current = sprite_fingerprint(sources);

        match read_persisted(sprite_path)? {
            Some(prior) if is_current(&prior, &current, sources.len()) => Ok(reuse(prior)),
            _ => self.rebuild(sources, current, sprite_path),
        }
    }

    fn rebuild(
        &self,
        sources: &[SourceSvg],
        fingerprint: Fingerprint,
        sprite_path: &Path,
    ) -> Result<StoreResult> {
        let mut shapes = extract_all(sources)?;

        let items: Vec<PackItem> = shapes
            .iter()
            .map(|shape| {
                PackItem::new(
                    shape.name.clone(),
                    shape.width.saturating_add(self.spacing),
                    shape.height.saturating_add(self.spacing),
                )
            })
            .collect();

        let layout = self.packer.pack(&items)?;
        if layout.placements.len() != shapes.len() {
            return Err(SpriteError::Pack {
                message: format!(
                    "packer placed {} of {} shapes",
                    layout.placements.len(),
                    shapes.len()
                ),
            });
        }

        for (shape, placement) in shapes.iter_mut().zip(&layout.placements) {
            if placement.id != shape.name {
                return Err(SpriteError::Pack {
                    message: format!(
                        "packer returned {} where {} was expected",
                        placement.id, shape.name
                    ),
                });
            }
            shape.x = placement.x;
            shape.y = placement.y;
        }

        let artifact = SpriteArtifact {
            width: layout.width,
            height: layout.height,
            fingerprint,
            shapes,
        };
        let contents = artifact.to_svg()?;

        Ok(StoreResult {
            state: SpriteState::Fresh,
            write: Some(SpriteWrite {
                path: sprite_path.to_path_buf(),
                contents,
                size: (artifact.width, artifact.height),
            }),
            shapes: artifact.shapes,
        })
    }
}

/// Fingerprint of a whole icon set, independent of listing order.
pub fn sprite_fingerprint(sources: &[SourceSvg]) -> Fingerprint {
    Fingerprint::aggregate(sources.iter().map(|s| &s.fingerprint))
}

/// Read a previously written sprite.
///
/// A missing file is `Ok(None)`. Any other read failure, or content that
/// is not a well-formed sprite, is an error.
pub fn read_persisted(path: &Path) -> Result<Option<PersistedSprite>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(SpriteError::io(path, "Failed to read sprite", e)),
    };

    let malformed = |message: String| SpriteError::MalformedArtifact {
        path: path.to_path_buf(),
        message,
    };

    let text = String::from_utf8(bytes).map_err(|e| malformed(format!("not valid UTF-8: {}", e)))?;
    PersistedSprite::parse(&text).map(Some).map_err(malformed)
}

/// Whether a persisted sprite matches the current icon set.
pub fn is_current(prior: &PersistedSprite, fingerprint: &Fingerprint, count: usize) -> bool {
    prior.count == Some(count) && prior.fingerprint.as_ref() == Some(fingerprint)
}

fn reuse(prior: PersistedSprite) -> StoreResult {
    StoreResult {
        state: SpriteState::Cached,
        shapes: prior.shapes,
        write: None,
    }
}
