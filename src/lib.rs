//! svgsprite - SVG sprite and CSS generator
//!
//! Combines a directory of SVG icons into one packed SVG sprite and
//! generates the CSS classes that show each icon from it. Sprites carry a
//! fingerprint of their sources, so a rebuild with unchanged icons reuses
//! the sprite already on disk.

pub mod config;
pub mod css;
pub mod diagnostics;
pub mod discovery;
pub mod error;
pub mod fingerprint;
pub mod output;
pub mod pack;
pub mod pipeline;
pub mod shape;
pub mod sprite;
pub mod stylesheet;
pub mod svg;

pub use config::{Config, LayoutKind, CONFIG_FILENAME};
pub use css::{emit, CssOptions};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use discovery::{load_sources, scan_svg_dir, SourceSvg};
pub use error::{Result, SpriteError};
pub use fingerprint::Fingerprint;
pub use output::Printer;
pub use pack::{packer_for, BinaryTreePacker, Layout, PackItem, Packer, Placement, ShelfPacker};
pub use pipeline::{AtRuleOccurrence, BuildOutcome, BuildRequest, PassResult, Pipeline, Splice};
pub use shape::Shape;
pub use sprite::{SpriteState, SpriteStore, SpriteWrite, StoreResult};
pub use stylesheet::{find_at_rules, transform, AtRuleSpan, TransformOutput};
pub use svg::{extract, extract_all, PersistedSprite, SpriteArtifact};
