//! Pipeline configuration (svgsprite.yaml) parsing.
//!
//! The configuration names where icon directories live, where sprites are
//! written, and which directory generated CSS is considered relative to.
//! Keys accept both snake_case and the camelCase spellings used by older
//! stylesheet-plugin setups (`imagePath`, `spriteOutput`, ...).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpriteError};

/// The name of the configuration file.
pub const CONFIG_FILENAME: &str = "svgsprite.yaml";

/// Packing algorithm used to lay out a sprite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    /// Growing binary-tree bin packing.
    #[default]
    BinaryTree,
    /// Height-sorted rows in a power-of-two-wide canvas.
    Shelf,
}

/// Pipeline configuration, supplied once per pipeline instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base directory holding one subdirectory of icons per `@svgsprite`.
    #[serde(alias = "imagePath")]
    pub image_path: Option<PathBuf>,

    /// Directory sprites are written to, one `<dirname>.svg` per request.
    #[serde(alias = "spriteOutput", alias = "spritePath")]
    pub sprite_output: Option<PathBuf>,

    /// Directory the generated CSS lives in; sprite URLs are relative to it.
    #[serde(alias = "styleOutput")]
    pub style_output: Option<PathBuf>,

    /// CSS class prefix.
    #[serde(alias = "nameSpace", default = "default_namespace")]
    pub namespace: String,

    /// Separator between class name segments.
    #[serde(alias = "cssSeparator", default = "default_separator")]
    pub separator: String,

    /// Padding in pixels reserved around every packed icon.
    #[serde(default = "default_spacing")]
    pub spacing: u32,

    /// Packing algorithm.
    pub layout: LayoutKind,

    /// Also write `<dirname>.json` frame metadata next to each sprite.
    pub json: bool,
}

fn default_namespace() -> String {
    "svg_".to_string()
}

fn default_separator() -> String {
    "_".to_string()
}

fn default_spacing() -> u32 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_path: None,
            sprite_output: None,
            style_output: None,
            namespace: default_namespace(),
            separator: default_separator(),
            spacing: default_spacing(),
            layout: LayoutKind::default(),
            json: false,
        }
    }
}

impl Config {
    /// Create a configuration with the three required locations set.
    pub fn new(
        image_path: impl Into<PathBuf>,
        sprite_output: impl Into<PathBuf>,
        style_output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            image_path: Some(image_path.into()),
            sprite_output: Some(sprite_output.into()),
            style_output: Some(style_output.into()),
            ..Default::default()
        }
    }

    /// Load configuration from a svgsprite.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SpriteError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read configuration: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| SpriteError::Config {
            message: format!("Invalid configuration: {}", e),
            help: Some(format!("Check {} syntax", CONFIG_FILENAME)),
        })
    }

    /// Check that every required option is present.
    pub fn validate(&self) -> Result<()> {
        if is_unset(&self.image_path) {
            return Err(SpriteError::missing_option("imagePath"));
        }
        if is_unset(&self.sprite_output) {
            return Err(SpriteError::missing_option("spriteOutput"));
        }
        if is_unset(&self.style_output) {
            return Err(SpriteError::missing_option("styleOutput"));
        }
        Ok(())
    }
}

fn is_unset(path: &Option<PathBuf>) -> bool {
    path.as_ref().map_or(true, |p| p.as_os_str().is_empty())
}
