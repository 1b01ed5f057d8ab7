use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for svgsprite operations
#[derive(Error, Diagnostic, Debug)]
pub enum SpriteError {
    #[error("Configuration error: {message}")]
    #[diagnostic(code(svgsprite::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Not found: {}", path.display())]
    #[diagnostic(
        code(svgsprite::not_found),
        help("Check that the directory named by @svgsprite exists under image_path")
    )]
    NotFound { path: PathBuf },

    #[error("IO error with {}: {message}", path.display())]
    #[diagnostic(code(svgsprite::io))]
    Io { path: PathBuf, message: String },

    #[error("Malformed sprite {}: {message}", path.display())]
    #[diagnostic(
        code(svgsprite::malformed_artifact),
        help("Delete the sprite file to force a rebuild")
    )]
    MalformedArtifact { path: PathBuf, message: String },

    #[error("Parse error in {}: {message}", path.display())]
    #[diagnostic(code(svgsprite::parse))]
    Parse { path: PathBuf, message: String },

    #[error("Packing error: {message}")]
    #[diagnostic(code(svgsprite::pack))]
    Pack { message: String },
}

impl SpriteError {
    /// Build an `Io` error for `path` from an underlying IO failure.
    pub fn io(path: impl Into<PathBuf>, context: &str, err: std::io::Error) -> Self {
        SpriteError::Io {
            path: path.into(),
            message: format!("{}: {}", context, err),
        }
    }

    /// Build a `Config` error for a required option that was not set.
    pub fn missing_option(name: &str) -> Self {
        SpriteError::Config {
            message: format!("Option `{}` is undefined", name),
            help: Some(format!("Set `{}` in svgsprite.yaml and restart", name)),
        }
    }
}

pub type Result<T> = std::result::Result<T, SpriteError>;
