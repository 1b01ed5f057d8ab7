//! Icon discovery for a single sprite.
//!
//! Lists the `.svg` files directly inside an icon directory (no recursion)
//! and reads them into [`SourceSvg`] values. Listing always completes
//! before any file is read; the reads themselves run in parallel.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::{Result, SpriteError};
use crate::fingerprint::Fingerprint;

/// One input icon file.
#[derive(Debug, Clone)]
pub struct SourceSvg {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Raw file contents.
    pub contents: Vec<u8>,
    /// Fingerprint of `contents`.
    pub fingerprint: Fingerprint,
}

impl SourceSvg {
    /// Build a source from contents already in memory.
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        let contents = contents.into();
        let fingerprint = Fingerprint::of_bytes(&contents);
        Self {
            path: path.into(),
            contents,
            fingerprint,
        }
    }

    /// Shape name: the file name without its `.svg` extension.
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// List the `.svg` files directly inside `dir`, sorted by file name.
///
/// A missing directory is a [`SpriteError::NotFound`]. A path that exists
/// but cannot be read as a directory is [`SpriteError::Io`]. An empty
/// result is not an error here.
pub fn scan_svg_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    match fs::metadata(dir) {
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(SpriteError::NotFound {
                path: dir.to_path_buf(),
            });
        }
        Err(e) => return Err(SpriteError::io(dir, "Failed to read icon directory", e)),
        Ok(meta) if !meta.is_dir() => {
            return Err(SpriteError::Io {
                path: dir.to_path_buf(),
                message: "Icon path is not a directory".to_string(),
            });
        }
        Ok(_) => {}
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| SpriteError::Io {
            path: e.path().unwrap_or(dir).to_path_buf(),
            message: format!("Failed to list directory: {}", e),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        if is_svg_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Read every file in `paths` in parallel, preserving order.
pub fn load_sources(paths: &[PathBuf]) -> Result<Vec<SourceSvg>> {
    paths
        .par_iter()
        .map(|path| {
            let contents = fs::read(path)
                .map_err(|e| SpriteError::io(path.clone(), "Failed to read icon", e))?;
            Ok(SourceSvg::new(path.clone(), contents))
        })
        .collect()
}

/// Only files whose extension is exactly `svg` are icons.
pub fn is_svg_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("svg")
}
