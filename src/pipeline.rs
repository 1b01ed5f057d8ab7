//! Build pass coordination.
//!
//! A stylesheet host hands the pipeline the `@svgsprite` at-rules it
//! found, as a flat list of [`AtRuleOccurrence`]s. Each occurrence becomes
//! an independent [`BuildRequest`]; requests run in parallel, and once all
//! of them have succeeded the fresh sprites are written and one
//! [`Splice`] per occurrence is returned for the host to insert in place
//! of its at-rule. If any request fails, the pass fails and nothing is
//! written.

use std::fs;
use std::path::{Component, Path, PathBuf};

use rayon::prelude::*;

use crate::config::{Config, CONFIG_FILENAME};
use crate::css::{emit, CssOptions};
use crate::diagnostics::{Diagnostic, Diagnostics, EMPTY_DIR, EMPTY_PARAM};
use crate::discovery::{load_sources, scan_svg_dir};
use crate::error::{Result, SpriteError};
use crate::output::{display_path, plural, Printer};
use crate::pack::packer_for;
use crate::shape::Shape;
use crate::sprite::{write_frames_json, SpriteState, SpriteStore, SpriteWrite};

/// One `@svgsprite` at-rule as seen by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRuleOccurrence {
    /// Raw at-rule parameter, possibly quoted.
    pub param: String,
    /// Host-defined position; returned untouched in the matching [`Splice`].
    pub insertion_point: usize,
}

impl AtRuleOccurrence {
    pub fn new(param: impl Into<String>, insertion_point: usize) -> Self {
        Self {
            param: param.into(),
            insertion_point,
        }
    }
}

/// CSS to put where an at-rule was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub insertion_point: usize,
    pub css: String,
}

/// Everything needed to build one sprite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Icon directory name, as written in the at-rule.
    pub dirname: String,
    /// Absolute icon directory.
    pub svg_dir: PathBuf,
    /// Absolute sprite output path.
    pub sprite_path: PathBuf,
    /// Class naming and sprite URL.
    pub css: CssOptions,
}

/// Result of one request.
#[derive(Debug, Clone, Default)]
pub struct BuildOutcome {
    /// `None` when the request short-circuited to empty output.
    pub state: Option<SpriteState>,
    pub shapes: Vec<Shape>,
    pub css: String,
    pub write: Option<SpriteWrite>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildOutcome {
    fn skipped(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
            ..Default::default()
        }
    }
}

/// Result of a whole pass.
#[derive(Debug, Clone, Default)]
pub struct PassResult {
    /// One splice per occurrence, in occurrence order.
    pub splices: Vec<Splice>,
    pub diagnostics: Diagnostics,
    /// Files written during the pass.
    pub written: Vec<PathBuf>,
}

/// A configured sprite pipeline.
pub struct Pipeline {
    config: Config,
    root: PathBuf,
    store: SpriteStore,
    printer: Printer,
}

impl Pipeline {
    /// Create a pipeline. Relative configuration paths resolve against
    /// `root`. Fails if a required option is missing.
    pub fn new(config: Config, root: impl Into<PathBuf>) -> Result<Self> {
        config.validate()?;
        let store = SpriteStore::new(packer_for(config.layout), config.spacing);
        Ok(Self {
            config,
            root: root.into(),
            store,
            printer: Printer::new(),
        })
    }

    /// Create a pipeline from `root/svgsprite.yaml`.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config = Config::load(&root.join(CONFIG_FILENAME))?;
        Self::new(config, root)
    }

    /// Replace the status printer.
    pub fn with_printer(mut self, printer: Printer) -> Self {
        self.printer = printer;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve an at-rule parameter into a request. `None` for an empty
    /// parameter.
    pub fn request(&self, param: &str) -> Option<BuildRequest> {
        let dirname = normalize_param(param);
        if dirname.is_empty() {
            return None;
        }

        let image_path = self.resolve(self.config.image_path.as_deref());
        let sprite_output = self.resolve(self.config.sprite_output.as_deref());
        let style_output = self.resolve(self.config.style_output.as_deref());

        let svg_dir = image_path.join(dirname);
        let sprite_path = sprite_output.join(format!("{}.svg", dirname));
        let sprite_url = relative_url(&style_output, &sprite_path);

        Some(BuildRequest {
            dirname: dirname.to_string(),
            svg_dir,
            sprite_path,
            css: CssOptions {
                namespace: self.config.namespace.clone(),
                block: dirname.to_string(),
                separator: self.config.separator.clone(),
                sprite_url,
            },
        })
    }

    /// Run one request: list icons, build or reuse the sprite, emit CSS.
    /// Nothing is written.
    pub fn build(&self, request: &BuildRequest) -> Result<BuildOutcome> {
        let paths = scan_svg_dir(&request.svg_dir)?;
        if paths.is_empty() {
            let diagnostic = Diagnostic::warning(
                EMPTY_DIR,
                format!("There is no svg file in {}", display_path(&request.svg_dir)),
            );
            self.printer.warning("Warning", &diagnostic.message);
            return Ok(BuildOutcome::skipped(diagnostic));
        }

        let sources = load_sources(&paths)?;
        let stored = self.store.build(&sources, &request.sprite_path)?;

        let count = plural(stored.shapes.len(), "shape", "shapes");
        match stored.state {
            SpriteState::Fresh => self
                .printer
                .status("Packing", &format!("{} ({})", request.dirname, count)),
            SpriteState::Cached => self
                .printer
                .info("Reusing", &format!("{} ({})", request.dirname, count)),
        }

        let css = emit(&stored.shapes, &request.css);

        Ok(BuildOutcome {
            state: Some(stored.state),
            shapes: stored.shapes,
            css,
            write: stored.write,
            diagnostics: Vec::new(),
        })
    }

    /// Run a build pass over every occurrence.
    ///
    /// An empty occurrence list is a no-op. Any failing request fails the
    /// pass before anything is written.
    pub fn process(&self, occurrences: &[AtRuleOccurrence]) -> Result<PassResult> {
        let mut result = PassResult::default();
        if occurrences.is_empty() {
            return Ok(result);
        }

        let outcomes: Vec<BuildOutcome> = occurrences
            .par_iter()
            .map(|occurrence| self.handle(occurrence))
            .collect::<Result<_>>()?;

        for (occurrence, outcome) in occurrences.iter().zip(outcomes) {
            if let Some(write) = &outcome.write {
                result.written.extend(self.persist(write, &outcome.shapes)?);
            }
            result.diagnostics.extend(outcome.diagnostics);
            result.splices.push(Splice {
                insertion_point: occurrence.insertion_point,
                css: outcome.css,
            });
        }

        Ok(result)
    }

    fn handle(&self, occurrence: &AtRuleOccurrence) -> Result<BuildOutcome> {
        match self.request(&occurrence.param) {
            Some(request) => self.build(&request),
            None => {
                let diagnostic = Diagnostic::warning(
                    EMPTY_PARAM,
                    "The parameter of @svgsprite can not be empty",
                )
                .with_help("Name an icon directory, e.g. @svgsprite \"icons\";");
                self.printer.warning("Warning", &diagnostic.message);
                Ok(BuildOutcome::skipped(diagnostic))
            }
        }
    }

    /// Write a fresh sprite (and its frame metadata when enabled).
    fn persist(&self, write: &SpriteWrite, shapes: &[Shape]) -> Result<Vec<PathBuf>> {
        if let Some(parent) = write.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| SpriteError::io(parent, "Failed to create output directory", e))?;
        }
        fs::write(&write.path, &write.contents)
            .map_err(|e| SpriteError::io(write.path.clone(), "Failed to write sprite", e))?;
        self.printer.status("Generated", &display_path(&write.path));

        let mut written = vec![write.path.clone()];

        if self.config.json {
            let json_path = write.path.with_extension("json");
            let image = write
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            write_frames_json(shapes, &image, write.size, &json_path)?;
            written.push(json_path);
        }

        Ok(written)
    }

    fn resolve(&self, path: Option<&Path>) -> PathBuf {
        match path {
            Some(path) => self.root.join(path),
            None => self.root.clone(),
        }
    }
}

/// Strip whitespace and one pair of matching surrounding quotes.
pub fn normalize_param(param: &str) -> &str {
    let param = param.trim();
    for quote in ['"', '\''] {
        if param.len() >= 2 && param.starts_with(quote) && param.ends_with(quote) {
            return param[1..param.len() - 1].trim();
        }
    }
    param
}

/// Relative URL from directory `from` to file `to`, `/`-separated.
pub fn relative_url(from: &Path, to: &Path) -> String {
    let from = lexical_components(from);
    let to = lexical_components(to);

    let common = from
        .iter()
        .zip(&to)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = Vec::new();
    parts.extend(std::iter::repeat("..").take(from.len() - common));
    parts.extend(to[common..].iter().map(String::as_str));
    parts.join("/")
}

/// Path components with `.` dropped and `..` folded where possible.
fn lexical_components(path: &Path) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.last().is_some_and(|last| last != ".." && last != "/") {
                    parts.pop();
                } else {
                    parts.push("..".to_string());
                }
            }
            Component::RootDir => parts.push("/".to_string()),
            Component::Prefix(prefix) => {
                parts.push(prefix.as_os_str().to_string_lossy().into_owned())
            }
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
        }
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn quiet_pipeline(root: &Path) -> Pipeline {
        Pipeline::new(Config::new("src/svg", "dist/sprite", "dist/css"), root)
            .unwrap()
            .with_printer(Printer::quiet())
    }

    #[test]
    fn test_normalize_param() {
        assert_eq!(normalize_param("icons"), "icons");
        assert_eq!(normalize_param("\"icons\""), "icons");
        assert_eq!(normalize_param("'icons'"), "icons");
        assert_eq!(normalize_param("  \"icons\"  "), "icons");
        assert_eq!(normalize_param("\"\""), "");
        assert_eq!(normalize_param("\"icons'"), "\"icons'");
        assert_eq!(normalize_param("\""), "\"");
        assert_eq!(normalize_param(""), "");
    }

    #[test]
    fn test_relative_url() {
        assert_eq!(
            relative_url(Path::new("/p/dist/css"), Path::new("/p/dist/sprite/icons.svg")),
            "../sprite/icons.svg"
        );
        assert_eq!(
            relative_url(Path::new("/p/dist"), Path::new("/p/dist/icons.svg")),
            "icons.svg"
        );
        assert_eq!(
            relative_url(Path::new("/p/./a/b/../css"), Path::new("/p/sprites/x.svg")),
            "../../sprites/x.svg"
        );
    }

    #[test]
    fn test_request_resolution() {
        let pipeline = quiet_pipeline(Path::new("/project"));
        let request = pipeline.request("'icons'").unwrap();

        assert_eq!(request.dirname, "icons");
        assert_eq!(request.svg_dir, PathBuf::from("/project/src/svg/icons"));
        assert_eq!(
            request.sprite_path,
            PathBuf::from("/project/dist/sprite/icons.svg")
        );
        assert_eq!(request.css.sprite_url, "../sprite/icons.svg");
        assert_eq!(request.css.namespace, "svg_");
        assert_eq!(request.css.block, "icons");
    }

    #[test]
    fn test_request_empty_param() {
        let pipeline = quiet_pipeline(Path::new("/project"));
        assert!(pipeline.request("").is_none());
        assert!(pipeline.request("''").is_none());
    }

    #[test]
    fn test_new_rejects_incomplete_config() {
        let config = Config {
            style_output: None,
            ..Config::new("a", "b", "c")
        };
        let err = Pipeline::new(config, "/project").err().unwrap();
        assert!(matches!(err, SpriteError::Config { .. }));
    }

    #[test]
    fn test_empty_occurrence_list_is_noop() {
        let dir = tempdir().unwrap();
        let result = quiet_pipeline(dir.path()).process(&[]).unwrap();

        assert!(result.splices.is_empty());
        assert!(result.diagnostics.is_empty());
        assert!(result.written.is_empty());
        assert!(!dir.path().join("dist").exists());
    }

    #[test]
    fn test_empty_param_warns() {
        let dir = tempdir().unwrap();
        let result = quiet_pipeline(dir.path())
            .process(&[AtRuleOccurrence::new("\"\"", 3)])
            .unwrap();

        assert_eq!(
            result.splices,
            vec![Splice {
                insertion_point: 3,
                css: String::new()
            }]
        );
        assert!(result.diagnostics.contains_code(EMPTY_PARAM));
        assert!(result.written.is_empty());
    }

    #[test]
    fn test_load_reads_config_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            "imagePath: svg\nspriteOutput: out\nstyleOutput: out\nnameSpace: ico\n",
        )
        .unwrap();

        let pipeline = Pipeline::load(dir.path()).unwrap();
        assert_eq!(pipeline.config().namespace, "ico");
        assert_eq!(pipeline.request("x").unwrap().css.sprite_url, "x.svg");
    }
}
