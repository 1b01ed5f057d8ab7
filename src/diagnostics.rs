//! Warnings collected during a build pass.
//!
//! Empty at-rule parameters and empty icon directories do not fail a
//! pass; they are reported here so the host can surface them.

/// Code for an `@svgsprite` at-rule with no directory parameter.
pub const EMPTY_PARAM: &str = "svgsprite::empty-param";

/// Code for an icon directory that contains no `.svg` files.
pub const EMPTY_DIR: &str = "svgsprite::empty-dir";

/// A single warning.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Machine-readable diagnostic code (e.g. "svgsprite::empty-dir").
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Optional help text suggesting how to fix the issue.
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a warning diagnostic.
    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            help: None,
        }
    }

    /// Add help text to this diagnostic.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Collects diagnostics from a build pass.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// Check if there are no diagnostics at all.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check whether any diagnostic carries `code`.
    pub fn contains_code(&self, code: &str) -> bool {
        self.items.iter().any(|d| d.code == code)
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        self.items.extend(other);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }
}
