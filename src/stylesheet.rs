//! Plain-text stylesheet adapter.
//!
//! Finds `@svgsprite <dir>;` statements in a CSS source, runs one build
//! pass over them and splices the generated CSS back in place of each
//! statement. Comments and string literals are skipped; no other CSS
//! structure is interpreted.

use std::path::PathBuf;

use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::pipeline::{AtRuleOccurrence, Pipeline};

/// At-rule keyword, without the `@`.
pub const AT_RULE: &str = "svgsprite";

/// One `@svgsprite` statement in a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRuleSpan {
    /// Byte offset of the `@`.
    pub start: usize,
    /// Byte offset just past the terminating `;` (or end of the parameter
    /// when the statement is closed by `}` or end of input).
    pub end: usize,
    /// Parameter text exactly as written, quotes and whitespace included.
    pub param: String,
}

/// A transformed stylesheet.
#[derive(Debug, Clone, Default)]
pub struct TransformOutput {
    pub css: String,
    pub diagnostics: Diagnostics,
    pub written: Vec<PathBuf>,
}

/// Find every `@svgsprite` statement in `css`, in source order.
///
/// An at-rule followed by a `{` block is not a statement and is left
/// alone.
pub fn find_at_rules(css: &str) -> Vec<AtRuleSpan> {
    let bytes = css.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_comment(bytes, i);
            }
            b'"' | b'\'' => {
                i = skip_string(bytes, i);
            }
            b'@' if is_keyword_at(bytes, i + 1) => {
                let param_start = i + 1 + AT_RULE.len();
                let (param_end, terminator) = scan_param(bytes, param_start);
                match terminator {
                    Some(b'{') => {}
                    Some(b';') => spans.push(AtRuleSpan {
                        start: i,
                        end: param_end + 1,
                        param: css[param_start..param_end].to_string(),
                    }),
                    _ => spans.push(AtRuleSpan {
                        start: i,
                        end: param_end,
                        param: css[param_start..param_end].to_string(),
                    }),
                }
                i = param_end.max(i + 1);
            }
            _ => i += 1,
        }
    }

    spans
}

/// Run a build pass over the at-rules in `css` and return the stylesheet
/// with each statement replaced by its generated CSS.
///
/// On error the source is not modified and no sprite is written.
pub fn transform(css: &str, pipeline: &Pipeline) -> Result<TransformOutput> {
    let spans = find_at_rules(css);
    let occurrences: Vec<AtRuleOccurrence> = spans
        .iter()
        .enumerate()
        .map(|(index, span)| AtRuleOccurrence::new(span.param.clone(), index))
        .collect();

    let pass = pipeline.process(&occurrences)?;

    let mut generated = vec![""; spans.len()];
    for splice in &pass.splices {
        if let Some(slot) = generated.get_mut(splice.insertion_point) {
            *slot = splice.css.as_str();
        }
    }

    let mut output = String::with_capacity(css.len());
    let mut cursor = 0;
    for (span, replacement) in spans.iter().zip(generated) {
        output.push_str(&css[cursor..span.start]);
        output.push_str(replacement);
        cursor = span.end;
    }
    output.push_str(&css[cursor..]);

    Ok(TransformOutput {
        css: output,
        diagnostics: pass.diagnostics,
        written: pass.written,
    })
}

/// Whether the keyword starts at `at` and is not a prefix of a longer name.
fn is_keyword_at(bytes: &[u8], at: usize) -> bool {
    let end = at + AT_RULE.len();
    if end > bytes.len() || !bytes[at..end].eq_ignore_ascii_case(AT_RULE.as_bytes()) {
        return false;
    }
    !bytes
        .get(end)
        .is_some_and(|&b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Index past the closing `*/`, or end of input.
fn skip_comment(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 2;
    while i + 1 < bytes.len() {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            return i + 2;
        }
        i += 1;
    }
    bytes.len()
}

/// Index past the closing quote, or end of input.
fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// End of the parameter and the byte that ended it (`;`, `{`, `}`), or
/// `None` at end of input.
fn scan_param(bytes: &[u8], start: usize) -> (usize, Option<u8>) {
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => i = skip_string(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_comment(bytes, i),
            b @ (b';' | b'{' | b'}') => return (i, Some(b)),
            _ => i += 1,
        }
    }
    (bytes.len(), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::output::Printer;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_find_single_rule() {
        let css = "a { color: red; }\n@svgsprite icons;\n";
        let spans = find_at_rules(css);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].param, " icons");
        assert_eq!(&css[spans[0].start..spans[0].end], "@svgsprite icons;");
    }

    #[test]
    fn test_find_quoted_param_with_semicolon() {
        let css = "@svgsprite \"a;b\";";
        let spans = find_at_rules(css);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].param, " \"a;b\"");
        assert_eq!(spans[0].end, css.len());
    }

    #[test]
    fn test_find_skips_comments_and_strings() {
        let css = "/* @svgsprite old; */\na::before { content: \"@svgsprite x;\"; }\n@svgsprite 'new';";
        let spans = find_at_rules(css);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].param, " 'new'");
    }

    #[test]
    fn test_find_ignores_longer_names_and_blocks() {
        let css = "@svgsprites nope;\n@svgsprite icons { }\n@media print { @svgsprite print; }";
        let spans = find_at_rules(css);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].param, " print");
    }

    #[test]
    fn test_find_unterminated_statement() {
        let css = "@svgsprite icons";
        let spans = find_at_rules(css);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].end, css.len());
        assert_eq!(spans[0].param, " icons");
    }

    #[test]
    fn test_transform_without_rules_is_identity() {
        let dir = tempdir().unwrap();
        let pipeline = Pipeline::new(Config::new("svg", "out", "out"), dir.path())
            .unwrap()
            .with_printer(Printer::quiet());

        let css = "body { margin: 0; }\n";
        let output = transform(css, &pipeline).unwrap();

        assert_eq!(output.css, css);
        assert!(output.written.is_empty());
    }

    #[test]
    fn test_transform_splices_generated_css() {
        let dir = tempdir().unwrap();
        let icons = dir.path().join("svg/icons");
        fs::create_dir_all(&icons).unwrap();
        fs::write(
            icons.join("dot.svg"),
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8"><circle r="4"/></svg>"#,
        )
        .unwrap();

        let pipeline = Pipeline::new(Config::new("svg", "out/sprite", "out/css"), dir.path())
            .unwrap()
            .with_printer(Printer::quiet());

        let css = "h1 { margin: 0; }\n@svgsprite \"icons\";\np { margin: 0; }\n";
        let output = transform(css, &pipeline).unwrap();

        assert!(output.css.starts_with("h1 { margin: 0; }\n.svg__icons {"));
        assert!(output.css.contains(".svg__icons_dot {\n    width: 8px;"));
        assert!(output.css.contains("url(\"../sprite/icons.svg\")"));
        assert!(output.css.ends_with("}\n\n\np { margin: 0; }\n"));
        assert!(!output.css.contains("@svgsprite"));
        assert_eq!(output.written, vec![dir.path().join("out/sprite/icons.svg")]);
    }

    #[test]
    fn test_transform_empty_param_removes_rule() {
        let dir = tempdir().unwrap();
        let pipeline = Pipeline::new(Config::new("svg", "out", "out"), dir.path())
            .unwrap()
            .with_printer(Printer::quiet());

        let output = transform("a{}\n@svgsprite '';\nb{}", &pipeline).unwrap();

        assert_eq!(output.css, "a{}\n\nb{}");
        assert_eq!(output.diagnostics.len(), 1);
    }
}
