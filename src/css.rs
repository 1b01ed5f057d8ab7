//! CSS generation for a sprite.
//!
//! One shared rule points every icon class at the sprite image; one rule
//! per shape sets its size and shifts the background to its offset.

use std::fmt::Write;

use crate::shape::Shape;

/// Class naming and sprite location for one sprite's CSS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssOptions {
    /// Class prefix, e.g. `svg_`.
    pub namespace: String,
    /// Block name, the icon directory name.
    pub block: String,
    /// Separator between class segments.
    pub separator: String,
    /// Sprite URL relative to the stylesheet.
    pub sprite_url: String,
}

impl CssOptions {
    /// Selector of the shared rule: `.<namespace><sep><block>`.
    pub fn block_selector(&self) -> String {
        format!(".{}{}{}", self.namespace, self.separator, self.block)
    }

    /// Selector of one shape's rule: `.<namespace><sep><block><sep><name>`.
    pub fn shape_selector(&self, name: &str) -> String {
        format!("{}{}{}", self.block_selector(), self.separator, name)
    }
}

/// Generate the CSS for `shapes`: shared rule first, then one rule per
/// shape in input order.
///
/// Names are used verbatim; characters that are not valid in a class
/// name are the caller's problem.
pub fn emit(shapes: &[Shape], options: &CssOptions) -> String {
    let mut css = String::new();

    let background = format!("url(\"{}\") left top no-repeat", options.sprite_url);
    push_rule(
        &mut css,
        &options.block_selector(),
        &[
            ("background", background.as_str()),
            ("display", "inline-block"),
            ("overflow", "hidden"),
            ("font-size", "0"),
            ("line-height", "0"),
            ("vertical-align", "top"),
        ],
    );

    for shape in shapes {
        let width = format!("{}px", shape.width);
        let height = format!("{}px", shape.height);
        let position = format!("{} {}", offset(shape.x), offset(shape.y));
        push_rule(
            &mut css,
            &options.shape_selector(&shape.name),
            &[
                ("width", width.as_str()),
                ("height", height.as_str()),
                ("background-position", position.as_str()),
            ],
        );
    }

    css
}

/// Background offset for a coordinate; zero is written as a bare `0`.
fn offset(value: u32) -> String {
    if value == 0 {
        "0".to_string()
    } else {
        format!("-{}px", value)
    }
}

fn push_rule(css: &mut String, selector: &str, declarations: &[(&str, &str)]) {
    css.push_str(selector);
    css.push_str(" {");
    for (property, value) in declarations {
        let _ = write!(css, "\n    {}: {};", property.trim(), value.trim());
    }
    css.push_str("\n}\n\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn options() -> CssOptions {
        CssOptions {
            namespace: "svg_".to_string(),
            block: "icons".to_string(),
            separator: "_".to_string(),
            sprite_url: "../sprite/icons.svg".to_string(),
        }
    }

    #[test]
    fn test_emit_full_output() {
        let shapes = vec![
            Shape::new("a", 80, 40).at(0, 0),
            Shape::new("b", 30, 30).at(90, 0),
        ];

        let css = emit(&shapes, &options());

        assert_eq!(
            css,
            r#".svg__icons {
    background: url("../sprite/icons.svg") left top no-repeat;
    display: inline-block;
    overflow: hidden;
    font-size: 0;
    line-height: 0;
    vertical-align: top;
}

.svg__icons_a {
    width: 80px;
    height: 40px;
    background-position: 0 0;
}

.svg__icons_b {
    width: 30px;
    height: 30px;
    background-position: -90px 0;
}

"#
        );
    }

    #[test]
    fn test_emit_without_shapes_has_only_shared_rule() {
        let css = emit(&[], &options());
        assert!(css.starts_with(".svg__icons {"));
        assert_eq!(css.matches('{').count(), 1);
    }

    #[test]
    fn test_emit_both_offsets() {
        let css = emit(&[Shape::new("c", 8, 8).at(12, 34)], &options());
        assert!(css.contains("background-position: -12px -34px;"));
    }

    #[test]
    fn test_emit_keeps_input_order() {
        let shapes = vec![Shape::new("zeta", 1, 1), Shape::new("alpha", 1, 1)];
        let css = emit(&shapes, &options());
        let zeta = css.find(".svg__icons_zeta").unwrap();
        let alpha = css.find(".svg__icons_alpha").unwrap();
        assert!(zeta < alpha);
    }

    #[test]
    fn test_selectors_use_separator() {
        let options = CssOptions {
            namespace: "demo".to_string(),
            separator: "-".to_string(),
            ..options()
        };
        assert_eq!(options.block_selector(), ".demo-icons");
        assert_eq!(options.shape_selector("close"), ".demo-icons-close");
    }

    #[test]
    fn test_offset_zero_suppression() {
        assert_eq!(offset(0), "0");
        assert_eq!(offset(10), "-10px");
    }
}
