//! Shape extraction from source icons.

use quick_xml::Writer;
use rayon::prelude::*;

use crate::discovery::SourceSvg;
use crate::error::{Result, SpriteError};
use crate::shape::Shape;

use super::copy_root;

/// Turn one source icon into an unplaced [`Shape`].
///
/// The root element must be `<svg>`. Missing or non-numeric `width` and
/// `height` attributes resolve to 0 rather than failing the build.
pub fn extract(source: &SourceSvg) -> Result<Shape> {
    let parse_error = |message: String| SpriteError::Parse {
        path: source.path.clone(),
        message,
    };

    let text = std::str::from_utf8(&source.contents)
        .map_err(|e| parse_error(format!("not valid UTF-8: {}", e)))?;

    let mut writer = Writer::new(Vec::with_capacity(text.len()));
    let info = copy_root(text, &[], &mut writer).map_err(parse_error)?;
    let markup = String::from_utf8(writer.into_inner())
        .map_err(|e| parse_error(format!("not valid UTF-8: {}", e)))?;

    Ok(Shape {
        name: source.name(),
        width: info.width,
        height: info.height,
        x: 0,
        y: 0,
        markup: Some(markup),
        fingerprint: Some(source.fingerprint.clone()),
    })
}

/// Extract every source, preserving input order.
pub fn extract_all(sources: &[SourceSvg]) -> Result<Vec<Shape>> {
    sources.par_iter().map(extract).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_reads_size_and_name() {
        let source = SourceSvg::new(
            "/icons/arrow.svg",
            r#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg" width="80" height="40"><rect width="80" height="40"/></svg>"#,
        );
        let shape = extract(&source).unwrap();

        assert_eq!(shape.name, "arrow");
        assert_eq!(shape.size(), (80, 40));
        assert_eq!((shape.x, shape.y), (0, 0));
        assert_eq!(shape.fingerprint.as_ref(), Some(&source.fingerprint));

        let markup = shape.markup.unwrap();
        assert!(markup.starts_with("<svg "));
        assert!(!markup.contains("<?xml"));
    }

    #[test]
    fn test_extract_degrades_missing_size() {
        let source = SourceSvg::new("/icons/blank.svg", r#"<svg viewBox="0 0 24 24"/>"#);
        let shape = extract(&source).unwrap();
        assert_eq!(shape.size(), (0, 0));
    }

    #[test]
    fn test_extract_degrades_non_numeric_size() {
        let source = SourceSvg::new("/icons/odd.svg", r#"<svg width="auto" height="32px"/>"#);
        let shape = extract(&source).unwrap();
        assert_eq!(shape.size(), (0, 32));
    }

    #[test]
    fn test_extract_rejects_malformed_markup() {
        let source = SourceSvg::new("/icons/broken.svg", "<svg width=\"1\"><g></svg>");
        let err = extract(&source).unwrap_err();
        assert!(matches!(err, SpriteError::Parse { .. }));
    }

    #[test]
    fn test_extract_rejects_undefined_entity() {
        let source = SourceSvg::new("/icons/nbsp.svg", "<svg width=\"1\"><text>&nbsp;</text></svg>");
        let err = extract(&source).unwrap_err();
        assert!(matches!(err, SpriteError::Parse { ref message, .. } if message.contains("&nbsp;")));
    }

    #[test]
    fn test_extract_expands_declared_entities() {
        let source = SourceSvg::new(
            "/icons/ai.svg",
            "<!DOCTYPE svg [<!ENTITY w \"16\"><!ENTITY ns_x \"http://ns.example/x\">]>\n<svg xmlns:x=\"&ns_x;\" width=\"&w;\" height=\"8\"><x:meta>&ns_x;</x:meta></svg>",
        );
        let shape = extract(&source).unwrap();

        assert_eq!((shape.width, shape.height), (16, 8));
        let markup = shape.markup.unwrap();
        assert!(markup.contains("xmlns:x=\"http://ns.example/x\""));
        assert!(!markup.contains("&ns_x;"));
    }

    #[test]
    fn test_extract_rejects_binary_content() {
        let source = SourceSvg::new("/icons/icon.svg", vec![0xff, 0xfe, 0x00]);
        assert!(extract(&source).is_err());
    }

    #[test]
    fn test_extract_all_preserves_order() {
        let sources: Vec<SourceSvg> = (0..8)
            .map(|i| {
                SourceSvg::new(
                    format!("/icons/i{}.svg", i),
                    format!(r#"<svg width="{}" height="1"/>"#, i + 1),
                )
            })
            .collect();

        let shapes = extract_all(&sources).unwrap();
        let names: Vec<_> = shapes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["i0", "i1", "i2", "i3", "i4", "i5", "i6", "i7"]);
        assert_eq!(shapes[7].width, 8);
    }
}
