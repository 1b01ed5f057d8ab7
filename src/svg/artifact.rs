//! Sprite document format.
//!
//! A sprite is an SVG document whose root carries the canvas size plus two
//! metadata attributes, the sprite fingerprint and the shape count. Each
//! top-level child is an icon's own `<svg>` root, positioned with `x`/`y`
//! and tagged with the shape name, so a later pass can rebuild every
//! [`Shape`] without touching the source icons.

use std::path::PathBuf;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Result, SpriteError};
use crate::fingerprint::Fingerprint;
use crate::shape::Shape;

use super::{attr_value, copy_root, is_svg_element, parse_dimension};

/// Root attribute holding the sprite fingerprint.
pub const FINGERPRINT_ATTR: &str = "data-fingerprint";

/// Root attribute holding the number of embedded shapes.
pub const COUNT_ATTR: &str = "data-count";

/// Child attribute holding the shape name.
pub const NAME_ATTR: &str = "data-name";

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// A freshly packed sprite, ready to be written.
#[derive(Debug, Clone)]
pub struct SpriteArtifact {
    pub width: u32,
    pub height: u32,
    pub fingerprint: Fingerprint,
    /// Placed shapes, in source order.
    pub shapes: Vec<Shape>,
}

impl SpriteArtifact {
    pub fn count(&self) -> usize {
        self.shapes.len()
    }

    /// Serialize the whole sprite document.
    pub fn to_svg(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());

        emit(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
        )?;

        let width = self.width.to_string();
        let height = self.height.to_string();
        let count = self.count().to_string();
        let mut root = BytesStart::new("svg");
        root.push_attribute(("version", "1.1"));
        root.push_attribute(("xmlns", SVG_NS));
        root.push_attribute(("xmlns:xlink", XLINK_NS));
        root.push_attribute(("width", width.as_str()));
        root.push_attribute(("height", height.as_str()));
        root.push_attribute((FINGERPRINT_ATTR, self.fingerprint.as_str()));
        root.push_attribute((COUNT_ATTR, count.as_str()));
        emit(&mut writer, Event::Start(root))?;

        for shape in &self.shapes {
            let x = shape.x.to_string();
            let y = shape.y.to_string();
            let overrides = [
                ("x", x.as_str()),
                ("y", y.as_str()),
                (NAME_ATTR, shape.name.as_str()),
            ];

            match &shape.markup {
                Some(markup) => {
                    copy_root(markup, &overrides, &mut writer).map_err(|message| {
                        SpriteError::Parse {
                            path: PathBuf::from(format!("{}.svg", shape.name)),
                            message,
                        }
                    })?;
                }
                None => {
                    let width = shape.width.to_string();
                    let height = shape.height.to_string();
                    let mut child = BytesStart::new("svg");
                    child.push_attribute(("width", width.as_str()));
                    child.push_attribute(("height", height.as_str()));
                    for attr in overrides {
                        child.push_attribute(attr);
                    }
                    emit(&mut writer, Event::Empty(child))?;
                }
            }
        }

        emit(&mut writer, Event::End(BytesEnd::new("svg")))?;

        String::from_utf8(writer.into_inner()).map_err(|e| SpriteError::Pack {
            message: format!("Sprite is not valid UTF-8: {}", e),
        })
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer.write_event(event).map_err(|e| SpriteError::Pack {
        message: format!("Failed to serialize sprite: {}", e),
    })
}

/// Metadata and shapes read back from a sprite on disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedSprite {
    pub width: u32,
    pub height: u32,
    /// `None` when the attribute is absent.
    pub fingerprint: Option<Fingerprint>,
    /// `None` when the attribute is absent or not a number.
    pub count: Option<usize>,
    /// Shapes rebuilt from the top-level `<svg>` children.
    pub shapes: Vec<Shape>,
}

impl PersistedSprite {
    /// Parse a sprite document.
    ///
    /// The error is a description of why the document is malformed; the
    /// caller attaches the path.
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        let mut reader = Reader::from_str(text);
        let mut sprite = PersistedSprite::default();
        let mut depth: usize = 0;
        let mut seen_root = false;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| format!("{} (at byte {})", e, reader.error_position()))?;

            match event {
                Event::Eof => break,
                Event::Start(e) | Event::Empty(e) if depth == 0 && seen_root => {
                    return Err(format!(
                        "unexpected second root element <{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    ));
                }
                Event::Start(e) if depth == 0 => {
                    sprite.read_root(&e)?;
                    seen_root = true;
                    depth = 1;
                }
                Event::Empty(e) if depth == 0 => {
                    sprite.read_root(&e)?;
                    seen_root = true;
                }
                Event::Start(e) => {
                    if depth == 1 && is_svg_element(&e) {
                        sprite.shapes.push(read_shape(&e)?);
                    }
                    depth += 1;
                }
                Event::Empty(e) => {
                    if depth == 1 && is_svg_element(&e) {
                        sprite.shapes.push(read_shape(&e)?);
                    }
                }
                Event::End(_) => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| "unmatched closing tag".to_string())?;
                }
                _ => {}
            }
        }

        if depth != 0 {
            return Err("unclosed root element".to_string());
        }
        if !seen_root {
            return Err("no root element".to_string());
        }

        Ok(sprite)
    }

    fn read_root(&mut self, start: &BytesStart<'_>) -> std::result::Result<(), String> {
        if !is_svg_element(start) {
            return Err(format!(
                "root element is <{}>, expected <svg>",
                String::from_utf8_lossy(start.name().as_ref())
            ));
        }

        for attr in start.attributes() {
            let attr = attr.map_err(|e| format!("bad attribute on root element: {}", e))?;
            let key = attr.key.as_ref();
            if key == b"width" {
                self.width = parse_dimension(&attr_value(&attr.value)?);
            } else if key == b"height" {
                self.height = parse_dimension(&attr_value(&attr.value)?);
            } else if key == FINGERPRINT_ATTR.as_bytes() {
                self.fingerprint = Some(Fingerprint::from_stored(attr_value(&attr.value)?));
            } else if key == COUNT_ATTR.as_bytes() {
                self.count = attr_value(&attr.value)?.trim().parse().ok();
            }
        }

        Ok(())
    }
}

/// Rebuild a shape from a child `<svg>` element.
///
/// Missing `x`/`y` default to 0; some optimizers strip zero-valued
/// attributes.
fn read_shape(start: &BytesStart<'_>) -> std::result::Result<Shape, String> {
    let mut shape = Shape::new(String::new(), 0, 0);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("bad attribute on embedded shape: {}", e))?;
        let key = attr.key.as_ref();
        if key == NAME_ATTR.as_bytes() {
            shape.name = attr_value(&attr.value)?;
            continue;
        }

        let target = match key {
            b"width" => &mut shape.width,
            b"height" => &mut shape.height,
            b"x" => &mut shape.x,
            b"y" => &mut shape.y,
            _ => continue,
        };
        *target = parse_dimension(&attr_value(&attr.value)?);
    }

    Ok(shape)
}
