//! SVG handling for sprites.
//!
//! Not a general SVG model. Icons are streamed through `quick-xml` once to
//! read the root element's size and strip the document prolog, and the
//! same routine re-emits them as nested `<svg>` fragments inside a sprite.
//! Entities declared in an icon's DOCTYPE are expanded on the way through,
//! since the DOCTYPE itself does not survive embedding.
//!
//! - [`extract`]: source file → [`Shape`](crate::Shape)
//! - [`artifact`]: sprite document serialization and read-back

mod artifact;
mod extract;

use std::collections::HashMap;
use std::io::Write;

use quick_xml::escape::{resolve_predefined_entity, unescape, unescape_with};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

pub use artifact::{PersistedSprite, SpriteArtifact, COUNT_ATTR, FINGERPRINT_ATTR, NAME_ATTR};
pub use extract::{extract, extract_all};

/// Size read from a root `<svg>` element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RootInfo {
    pub width: u32,
    pub height: u32,
}

/// Parse a length attribute the way a lenient browser-side parser does:
/// leading integer digits only, anything unparseable is 0.
///
/// `"24"` → 24, `"24px"` → 24, `"12.7"` → 12, `"auto"` → 0.
pub fn parse_dimension(value: &str) -> u32 {
    let value = value.trim_start();
    let value = value.strip_prefix('+').unwrap_or(value);
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value[..end].parse().unwrap_or(0)
}

/// Internal entities declared in a DOCTYPE, name to replacement text.
type Entities = HashMap<String, String>;

/// Decode and unescape a raw attribute value.
pub(crate) fn attr_value(raw: &[u8]) -> Result<String, String> {
    attr_value_with(raw, &Entities::new())
}

/// Decode a raw attribute value, resolving declared entities as well as
/// the predefined ones.
fn attr_value_with(raw: &[u8], entities: &Entities) -> Result<String, String> {
    let text = std::str::from_utf8(raw).map_err(|e| format!("invalid UTF-8 in attribute: {}", e))?;
    unescape_with(text, |name| {
        entities
            .get(name)
            .map(String::as_str)
            .or_else(|| resolve_predefined_entity(name))
    })
    .map(|v| v.into_owned())
    .map_err(|e| format!("invalid attribute value {:?}: {}", text, e))
}

/// Whether a raw value references something other than a predefined
/// entity or a character reference.
fn needs_expansion(raw: &[u8]) -> bool {
    raw.contains(&b'&') && std::str::from_utf8(raw).map_or(true, |text| unescape(text).is_err())
}

/// Collect the internal general entities of a DOCTYPE.
///
/// Parameter entities are skipped; external ones stay undeclared, so a
/// reference to them fails later.
fn declared_entities(doctype: &str) -> Result<Entities, String> {
    const DECL: &str = "<!ENTITY";

    let mut entities = Entities::new();
    let mut rest = doctype;

    while let Some(at) = rest.find(DECL) {
        rest = rest[at + DECL.len()..].trim_start();
        if rest.starts_with('%') {
            continue;
        }

        let name_end = rest
            .find(char::is_whitespace)
            .ok_or_else(|| "unterminated entity declaration".to_string())?;
        let name = &rest[..name_end];
        rest = rest[name_end..].trim_start();

        let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            continue;
        };
        let body = &rest[1..];
        let close = body
            .find(quote)
            .ok_or_else(|| format!("unterminated value for entity {}", name))?;

        let value = unescape_with(&body[..close], |n| {
            entities
                .get(n)
                .map(String::as_str)
                .or_else(|| resolve_predefined_entity(n))
        })
        .map_err(|e| format!("invalid value for entity {}: {}", name, e))?
        .into_owned();

        entities.insert(name.to_string(), value);
        rest = &body[close + 1..];
    }

    Ok(entities)
}

/// Rebuild an element whose attributes reference declared entities.
/// `None` when it can be copied as is.
fn expand_element(
    start: &BytesStart<'_>,
    entities: &Entities,
) -> Result<Option<BytesStart<'static>>, String> {
    let mut expand = false;
    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("bad attribute: {}", e))?;
        if needs_expansion(&attr.value) {
            expand = true;
            break;
        }
    }
    if !expand {
        return Ok(None);
    }

    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = BytesStart::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("bad attribute: {}", e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        element.push_attribute((key.as_str(), attr_value_with(&attr.value, entities)?.as_str()));
    }
    Ok(Some(element))
}

/// Whether an element is an `<svg>` element, with or without a prefix.
pub(crate) fn is_svg_element(start: &BytesStart<'_>) -> bool {
    start.local_name().as_ref() == b"svg"
}

/// Stream the root element of `markup` into `writer`.
///
/// Everything outside the root element (XML declaration, doctype,
/// processing instructions, comments, whitespace) is dropped. Root
/// attributes named in `overrides` are replaced by the given values,
/// which are appended after the kept attributes.
pub(crate) fn copy_root<W: Write>(
    markup: &str,
    overrides: &[(&str, &str)],
    writer: &mut Writer<W>,
) -> Result<RootInfo, String> {
    let mut reader = Reader::from_str(markup);
    let mut depth: usize = 0;
    let mut info: Option<RootInfo> = None;
    let mut entities = Entities::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("{} (at byte {})", e, reader.error_position()))?;

        match event {
            Event::Eof => break,
            Event::Start(e) | Event::Empty(e) if depth == 0 && info.is_some() => {
                return Err(format!(
                    "unexpected second root element <{}>",
                    String::from_utf8_lossy(e.name().as_ref())
                ));
            }
            Event::DocType(e) if depth == 0 => {
                let doctype = std::str::from_utf8(&e)
                    .map_err(|err| format!("invalid UTF-8 in DOCTYPE: {}", err))?;
                entities = declared_entities(doctype)?;
            }
            Event::Start(e) if depth == 0 => {
                let (root, size) = rewrite_root(&e, overrides, &entities)?;
                info = Some(size);
                depth = 1;
                write(writer, Event::Start(root))?;
            }
            Event::Empty(e) if depth == 0 => {
                let (root, size) = rewrite_root(&e, overrides, &entities)?;
                info = Some(size);
                write(writer, Event::Empty(root))?;
            }
            Event::Start(e) => {
                depth += 1;
                match expand_element(&e, &entities)? {
                    Some(expanded) => write(writer, Event::Start(expanded))?,
                    None => write(writer, Event::Start(e))?,
                }
            }
            Event::Empty(e) => match expand_element(&e, &entities)? {
                Some(expanded) => write(writer, Event::Empty(expanded))?,
                None => write(writer, Event::Empty(e))?,
            },
            Event::End(e) => {
                if depth == 0 {
                    return Err(format!(
                        "unmatched closing tag </{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    ));
                }
                depth -= 1;
                write(writer, Event::End(e))?;
            }
            // Prolog and epilog
            _ if depth == 0 => {}
            Event::GeneralRef(e) => {
                let name = e
                    .decode()
                    .map_err(|err| format!("invalid entity reference: {:?}", err))?
                    .into_owned();
                if e.is_char_ref() || resolve_predefined_entity(&name).is_some() {
                    write(writer, Event::GeneralRef(e))?;
                } else if let Some(value) = entities.get(&name) {
                    write(writer, Event::Text(BytesText::new(value)))?;
                } else {
                    return Err(format!("undefined entity &{};", name));
                }
            }
            other => write(writer, other)?,
        }
    }

    if depth != 0 {
        return Err("unclosed root element".to_string());
    }

    info.ok_or_else(|| "no root element".to_string())
}

fn rewrite_root(
    start: &BytesStart<'_>,
    overrides: &[(&str, &str)],
    entities: &Entities,
) -> Result<(BytesStart<'static>, RootInfo), String> {
    if !is_svg_element(start) {
        return Err(format!(
            "root element is <{}>, expected <svg>",
            String::from_utf8_lossy(start.name().as_ref())
        ));
    }

    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut root = BytesStart::new(name);
    let mut info = RootInfo::default();

    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("bad attribute on root element: {}", e))?;
        let key = attr.key.as_ref();

        match key {
            b"width" => info.width = parse_dimension(&attr_value_with(&attr.value, entities)?),
            b"height" => info.height = parse_dimension(&attr_value_with(&attr.value, entities)?),
            _ => {}
        }

        if overrides.iter().any(|(k, _)| k.as_bytes() == key) {
            continue;
        }
        if attr.value.contains(&b'"') || needs_expansion(&attr.value) {
            // Re-escape for double quotes, with declared entities expanded
            let key = String::from_utf8_lossy(key).into_owned();
            root.push_attribute((key.as_str(), attr_value_with(&attr.value, entities)?.as_str()));
        } else {
            root.push_attribute((key, attr.value.as_ref()));
        }
    }

    for &(key, value) in overrides {
        root.push_attribute((key, value));
    }

    Ok((root, info))
}

fn write<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), String> {
    writer
        .write_event(event)
        .map_err(|e| format!("failed to write markup: {}", e))
}
