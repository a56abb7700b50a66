//! XML backend.
//!
//! ```xml
//! <document type="dictionary">
//!   <name>Tom</name>
//!   <age type="int">68</age>
//!   <hobbies type="array">
//!     <item>cooking</item>
//!   </hobbies>
//!   <entry key="not a tag" type="bool">true</entry>
//! </document>
//! ```
//!
//! Keys that are not valid element names are written as `<entry key="...">`.
//! An element without `type` holds a string, or a dictionary when it has child elements.

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use roxmltree::{Document, Node};
use sextant_explorer::{Dictionary, ExplorerValue, Path, PathElement};

use crate::{data_from_string, data_to_string, date_from_string, date_to_string, FormatError, Result};

const ROOT: &str = "document";
const ITEM: &str = "item";
const ENTRY: &str = "entry";

pub(crate) fn decode(bytes: &[u8]) -> Result<ExplorerValue> {
    let text = std::str::from_utf8(bytes)?;
    let doc = Document::parse(text)?;
    from_element(doc.root_element(), &Path::root())
}

pub(crate) fn encode(value: &ExplorerValue) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, ROOT, None, value)?;

    let mut bytes = writer.into_inner().into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

fn type_name(value: &ExplorerValue) -> Option<&'static str> {
    match value {
        ExplorerValue::String(_) => None,
        ExplorerValue::Int(_) => Some("int"),
        ExplorerValue::Double(_) => Some("double"),
        ExplorerValue::Bool(_) => Some("bool"),
        ExplorerValue::Data(_) => Some("data"),
        ExplorerValue::Date(_) => Some("date"),
        ExplorerValue::Array(_) => Some("array"),
        ExplorerValue::Dictionary(_) => Some("dictionary"),
    }
}

fn write_element(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    name: &str,
    key: Option<&str>,
    value: &ExplorerValue,
) -> Result<()> {
    let mut start = BytesStart::new(name);
    if let Some(key) = key {
        start.push_attribute(("key", key));
    }
    if let Some(type_name) = type_name(value) {
        start.push_attribute(("type", type_name));
    }

    let text = match value {
        ExplorerValue::Array(items) => {
            if items.is_empty() {
                writer.write_event(Event::Empty(start))?;
                return Ok(());
            }
            writer.write_event(Event::Start(start))?;
            for item in items {
                write_element(writer, ITEM, None, item)?;
            }
            writer.write_event(Event::End(BytesEnd::new(name)))?;
            return Ok(());
        }
        ExplorerValue::Dictionary(dictionary) => {
            if dictionary.is_empty() {
                writer.write_event(Event::Empty(start))?;
                return Ok(());
            }
            writer.write_event(Event::Start(start))?;
            for (key, item) in dictionary {
                if is_element_name(key) {
                    write_element(writer, key, None, item)?;
                } else {
                    write_element(writer, ENTRY, Some(key), item)?;
                }
            }
            writer.write_event(Event::End(BytesEnd::new(name)))?;
            return Ok(());
        }
        ExplorerValue::String(s) => s.clone(),
        ExplorerValue::Int(i) => i.to_string(),
        ExplorerValue::Double(d) => d.to_string(),
        ExplorerValue::Bool(b) => b.to_string(),
        ExplorerValue::Data(data) => data_to_string(data),
        ExplorerValue::Date(date) => date_to_string(date),
    };

    if text.is_empty() {
        writer.write_event(Event::Empty(start))?;
    } else {
        writer.write_event(Event::Start(start))?;
        writer.write_event(Event::Text(BytesText::new(&text)))?;
        writer.write_event(Event::End(BytesEnd::new(name)))?;
    }
    Ok(())
}

/// Conservative XML name check: no namespaces, no reserved `xml` prefix
fn is_element_name(key: &str) -> bool {
    let mut chars = key.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !key.to_ascii_lowercase().starts_with("xml")
        && key != ENTRY
}

fn text_of(node: Node<'_, '_>) -> String {
    node.children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect()
}

fn from_element(node: Node<'_, '_>, path: &Path) -> Result<ExplorerValue> {
    let has_children = node.children().any(|child| child.is_element());
    let type_name = match node.attribute("type") {
        Some(type_name) => type_name,
        None if has_children => "dictionary",
        None => "string",
    };

    let scalar = || text_of(node);
    Ok(match type_name {
        "string" => ExplorerValue::String(scalar()),
        "int" => {
            let text = scalar();
            let i = text.trim().parse::<i64>().map_err(|e| {
                FormatError::invalid(path, format!("invalid int '{}': {}", text, e))
            })?;
            ExplorerValue::Int(i)
        }
        "double" => {
            let text = scalar();
            let d = text.trim().parse::<f64>().map_err(|e| {
                FormatError::invalid(path, format!("invalid double '{}': {}", text, e))
            })?;
            ExplorerValue::Double(d)
        }
        "bool" => match scalar().trim() {
            "true" => ExplorerValue::Bool(true),
            "false" => ExplorerValue::Bool(false),
            other => {
                return Err(FormatError::invalid(
                    path,
                    format!("invalid bool '{}'", other),
                ))
            }
        },
        "data" => ExplorerValue::Data(data_from_string(&scalar())?),
        "date" => ExplorerValue::Date(date_from_string(&scalar(), path)?),
        "array" => ExplorerValue::Array(
            node.children()
                .filter(|child| child.is_element())
                .enumerate()
                .map(|(i, child)| from_element(child, &path.appending(PathElement::Index(i as i64))))
                .collect::<Result<_>>()?,
        ),
        "dictionary" => {
            let mut dictionary = Dictionary::new();
            for child in node.children().filter(|child| child.is_element()) {
                let key = match child.attribute("key") {
                    Some(key) => key.to_string(),
                    None => child.tag_name().name().to_string(),
                };
                let item = from_element(child, &path.appending(PathElement::key(key.as_str())))?;
                if dictionary.insert(key, item).is_some() {
                    tracing::debug!(path = %path, "duplicate XML key, keeping the last one");
                }
            }
            ExplorerValue::Dictionary(dictionary)
        }
        other => {
            return Err(FormatError::invalid(
                path,
                format!("unknown type attribute '{}'", other),
            ))
        }
    })
}
