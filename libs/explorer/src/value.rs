//! Canonical value model shared by every document format
//!
//! Every backend maps its native values onto exactly one `ExplorerValue` variant.
//! Dictionaries keep insertion order for output but compare without regard to order.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;

/// Ordered dictionary used by [`ExplorerValue::Dictionary`].
pub type Dictionary = IndexMap<String, ExplorerValue>;

/// Format-independent document value
#[derive(Debug, Clone, PartialEq)]
pub enum ExplorerValue {
    String(String),
    Int(i64),
    Double(f64),
    Bool(bool),
    Data(Vec<u8>),
    Date(DateTime<Utc>),
    Dictionary(Dictionary),
    Array(Vec<ExplorerValue>),
}

/// Name of an [`ExplorerValue`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    String,
    Int,
    Double,
    Bool,
    Data,
    Date,
    Dictionary,
    Array,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Int => "int",
            ValueKind::Double => "double",
            ValueKind::Bool => "bool",
            ValueKind::Data => "data",
            ValueKind::Date => "date",
            ValueKind::Dictionary => "dictionary",
            ValueKind::Array => "array",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ExplorerValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            ExplorerValue::String(_) => ValueKind::String,
            ExplorerValue::Int(_) => ValueKind::Int,
            ExplorerValue::Double(_) => ValueKind::Double,
            ExplorerValue::Bool(_) => ValueKind::Bool,
            ExplorerValue::Data(_) => ValueKind::Data,
            ExplorerValue::Date(_) => ValueKind::Date,
            ExplorerValue::Dictionary(_) => ValueKind::Dictionary,
            ExplorerValue::Array(_) => ValueKind::Array,
        }
    }

    /// Empty dictionary
    pub fn dictionary() -> Self {
        ExplorerValue::Dictionary(Dictionary::new())
    }

    /// Empty array
    pub fn array() -> Self {
        ExplorerValue::Array(Vec::new())
    }

    /// Infer a scalar from user-provided text.
    ///
    /// `true`/`false` become booleans, integer text an int, floating text a double.
    /// Anything else stays a string.
    pub fn from_literal(text: &str) -> Self {
        match text {
            "true" => return ExplorerValue::Bool(true),
            "false" => return ExplorerValue::Bool(false),
            _ => {}
        }
        if let Ok(int) = text.parse::<i64>() {
            return ExplorerValue::Int(int);
        }
        let looks_numeric = text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
            && text.chars().any(|c| c.is_ascii_digit());
        if looks_numeric {
            if let Ok(double) = text.parse::<f64>() {
                return ExplorerValue::Double(double);
            }
        }
        ExplorerValue::String(text.to_string())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ExplorerValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ExplorerValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view: ints widen to `f64`.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            ExplorerValue::Double(d) => Some(*d),
            ExplorerValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ExplorerValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            ExplorerValue::Data(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            ExplorerValue::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<ExplorerValue>> {
        match self {
            ExplorerValue::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            ExplorerValue::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// True for arrays and dictionaries
    pub fn is_group(&self) -> bool {
        matches!(self, ExplorerValue::Array(_) | ExplorerValue::Dictionary(_))
    }

    pub fn is_single(&self) -> bool {
        !self.is_group()
    }

    /// True for an array or dictionary without children
    pub fn is_empty_group(&self) -> bool {
        match self {
            ExplorerValue::Array(a) => a.is_empty(),
            ExplorerValue::Dictionary(d) => d.is_empty(),
            _ => false,
        }
    }

    /// Number of children of a group, `None` for single values
    pub fn count(&self) -> Option<usize> {
        match self {
            ExplorerValue::Array(a) => Some(a.len()),
            ExplorerValue::Dictionary(d) => Some(d.len()),
            _ => None,
        }
    }
}

pub(crate) fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl fmt::Display for ExplorerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExplorerValue::String(s) => f.write_str(s),
            ExplorerValue::Int(i) => write!(f, "{}", i),
            ExplorerValue::Double(d) => write!(f, "{}", d),
            ExplorerValue::Bool(b) => write!(f, "{}", b),
            ExplorerValue::Data(d) => write!(f, "<{} bytes>", d.len()),
            ExplorerValue::Date(d) => f.write_str(&format_date(d)),
            ExplorerValue::Dictionary(dict) => {
                f.write_str("{")?;
                for (i, (key, value)) in dict.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
            ExplorerValue::Array(items) => {
                f.write_str("[")?;
                for (i, value) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<String> for ExplorerValue {
    fn from(value: String) -> Self {
        ExplorerValue::String(value)
    }
}

impl From<&str> for ExplorerValue {
    fn from(value: &str) -> Self {
        ExplorerValue::String(value.to_string())
    }
}

impl From<i64> for ExplorerValue {
    fn from(value: i64) -> Self {
        ExplorerValue::Int(value)
    }
}

impl From<i32> for ExplorerValue {
    fn from(value: i32) -> Self {
        ExplorerValue::Int(value.into())
    }
}

impl From<f64> for ExplorerValue {
    fn from(value: f64) -> Self {
        ExplorerValue::Double(value)
    }
}

impl From<bool> for ExplorerValue {
    fn from(value: bool) -> Self {
        ExplorerValue::Bool(value)
    }
}

impl From<Vec<u8>> for ExplorerValue {
    fn from(value: Vec<u8>) -> Self {
        ExplorerValue::Data(value)
    }
}

impl From<DateTime<Utc>> for ExplorerValue {
    fn from(value: DateTime<Utc>) -> Self {
        ExplorerValue::Date(value)
    }
}

impl From<Vec<ExplorerValue>> for ExplorerValue {
    fn from(value: Vec<ExplorerValue>) -> Self {
        ExplorerValue::Array(value)
    }
}

impl From<Dictionary> for ExplorerValue {
    fn from(value: Dictionary) -> Self {
        ExplorerValue::Dictionary(value)
    }
}

impl<K: Into<String>, V: Into<ExplorerValue>> FromIterator<(K, V)> for ExplorerValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ExplorerValue::Dictionary(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
