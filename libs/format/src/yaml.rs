//! YAML backend

use serde_yaml::{Mapping, Number, Value};
use sextant_explorer::{Dictionary, ExplorerValue, Path, PathElement};

use crate::{data_to_string, date_to_string, FormatError, Result};

pub(crate) fn decode(bytes: &[u8]) -> Result<ExplorerValue> {
    let value: Value = serde_yaml::from_slice(bytes)?;
    from_yaml(value, &Path::root())
}

pub(crate) fn encode(value: &ExplorerValue) -> Result<Vec<u8>> {
    let yaml = to_yaml(value);
    Ok(serde_yaml::to_string(&yaml)?.into_bytes())
}

fn from_yaml(value: Value, path: &Path) -> Result<ExplorerValue> {
    Ok(match value {
        Value::Null => return Err(FormatError::Null(path.clone())),
        Value::Bool(b) => ExplorerValue::Bool(b),
        Value::Number(n) => number(&n, path)?,
        Value::String(s) => ExplorerValue::String(s),
        Value::Sequence(items) => ExplorerValue::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| from_yaml(item, &path.appending(PathElement::Index(i as i64))))
                .collect::<Result<_>>()?,
        ),
        Value::Mapping(mapping) => {
            let mut dictionary = Dictionary::with_capacity(mapping.len());
            for (key, item) in mapping {
                let key = key_string(key, path)?;
                let item = from_yaml(item, &path.appending(PathElement::key(key.as_str())))?;
                dictionary.insert(key, item);
            }
            ExplorerValue::Dictionary(dictionary)
        }
        Value::Tagged(tagged) => {
            tracing::trace!(tag = %tagged.tag, path = %path, "ignoring YAML tag");
            from_yaml(tagged.value, path)?
        }
    })
}

fn number(n: &Number, path: &Path) -> Result<ExplorerValue> {
    if let Some(i) = n.as_i64() {
        return Ok(ExplorerValue::Int(i));
    }
    n.as_f64()
        .map(ExplorerValue::Double)
        .ok_or_else(|| FormatError::invalid(path, format!("unsupported number {}", n)))
}

/// Scalar mapping keys become strings, others are rejected
fn key_string(key: Value, path: &Path) -> Result<String> {
    match key {
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Tagged(tagged) => key_string(tagged.value, path),
        other => Err(FormatError::invalid(
            path,
            format!("unsupported mapping key {:?}", other),
        )),
    }
}

fn to_yaml(value: &ExplorerValue) -> Value {
    match value {
        ExplorerValue::String(s) => Value::String(s.clone()),
        ExplorerValue::Int(i) => Value::Number((*i).into()),
        ExplorerValue::Double(d) => Value::Number((*d).into()),
        ExplorerValue::Bool(b) => Value::Bool(*b),
        ExplorerValue::Data(data) => Value::String(data_to_string(data)),
        ExplorerValue::Date(date) => Value::String(date_to_string(date)),
        ExplorerValue::Array(items) => Value::Sequence(items.iter().map(to_yaml).collect()),
        ExplorerValue::Dictionary(dictionary) => {
            let mut mapping = Mapping::with_capacity(dictionary.len());
            for (key, item) in dictionary {
                mapping.insert(Value::String(key.clone()), to_yaml(item));
            }
            Value::Mapping(mapping)
        }
    }
}
