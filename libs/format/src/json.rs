//! JSON backend

use serde_json::{Map, Number, Value};
use sextant_explorer::{Dictionary, ExplorerValue, Path, PathElement};

use crate::{data_to_string, date_to_string, FormatError, Result};

pub(crate) fn decode(bytes: &[u8]) -> Result<ExplorerValue> {
    let value: Value = serde_json::from_slice(bytes)?;
    from_json(value, &Path::root())
}

pub(crate) fn encode(value: &ExplorerValue) -> Result<Vec<u8>> {
    let json = to_json(value, &Path::root())?;
    let mut bytes = serde_json::to_vec_pretty(&json)?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn from_json(value: Value, path: &Path) -> Result<ExplorerValue> {
    Ok(match value {
        Value::Null => return Err(FormatError::Null(path.clone())),
        Value::Bool(b) => ExplorerValue::Bool(b),
        Value::Number(n) => number(&n, path)?,
        Value::String(s) => ExplorerValue::String(s),
        Value::Array(items) => ExplorerValue::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| from_json(item, &path.appending(PathElement::Index(i as i64))))
                .collect::<Result<_>>()?,
        ),
        Value::Object(map) => {
            let mut dictionary = Dictionary::with_capacity(map.len());
            for (key, item) in map {
                let item = from_json(item, &path.appending(PathElement::key(key.as_str())))?;
                dictionary.insert(key, item);
            }
            ExplorerValue::Dictionary(dictionary)
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

fn to_json(value: &ExplorerValue, path: &Path) -> Result<Value> {
    Ok(match value {
        ExplorerValue::String(s) => Value::String(s.clone()),
        ExplorerValue::Int(i) => Value::Number((*i).into()),
        ExplorerValue::Double(d) => Number::from_f64(*d)
            .map(Value::Number)
            .ok_or_else(|| FormatError::invalid(path, format!("{} is not a finite number", d)))?,
        ExplorerValue::Bool(b) => Value::Bool(*b),
        ExplorerValue::Data(data) => Value::String(data_to_string(data)),
        ExplorerValue::Date(date) => Value::String(date_to_string(date)),
        ExplorerValue::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| to_json(item, &path.appending(PathElement::Index(i as i64))))
                .collect::<Result<_>>()?,
        ),
        ExplorerValue::Dictionary(dictionary) => {
            let mut map = Map::with_capacity(dictionary.len());
            for (key, item) in dictionary {
                map.insert(
                    key.clone(),
                    to_json(item, &path.appending(PathElement::key(key.as_str())))?,
                );
            }
            Value::Object(map)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers() {
        assert_eq!(decode(b"12").unwrap(), ExplorerValue::Int(12));
        assert_eq!(decode(b"-1.5").unwrap(), ExplorerValue::Double(-1.5));
        // too large for i64
        assert_eq!(
            decode(b"18446744073709551615").unwrap(),
            ExplorerValue::Double(18446744073709551615.0)
        );
    }

    #[test]
    fn test_null_reports_its_path() {
        match decode(br#"{"a": [1, null]}"#).unwrap_err() {
            FormatError::Null(path) => assert_eq!(path.to_string(), "a[1]"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_double() {
        assert!(matches!(
            encode(&ExplorerValue::Double(f64::NAN)).unwrap_err(),
            FormatError::InvalidValue { .. }
        ));
    }
}
