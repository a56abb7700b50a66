//! Serializer building an [`ExplorerValue`]
//!
//! Each serialized value yields `Some(value)`, or `None` for units and absent
//! options so records can leave those fields out.

use chrono::{DateTime, Utc};
use serde::ser::{self, Serialize};

use super::DATE_TOKEN;
use crate::error::{Error, Result};
use crate::path::{Path, PathElement};
use crate::value::{Dictionary, ExplorerValue};

/// Serde serializer producing document values, threading the coding path for errors
#[derive(Debug, Default)]
pub struct Serializer {
    path: Path,
}

impl Serializer {
    pub fn new() -> Self {
        Self::default()
    }

    fn at(path: Path) -> Self {
        Self { path }
    }

    fn int<T: TryInto<i64> + Copy + std::fmt::Display>(&self, v: T) -> Result<Option<ExplorerValue>> {
        let int = v.try_into().map_err(|_| {
            Error::conversion(
                &self.path,
                format!("integer {} does not fit in a signed 64-bit int", v),
            )
        })?;
        Ok(Some(ExplorerValue::Int(int)))
    }
}

fn serialize_at<T: ?Sized + Serialize>(value: &T, path: Path) -> Result<Option<ExplorerValue>> {
    value
        .serialize(Serializer::at(path.clone()))
        .map_err(|e| e.within(&path))
}

fn required(value: Option<ExplorerValue>, path: &Path, context: &str) -> Result<ExplorerValue> {
    value.ok_or_else(|| Error::conversion(path, format!("{} cannot be a unit or empty value", context)))
}

fn single(key: &str, value: ExplorerValue) -> ExplorerValue {
    let mut dict = Dictionary::with_capacity(1);
    dict.insert(key.to_string(), value);
    ExplorerValue::Dictionary(dict)
}

impl ser::Serializer for Serializer {
    type Ok = Option<ExplorerValue>;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok> {
        Ok(Some(ExplorerValue::Bool(v)))
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok> {
        self.int(v)
    }

    fn serialize_i16(self, v: i16) -> Result<Self::Ok> {
        self.int(v)
    }

    fn serialize_i32(self, v: i32) -> Result<Self::Ok> {
        self.int(v)
    }

    fn serialize_i64(self, v: i64) -> Result<Self::Ok> {
        Ok(Some(ExplorerValue::Int(v)))
    }

    fn serialize_i128(self, v: i128) -> Result<Self::Ok> {
        self.int(v)
    }

    fn serialize_u8(self, v: u8) -> Result<Self::Ok> {
        self.int(v)
    }

    fn serialize_u16(self, v: u16) -> Result<Self::Ok> {
        self.int(v)
    }

    fn serialize_u32(self, v: u32) -> Result<Self::Ok> {
        self.int(v)
    }

    fn serialize_u64(self, v: u64) -> Result<Self::Ok> {
        self.int(v)
    }

    fn serialize_u128(self, v: u128) -> Result<Self::Ok> {
        self.int(v)
    }

    fn serialize_f32(self, v: f32) -> Result<Self::Ok> {
        Ok(Some(ExplorerValue::Double(f64::from(v))))
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok> {
        Ok(Some(ExplorerValue::Double(v)))
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        Ok(Some(ExplorerValue::String(v.to_string())))
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        Ok(Some(ExplorerValue::String(v.to_string())))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok> {
        Ok(Some(ExplorerValue::Data(v.to_vec())))
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        Ok(None)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Self::Ok> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        Ok(None)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok> {
        Ok(None)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok> {
        Ok(Some(ExplorerValue::String(variant.to_string())))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Self::Ok> {
        if name != DATE_TOKEN {
            return value.serialize(self);
        }

        let path = self.path.clone();
        match value.serialize(self)? {
            Some(ExplorerValue::String(text)) => DateTime::parse_from_rfc3339(&text)
                .map(|date| Some(ExplorerValue::Date(date.with_timezone(&Utc))))
                .map_err(|e| Error::conversion(&path, format!("invalid date '{}': {}", text, e))),
            _ => Err(Error::conversion(&path, "dates must be carried as strings")),
        }
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok> {
        let path = self.path.appending(variant);
        let inner = required(serialize_at(value, path.clone())?, &path, "a variant payload")?;
        Ok(Some(single(variant, inner)))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SerializeVec {
            path: self.path,
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            variant,
            inner: SerializeVec {
                path: self.path.appending(variant),
                items: Vec::with_capacity(len),
            },
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(SerializeMap {
            path: self.path,
            entries: Dictionary::with_capacity(len.unwrap_or(0)),
            next_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(SerializeStructVariant {
            variant,
            inner: SerializeMap {
                path: self.path.appending(variant),
                entries: Dictionary::with_capacity(len),
                next_key: None,
            },
        })
    }
}

/// Sequence under construction
pub struct SerializeVec {
    path: Path,
    items: Vec<ExplorerValue>,
}

impl SerializeVec {
    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let path = self.path.appending(PathElement::Count);
        let item = required(serialize_at(value, path.clone())?, &path, "a sequence element")?;
        self.items.push(item);
        Ok(())
    }

    fn finish(self) -> ExplorerValue {
        ExplorerValue::Array(self.items)
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Option<ExplorerValue>;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Some(self.finish()))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Option<ExplorerValue>;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Some(self.finish()))
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Option<ExplorerValue>;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Some(self.finish()))
    }
}

pub struct SerializeTupleVariant {
    variant: &'static str,
    inner: SerializeVec,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Option<ExplorerValue>;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.inner.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Some(single(self.variant, self.inner.finish())))
    }
}

/// Record or map under construction
pub struct SerializeMap {
    path: Path,
    entries: Dictionary,
    next_key: Option<String>,
}

impl SerializeMap {
    fn insert<T: ?Sized + Serialize>(&mut self, key: String, value: &T) -> Result<()> {
        // Absent options and units leave the entry out
        if let Some(value) = serialize_at(value, self.path.appending(key.as_str()))? {
            self.entries.insert(key, value);
        }
        Ok(())
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Option<ExplorerValue>;
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        let key = match key.serialize(Serializer::at(self.path.clone()))? {
            Some(ExplorerValue::String(key)) => key,
            Some(ExplorerValue::Int(key)) => key.to_string(),
            Some(ExplorerValue::Bool(key)) => key.to_string(),
            Some(other) => {
                return Err(Error::conversion(
                    &self.path,
                    format!("dictionary keys must be strings, found {}", other.kind()),
                ));
            }
            None => return Err(Error::conversion(&self.path, "dictionary keys cannot be empty")),
        };
        self.next_key = Some(key);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| Error::conversion(&self.path, "dictionary value without a key"))?;
        self.insert(key, value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Some(ExplorerValue::Dictionary(self.entries)))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Option<ExplorerValue>;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Some(ExplorerValue::Dictionary(self.entries)))
    }
}

pub struct SerializeStructVariant {
    variant: &'static str,
    inner: SerializeMap,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Option<ExplorerValue>;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.inner.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Some(single(
            self.variant,
            ExplorerValue::Dictionary(self.inner.entries),
        )))
    }
}
