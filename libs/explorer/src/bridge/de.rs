//! Deserializer reading typed values out of an [`ExplorerValue`]

use serde::de::{
    self, DeserializeSeed, EnumAccess, Expected, IntoDeserializer, MapAccess, SeqAccess,
    Unexpected, VariantAccess, Visitor,
};
use serde::forward_to_deserialize_any;

use crate::error::{Error, Result};
use crate::path::{Path, PathElement};
use crate::value::{format_date, ExplorerValue};

/// Serde deserializer over an owned document value
#[derive(Debug)]
pub struct Deserializer {
    value: ExplorerValue,
    path: Path,
}

impl Deserializer {
    pub fn new(value: ExplorerValue) -> Self {
        Self::at(value, Path::root())
    }

    fn at(value: ExplorerValue, path: Path) -> Self {
        Self { value, path }
    }

    fn invalid_type(&self, expected: &dyn Expected) -> Error {
        de::Error::invalid_type(unexpected(&self.value), expected)
    }
}

fn unexpected(value: &ExplorerValue) -> Unexpected<'_> {
    match value {
        ExplorerValue::String(s) => Unexpected::Str(s),
        ExplorerValue::Int(i) => Unexpected::Signed(*i),
        ExplorerValue::Double(d) => Unexpected::Float(*d),
        ExplorerValue::Bool(b) => Unexpected::Bool(*b),
        ExplorerValue::Data(d) => Unexpected::Bytes(d),
        ExplorerValue::Date(_) => Unexpected::Other("date"),
        ExplorerValue::Dictionary(_) => Unexpected::Map,
        ExplorerValue::Array(_) => Unexpected::Seq,
    }
}

fn deserialize_at<'de, T: DeserializeSeed<'de>>(
    seed: T,
    value: ExplorerValue,
    path: Path,
) -> Result<T::Value> {
    seed.deserialize(Deserializer::at(value, path.clone()))
        .map_err(|e| e.within(&path))
}

impl<'de> de::Deserializer<'de> for Deserializer {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            ExplorerValue::String(s) => visitor.visit_string(s),
            ExplorerValue::Int(i) => visitor.visit_i64(i),
            ExplorerValue::Double(d) => visitor.visit_f64(d),
            ExplorerValue::Bool(b) => visitor.visit_bool(b),
            ExplorerValue::Data(d) => visitor.visit_byte_buf(d),
            // Lets `ExplorerValue` restore the variant; plain strings go through `deserialize_str`
            ExplorerValue::Date(date) => {
                visitor.visit_newtype_struct(format_date(&date).into_deserializer())
            }
            ExplorerValue::Dictionary(dict) => {
                let mut map = MapDeserializer {
                    iter: dict.into_iter(),
                    value: None,
                    path: self.path,
                };
                visitor.visit_map(&mut map)
            }
            ExplorerValue::Array(items) => {
                let len = items.len();
                let mut seq = SeqDeserializer {
                    iter: items.into_iter(),
                    index: 0,
                    path: self.path,
                };
                let value = visitor.visit_seq(&mut seq)?;
                if seq.iter.len() == 0 {
                    Ok(value)
                } else {
                    Err(de::Error::invalid_length(len, &"fewer elements in array"))
                }
            }
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            ExplorerValue::String(s) => visitor.visit_string(s),
            ExplorerValue::Date(date) => visitor.visit_string(format_date(&date)),
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_byte_buf(visitor)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            ExplorerValue::Data(d) => visitor.visit_byte_buf(d),
            ExplorerValue::String(s) => visitor.visit_string(s),
            ExplorerValue::Array(_) => self.deserialize_any(visitor),
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    /// Absent values never reach a deserializer: a present value is always `Some`
    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.value {
            ExplorerValue::String(variant) => visitor.visit_enum(EnumDeserializer {
                variant,
                value: None,
                path: self.path,
            }),
            ExplorerValue::Dictionary(dict) if dict.len() == 1 => {
                let Some((variant, value)) = dict.into_iter().next() else {
                    return Err(de::Error::invalid_length(0, &"a single-key dictionary"));
                };
                visitor.visit_enum(EnumDeserializer {
                    variant,
                    value: Some(value),
                    path: self.path,
                })
            }
            other => Err(de::Error::invalid_type(
                unexpected(&other),
                &"a string or a single-key dictionary",
            )),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char
        unit unit_struct seq tuple tuple_struct map struct identifier ignored_any
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, ExplorerValue>,
    value: Option<(Path, ExplorerValue)>,
    path: Path,
}

impl<'de> MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        let Some((key, value)) = self.iter.next() else {
            return Ok(None);
        };
        self.value = Some((self.path.appending(key.as_str()), value));
        seed.deserialize(key.into_deserializer()).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        let (path, value) = self
            .value
            .take()
            .ok_or_else(|| Error::conversion(&self.path, "dictionary value requested before its key"))?;
        deserialize_at(seed, value, path)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<ExplorerValue>,
    index: i64,
    path: Path,
}

impl<'de> SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        let Some(value) = self.iter.next() else {
            return Ok(None);
        };
        let path = self.path.appending(PathElement::Index(self.index));
        self.index += 1;
        deserialize_at(seed, value, path).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<ExplorerValue>,
    path: Path,
}

impl<'de> EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant)> {
        let path = self.path.appending(self.variant.as_str());
        let variant = seed.deserialize(self.variant.into_deserializer())?;
        Ok((
            variant,
            VariantDeserializer {
                value: self.value,
                path,
            },
        ))
    }
}

struct VariantDeserializer {
    value: Option<ExplorerValue>,
    path: Path,
}

impl<'de> VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            None => Ok(()),
            Some(value) => Err(de::Error::invalid_type(unexpected(&value), &"unit variant")),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        match self.value {
            Some(value) => deserialize_at(seed, value, self.path),
            None => Err(de::Error::invalid_type(
                Unexpected::UnitVariant,
                &"newtype variant",
            )),
        }
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        match self.value {
            Some(value @ ExplorerValue::Array(_)) => {
                let path = self.path.clone();
                de::Deserializer::deserialize_any(Deserializer::at(value, self.path), visitor)
                    .map_err(|e| e.within(&path))
            }
            Some(value) => Err(de::Error::invalid_type(unexpected(&value), &"tuple variant")),
            None => Err(de::Error::invalid_type(
                Unexpected::UnitVariant,
                &"tuple variant",
            )),
        }
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.value {
            Some(value @ ExplorerValue::Dictionary(_)) => {
                let path = self.path.clone();
                de::Deserializer::deserialize_any(Deserializer::at(value, self.path), visitor)
                    .map_err(|e| e.within(&path))
            }
            Some(value) => Err(de::Error::invalid_type(unexpected(&value), &"struct variant")),
            None => Err(de::Error::invalid_type(
                Unexpected::UnitVariant,
                &"struct variant",
            )),
        }
    }
}
