//! Conversion between typed values and [`ExplorerValue`]
//!
//! Any `#[derive(Serialize, Deserialize)]` type can be turned into a document value
//! with [`to_value`] and read back with [`from_value`]:
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use sextant_explorer::bridge::{from_value, to_value};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Player {
//!     name: String,
//!     score: i64,
//!     nickname: Option<String>,
//! }
//!
//! let tom = Player { name: "Tom".into(), score: 30, nickname: None };
//! let value = to_value(&tom).unwrap();
//! assert_eq!(value.as_dictionary().map(|d| d.len()), Some(2));
//! assert_eq!(from_value::<Player>(value).unwrap(), tom);
//! ```
//!
//! Conversion failures are reported as [`Error::ValueConversion`] with the coding
//! path of the innermost value that could not be converted.

mod de;
mod impls;
mod ser;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use de::Deserializer;
pub use ser::Serializer;

use crate::error::{Error, Result};
use crate::path::Path;
use crate::value::ExplorerValue;

/// Newtype name carrying a date through serde as an RFC 3339 string
pub(crate) const DATE_TOKEN: &str = "$sextant::date";

/// Encode a typed value
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<ExplorerValue> {
    value.serialize(Serializer::new())?.ok_or_else(|| Error::ValueConversion {
        path: Path::root(),
        message: "a unit or empty value has no document representation".to_string(),
    })
}

/// Decode a typed value
pub fn from_value<T: DeserializeOwned>(value: ExplorerValue) -> Result<T> {
    T::deserialize(Deserializer::new(value))
}

impl Error {
    /// Attach `path` to a conversion error raised without one
    pub(crate) fn within(self, path: &Path) -> Error {
        match self {
            Error::ValueConversion { path: inner, message } if inner.is_empty() => {
                Error::ValueConversion {
                    path: path.clone(),
                    message,
                }
            }
            other => other,
        }
    }

    pub(crate) fn conversion(path: &Path, message: impl Into<String>) -> Error {
        Error::ValueConversion {
            path: path.clone(),
            message: message.into(),
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::conversion(&Path::root(), msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::conversion(&Path::root(), msg.to_string())
    }
}
