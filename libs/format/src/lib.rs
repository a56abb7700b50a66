//! Data format backends for the explorer.
//!
//! Each [`DataFormat`] decodes raw bytes into an [`ExplorerValue`] and encodes one back.
//! Navigation never depends on the format: a document is decoded once, explored or
//! modified, then encoded again, possibly in another format.
//!
//! - JSON and YAML have no binary or date type: `Data` is written as a base64 string and
//!   `Date` as an RFC 3339 string. Decoding never reinterprets strings.
//! - XML is lossless: every element carries a `type` attribute unless it holds a string.
//!
//! `null` has no explorer counterpart and is rejected when decoding.

mod json;
mod xml;
mod yaml;

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use base64::{engine::general_purpose, Engine};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sextant_explorer::{ExplorerValue, Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Unknown data format '{0}' (expected json, yaml or xml)")]
    UnknownFormat(String),
    #[error("null value at '{0}' cannot be represented")]
    Null(Path),
    #[error("Invalid value at '{path}': {message}")]
    InvalidValue { path: Path, message: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("XML write error: {0}")]
    XmlWrite(#[from] quick_xml::Error),
    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Explorer(#[from] sextant_explorer::Error),
}

impl FormatError {
    pub(crate) fn invalid(path: &Path, message: impl Into<String>) -> Self {
        FormatError::InvalidValue {
            path: path.clone(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FormatError>;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataFormat {
    #[default]
    Json,
    Yaml,
    Xml,
}

impl DataFormat {
    pub const ALL: [DataFormat; 3] = [DataFormat::Json, DataFormat::Yaml, DataFormat::Xml];

    /// Format matching a file extension, case-insensitively
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(DataFormat::Json),
            "yaml" | "yml" => Some(DataFormat::Yaml),
            "xml" => Some(DataFormat::Xml),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DataFormat::Json => "json",
            DataFormat::Yaml => "yaml",
            DataFormat::Xml => "xml",
        }
    }

    pub fn decode(self, bytes: &[u8]) -> Result<ExplorerValue> {
        tracing::debug!(format = self.name(), bytes = bytes.len(), "decoding document");
        match self {
            DataFormat::Json => json::decode(bytes),
            DataFormat::Yaml => yaml::decode(bytes),
            DataFormat::Xml => xml::decode(bytes),
        }
    }

    pub fn decode_reader(self, mut reader: impl Read) -> Result<ExplorerValue> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.decode(&bytes)
    }

    pub fn encode(self, value: &ExplorerValue) -> Result<Vec<u8>> {
        let bytes = match self {
            DataFormat::Json => json::encode(value)?,
            DataFormat::Yaml => yaml::encode(value)?,
            DataFormat::Xml => xml::encode(value)?,
        };
        tracing::debug!(format = self.name(), bytes = bytes.len(), "encoded document");
        Ok(bytes)
    }

    /// Decode a document straight into a `Deserialize` type
    pub fn decode_as<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T> {
        let value = self.decode(bytes)?;
        Ok(sextant_explorer::from_value(value)?)
    }

    /// Encode any `Serialize` type as a document
    pub fn encode_from<T: Serialize + ?Sized>(self, value: &T) -> Result<Vec<u8>> {
        let value = sextant_explorer::to_value(value)?;
        self.encode(&value)
    }
}

impl FromStr for DataFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        DataFormat::from_extension(s).ok_or_else(|| FormatError::UnknownFormat(s.to_string()))
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn date_to_string(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn date_from_string(text: &str, path: &Path) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| FormatError::invalid(path, format!("invalid date '{}': {}", text, e)))
}

fn data_to_string(data: &[u8]) -> String {
    general_purpose::STANDARD.encode(data)
}

fn data_from_string(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(general_purpose::STANDARD.decode(compact)?)
}
