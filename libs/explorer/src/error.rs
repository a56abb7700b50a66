//! Error types for the explorer

use thiserror::Error;

use crate::bounds::Bounds;
use crate::path::Path;
use crate::predicate::VariableKind;
use crate::value::ValueKind;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing, navigating or converting values.
///
/// Navigation errors carry the path prefix at which the failing step was applied.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Parse error at position {position}: {message}")]
    Parse { message: String, position: usize },

    #[error("Missing key '{key}' in dictionary at '{path}'")]
    SubscriptMissingKey { path: Path, key: String },

    #[error("Index {index} out of bounds at '{path}' (array count: {count})")]
    SubscriptWrongIndex { path: Path, index: i64, count: usize },

    #[error("Expected {expected} at '{path}', found {found}")]
    WrongValueType {
        path: Path,
        expected: &'static str,
        found: ValueKind,
    },

    #[error("Wrong bounds {bounds} at '{path}' (last valid index: {last_valid_index})")]
    WrongBounds {
        bounds: Bounds,
        path: Path,
        last_valid_index: i64,
    },

    #[error("Variable in '{expression}' used both as {first} and as {second}")]
    PredicateConflict {
        expression: String,
        first: VariableKind,
        second: VariableKind,
    },

    #[error("Value conversion error at '{path}': {message}")]
    ValueConversion { path: Path, message: String },

    #[error("Wrong usage: {0}")]
    WrongUsage(String),
}

impl Error {
    pub(crate) fn parse(message: impl Into<String>, position: usize) -> Self {
        Error::Parse {
            message: message.into(),
            position,
        }
    }

    pub(crate) fn wrong_type(path: &Path, expected: &'static str, found: ValueKind) -> Self {
        Error::WrongValueType {
            path: path.clone(),
            expected,
            found,
        }
    }
}
