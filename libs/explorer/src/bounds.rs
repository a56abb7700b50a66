//! Slice bounds and their resolution against an array

use std::fmt;
use std::ops::RangeInclusive;

use crate::error::{Error, Result};
use crate::path::Path;

/// One side of a slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    /// Index 0. Written as an empty lower bound (`[:3]`), or `first` as an upper bound
    First,
    /// Last valid index. Written as an empty upper bound (`[2:]`), or `last` as a lower bound
    Last,
    /// Literal index; negative values count back from the last valid index
    Index(i64),
}

impl Bound {
    pub const FIRST_KEYWORD: &'static str = "first";
    pub const LAST_KEYWORD: &'static str = "last";

    /// `None` when counting back from the last valid index overflows
    fn resolve(self, last_valid_index: i64) -> Option<i64> {
        match self {
            Bound::First => Some(0),
            Bound::Last => Some(last_valid_index),
            Bound::Index(n) if n < 0 => last_valid_index.checked_add(n),
            Bound::Index(n) => Some(n),
        }
    }
}

/// Inclusive slice bounds: `[lower:upper]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub lower: Bound,
    pub upper: Bound,
}

impl Bounds {
    pub fn new(lower: Bound, upper: Bound) -> Self {
        Self { lower, upper }
    }

    /// Bounds selecting every element: `[:]`
    pub fn all() -> Self {
        Self::new(Bound::First, Bound::Last)
    }

    /// Resolve the bounds into a concrete inclusive index range.
    ///
    /// Nothing is clamped: a lower bound past the upper one, a negative lower bound
    /// or an upper bound past `last_valid_index` are all reported as
    /// [`Error::WrongBounds`] with `path` as context.
    pub fn range(&self, last_valid_index: i64, path: &Path) -> Result<RangeInclusive<usize>> {
        let wrong_bounds = || Error::WrongBounds {
            bounds: *self,
            path: path.clone(),
            last_valid_index,
        };
        let lower = self.lower.resolve(last_valid_index).ok_or_else(wrong_bounds)?;
        let upper = self.upper.resolve(last_valid_index).ok_or_else(wrong_bounds)?;

        if lower > upper || lower < 0 || upper > last_valid_index {
            return Err(wrong_bounds());
        }

        Ok(lower as usize..=upper as usize)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::First => f.write_str(Bound::FIRST_KEYWORD),
            Bound::Last => f.write_str(Bound::LAST_KEYWORD),
            Bound::Index(n) => write!(f, "{}", n),
        }
    }
}

/// Sentinels in their default position are left empty
impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        if self.lower != Bound::First {
            write!(f, "{}", self.lower)?;
        }
        f.write_str(":")?;
        if self.upper != Bound::Last {
            write!(f, "{}", self.upper)?;
        }
        f.write_str("]")
    }
}
