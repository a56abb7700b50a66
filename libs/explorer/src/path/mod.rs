//! Paths addressing a location inside an [`ExplorerValue`](crate::ExplorerValue)
//!
//! A path is an immutable sequence of [`PathElement`]s. Its textual form is the
//! stable external surface of the explorer:
//!
//! ```text
//! people.Tom.hobbies[0]        key, key, key, index
//! people.Tom.hobbies[-1]       last hobby
//! people.Tom.hobbies[#]        count (read) / append (write)
//! ratings[1:3]  ratings[:2]    inclusive slices, empty side = first/last
//! people[value hasPrefix 'T']  predicate filter
//! people.#Tom#                 key name of `Tom` (read it or rename it)
//! (dotted.key).child           parenthesized key
//! ```

mod parser;

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

use crate::bounds::Bounds;
use crate::error::Error;
use crate::predicate::Predicate;

pub use parser::PathParser;

/// One addressing step of a [`Path`]
#[derive(Debug, Clone, PartialEq)]
pub enum PathElement {
    /// Dictionary key
    Key(String),
    /// Array index, negative values count from the end (`-1` is the last element)
    Index(i64),
    /// Element count when read, append-at-end marker when written
    Count,
    /// Inclusive array slice
    Slice(Bounds),
    /// Children whose value satisfies the predicate
    Filter(Arc<Predicate>),
    /// Name of the given key, used to read or rename it
    KeyName(String),
}

impl PathElement {
    pub fn key(name: impl Into<String>) -> Self {
        PathElement::Key(name.into())
    }

    pub fn filter(predicate: Predicate) -> Self {
        PathElement::Filter(Arc::new(predicate))
    }

    /// Elements rendered with a leading `.` separator
    fn is_key_like(&self) -> bool {
        matches!(self, PathElement::Key(_) | PathElement::KeyName(_))
    }

    /// Elements that address exactly one child (no slice, filter or count)
    pub fn is_concrete(&self) -> bool {
        matches!(self, PathElement::Key(_) | PathElement::Index(_))
    }
}

impl From<&str> for PathElement {
    fn from(value: &str) -> Self {
        PathElement::Key(value.to_string())
    }
}

impl From<String> for PathElement {
    fn from(value: String) -> Self {
        PathElement::Key(value)
    }
}

impl From<i64> for PathElement {
    fn from(value: i64) -> Self {
        PathElement::Index(value)
    }
}

impl From<Bounds> for PathElement {
    fn from(value: Bounds) -> Self {
        PathElement::Slice(value)
    }
}

/// Ordered, immutable sequence of path elements.
///
/// Cloning is cheap; [`Path::appending`] returns a new path and leaves `self` untouched.
#[derive(Clone, PartialEq, Default)]
pub struct Path(Arc<[PathElement]>);

impl Path {
    pub fn new(elements: Vec<PathElement>) -> Self {
        Self(Arc::from(elements))
    }

    /// The empty path, addressing the document root
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a path from its textual form
    pub fn parse(text: &str) -> crate::Result<Self> {
        parser::parse_uncached(text)
    }

    pub fn appending(&self, element: impl Into<PathElement>) -> Path {
        let mut elements = self.0.to_vec();
        elements.push(element.into());
        Path::new(elements)
    }

    /// Path made of the first `len` elements
    pub fn prefix(&self, len: usize) -> Path {
        Path::new(self.0[..len.min(self.0.len())].to_vec())
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.0
    }

    /// True when every element addresses exactly one child
    pub fn is_concrete(&self) -> bool {
        self.0.iter().all(PathElement::is_concrete)
    }
}

impl Deref for Path {
    type Target = [PathElement];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<PathElement>> for Path {
    fn from(value: Vec<PathElement>) -> Self {
        Path::new(value)
    }
}

impl From<&[PathElement]> for Path {
    fn from(value: &[PathElement]) -> Self {
        Path(Arc::from(value))
    }
}

impl FromIterator<PathElement> for Path {
    fn from_iter<I: IntoIterator<Item = PathElement>>(iter: I) -> Self {
        Path::new(iter.into_iter().collect())
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.0.iter().enumerate() {
            if i > 0 && element.is_key_like() {
                f.write_str(".")?;
            }
            write!(f, "{}", element)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({})", self)
    }
}

/// Characters that force a key into its parenthesized form
const RESERVED_KEY_CHARS: &[char] = &['.', '[', ']', '(', ')', '#', '\\'];

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElement::Key(key) => {
                if key.is_empty() || key.contains(RESERVED_KEY_CHARS) {
                    f.write_str("(")?;
                    write_escaped(f, key, &[')', '\\'])?;
                    f.write_str(")")
                } else {
                    f.write_str(key)
                }
            }
            PathElement::Index(index) => write!(f, "[{}]", index),
            PathElement::Count => f.write_str("[#]"),
            PathElement::Slice(bounds) => write!(f, "{}", bounds),
            PathElement::Filter(predicate) => write!(f, "[{}]", predicate),
            PathElement::KeyName(name) => {
                f.write_str("#")?;
                write_escaped(f, name, &['#', '\\'])?;
                f.write_str("#")
            }
        }
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str, special: &[char]) -> fmt::Result {
    for c in text.chars() {
        if special.contains(&c) {
            f.write_str("\\")?;
        }
        write!(f, "{}", c)?;
    }
    Ok(())
}
