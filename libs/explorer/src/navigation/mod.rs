//! Reading and mutating an [`ExplorerValue`] along a [`Path`]
//!
//! Elements are applied left to right. Keys and indices address one child,
//! slices and filters fan out to several children, `[#]` and `#name#` only make
//! sense as the last element.
//!
//! Filters never fail on values of the wrong kind: the [`Navigator`] records the
//! mismatched kinds per predicate so a caller can explain an empty result.

mod listing;

use std::collections::{BTreeMap, BTreeSet};

pub use listing::{PathsFilter, PathsTarget};

use crate::error::{Error, Result};
use crate::path::{Path, PathElement};
use crate::predicate::Predicate;
use crate::value::{Dictionary, ExplorerValue, ValueKind};

/// Mutation applied at the end of a path
#[derive(Debug)]
enum Operation {
    Set(ExplorerValue),
    Add(ExplorerValue),
    Delete,
}

impl Operation {
    fn name(&self) -> &'static str {
        match self {
            Operation::Set(_) => "set",
            Operation::Add(_) => "add",
            Operation::Delete => "delete",
        }
    }
}

/// Walks values along paths, accumulating predicate mismatches
#[derive(Debug, Default)]
pub struct Navigator {
    mismatches: BTreeMap<String, BTreeSet<ValueKind>>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kinds each filter predicate could not compare, keyed by predicate source
    pub fn mismatches(&self) -> &BTreeMap<String, BTreeSet<ValueKind>> {
        &self.mismatches
    }

    pub fn take_mismatches(&mut self) -> BTreeMap<String, BTreeSet<ValueKind>> {
        std::mem::take(&mut self.mismatches)
    }

    /// Read the value at `path`.
    ///
    /// Slices and filters produce arrays (or dictionaries for filtered dictionaries)
    /// gathering every addressed child.
    pub fn get(&mut self, value: &ExplorerValue, path: &Path) -> Result<ExplorerValue> {
        tracing::debug!(path = %path, "reading value");
        self.read(value, path, 0)
    }

    /// Replace the value at `path`, inserting a missing terminal key.
    ///
    /// An empty path replaces the whole value.
    pub fn set(
        &mut self,
        value: &mut ExplorerValue,
        path: &Path,
        new_value: ExplorerValue,
    ) -> Result<()> {
        tracing::debug!(path = %path, kind = %new_value.kind(), "setting value");
        if path.is_empty() {
            *value = new_value;
            return Ok(());
        }
        self.write(value, path, 0, &Operation::Set(new_value))
    }

    /// Add a value at `path`.
    ///
    /// Array indices insert and shift the following elements, `[#]` appends,
    /// keys are inserted. Every element before the last must already exist.
    pub fn add(
        &mut self,
        value: &mut ExplorerValue,
        path: &Path,
        new_value: ExplorerValue,
    ) -> Result<()> {
        tracing::debug!(path = %path, kind = %new_value.kind(), "adding value");
        if path.is_empty() {
            return Err(Error::WrongUsage(
                "Cannot add a value at the document root".to_string(),
            ));
        }
        self.write(value, path, 0, &Operation::Add(new_value))
    }

    pub fn delete(&mut self, value: &mut ExplorerValue, path: &Path) -> Result<()> {
        tracing::debug!(path = %path, "deleting value");
        if path.is_empty() {
            return Err(Error::WrongUsage(
                "Cannot delete the document root".to_string(),
            ));
        }
        self.write(value, path, 0, &Operation::Delete)
    }

    /// Delete the value at `path`, then remove the containers left empty, walking
    /// back toward the root. The root itself is kept.
    pub fn delete_pruning_empty(&mut self, value: &mut ExplorerValue, path: &Path) -> Result<()> {
        self.delete(value, path)?;

        for len in (1..path.len()).rev() {
            let parent = path.prefix(len);
            if !parent.is_concrete() {
                break;
            }
            if !locate(value, &parent).is_ok_and(ExplorerValue::is_empty_group) {
                break;
            }
            tracing::debug!(path = %parent, "pruning empty container");
            self.write(value, &parent, 0, &Operation::Delete)?;
        }
        Ok(())
    }

    fn evaluate(&mut self, predicate: &Predicate, value: &ExplorerValue) -> bool {
        let evaluation = predicate.evaluate(value);
        if let Some(kind) = evaluation.mismatch {
            tracing::trace!(predicate = %predicate, kind = %kind, "predicate mismatch");
            self.mismatches
                .entry(predicate.source().to_string())
                .or_default()
                .insert(kind);
        }
        evaluation.matched
    }

    fn read(&mut self, current: &ExplorerValue, path: &Path, depth: usize) -> Result<ExplorerValue> {
        let Some(element) = path.get(depth) else {
            return Ok(current.clone());
        };
        let terminal = depth + 1 == path.len();

        match element {
            PathElement::Key(key) => {
                let child = dictionary(current, path, depth)?
                    .get(key)
                    .ok_or_else(|| missing_key(path, depth, key))?;
                self.read(child, path, depth + 1)
            }
            PathElement::Index(index) => {
                let items = array(current, path, depth)?;
                let position = resolve_index(*index, items.len(), path, depth)?;
                self.read(&items[position], path, depth + 1)
            }
            PathElement::Count => {
                if !terminal {
                    return Err(not_terminal(element, path, depth));
                }
                let count = current.count().ok_or_else(|| {
                    Error::wrong_type(&path.prefix(depth), "array or dictionary", current.kind())
                })?;
                Ok(ExplorerValue::Int(count as i64))
            }
            PathElement::Slice(bounds) => {
                let items = array(current, path, depth)?;
                let range = bounds.range(items.len() as i64 - 1, &path.prefix(depth))?;
                let mut slice = Vec::with_capacity(range.end() + 1 - range.start());
                for item in &items[range] {
                    slice.push(self.read(item, path, depth + 1)?);
                }
                Ok(ExplorerValue::Array(slice))
            }
            PathElement::Filter(predicate) => match current {
                ExplorerValue::Dictionary(dict) => {
                    let mut filtered = Dictionary::new();
                    for (key, child) in dict {
                        if self.evaluate(predicate, child) {
                            filtered.insert(key.clone(), self.read(child, path, depth + 1)?);
                        }
                    }
                    Ok(ExplorerValue::Dictionary(filtered))
                }
                ExplorerValue::Array(items) => {
                    let mut filtered = Vec::new();
                    for child in items {
                        if self.evaluate(predicate, child) {
                            filtered.push(self.read(child, path, depth + 1)?);
                        }
                    }
                    Ok(ExplorerValue::Array(filtered))
                }
                other => Err(Error::wrong_type(
                    &path.prefix(depth),
                    "array or dictionary",
                    other.kind(),
                )),
            },
            PathElement::KeyName(name) => {
                if !terminal {
                    return Err(not_terminal(element, path, depth));
                }
                if dictionary(current, path, depth)?.contains_key(name) {
                    Ok(ExplorerValue::String(name.clone()))
                } else {
                    Err(missing_key(path, depth, name))
                }
            }
        }
    }

    fn write(
        &mut self,
        current: &mut ExplorerValue,
        path: &Path,
        depth: usize,
        operation: &Operation,
    ) -> Result<()> {
        let element = &path[depth];
        if depth + 1 == path.len() {
            return self.write_terminal(current, path, depth, element, operation);
        }

        match element {
            PathElement::Key(key) => {
                let child = dictionary_mut(current, path, depth)?
                    .get_mut(key)
                    .ok_or_else(|| missing_key(path, depth, key))?;
                self.write(child, path, depth + 1, operation)
            }
            PathElement::Index(index) => {
                let items = array_mut(current, path, depth)?;
                let position = resolve_index(*index, items.len(), path, depth)?;
                self.write(&mut items[position], path, depth + 1, operation)
            }
            PathElement::Slice(bounds) => {
                let items = array_mut(current, path, depth)?;
                let range = bounds.range(items.len() as i64 - 1, &path.prefix(depth))?;
                for item in &mut items[range] {
                    self.write(item, path, depth + 1, operation)?;
                }
                Ok(())
            }
            PathElement::Filter(predicate) => match current {
                ExplorerValue::Dictionary(dict) => {
                    for child in dict.values_mut() {
                        if self.evaluate(predicate, child) {
                            self.write(child, path, depth + 1, operation)?;
                        }
                    }
                    Ok(())
                }
                ExplorerValue::Array(items) => {
                    for child in items.iter_mut() {
                        if self.evaluate(predicate, child) {
                            self.write(child, path, depth + 1, operation)?;
                        }
                    }
                    Ok(())
                }
                other => Err(Error::wrong_type(
                    &path.prefix(depth),
                    "array or dictionary",
                    other.kind(),
                )),
            },
            PathElement::Count | PathElement::KeyName(_) => Err(not_terminal(element, path, depth)),
        }
    }

    fn write_terminal(
        &mut self,
        current: &mut ExplorerValue,
        path: &Path,
        depth: usize,
        element: &PathElement,
        operation: &Operation,
    ) -> Result<()> {
        match (element, operation) {
            (PathElement::Key(key), Operation::Set(new_value) | Operation::Add(new_value)) => {
                dictionary_mut(current, path, depth)?.insert(key.clone(), new_value.clone());
                Ok(())
            }
            (PathElement::Key(key), Operation::Delete) => dictionary_mut(current, path, depth)?
                .shift_remove(key)
                .map(|_| ())
                .ok_or_else(|| missing_key(path, depth, key)),

            (PathElement::Index(index), Operation::Set(new_value)) => {
                let items = array_mut(current, path, depth)?;
                let position = resolve_insertion(*index, items.len(), path, depth)?;
                if position == items.len() {
                    items.push(new_value.clone());
                } else {
                    items[position] = new_value.clone();
                }
                Ok(())
            }
            (PathElement::Index(index), Operation::Add(new_value)) => {
                let items = array_mut(current, path, depth)?;
                let position = resolve_insertion(*index, items.len(), path, depth)?;
                items.insert(position, new_value.clone());
                Ok(())
            }
            (PathElement::Index(index), Operation::Delete) => {
                let items = array_mut(current, path, depth)?;
                let position = resolve_index(*index, items.len(), path, depth)?;
                items.remove(position);
                Ok(())
            }

            (PathElement::Count, Operation::Set(new_value) | Operation::Add(new_value)) => {
                array_mut(current, path, depth)?.push(new_value.clone());
                Ok(())
            }

            (PathElement::Slice(bounds), Operation::Set(new_value)) => {
                let items = array_mut(current, path, depth)?;
                let range = bounds.range(items.len() as i64 - 1, &path.prefix(depth))?;
                for item in &mut items[range] {
                    *item = new_value.clone();
                }
                Ok(())
            }
            (PathElement::Slice(bounds), Operation::Delete) => {
                let items = array_mut(current, path, depth)?;
                let range = bounds.range(items.len() as i64 - 1, &path.prefix(depth))?;
                items.drain(range);
                Ok(())
            }

            (PathElement::Filter(predicate), Operation::Set(new_value)) => match current {
                ExplorerValue::Dictionary(dict) => {
                    for child in dict.values_mut() {
                        if self.evaluate(predicate, child) {
                            *child = new_value.clone();
                        }
                    }
                    Ok(())
                }
                ExplorerValue::Array(items) => {
                    for child in items.iter_mut() {
                        if self.evaluate(predicate, child) {
                            *child = new_value.clone();
                        }
                    }
                    Ok(())
                }
                other => Err(Error::wrong_type(
                    &path.prefix(depth),
                    "array or dictionary",
                    other.kind(),
                )),
            },
            (PathElement::Filter(predicate), Operation::Delete) => match current {
                ExplorerValue::Dictionary(dict) => {
                    dict.retain(|_, child| !self.evaluate(predicate, child));
                    Ok(())
                }
                ExplorerValue::Array(items) => {
                    items.retain(|child| !self.evaluate(predicate, child));
                    Ok(())
                }
                other => Err(Error::wrong_type(
                    &path.prefix(depth),
                    "array or dictionary",
                    other.kind(),
                )),
            },

            (PathElement::KeyName(name), Operation::Set(ExplorerValue::String(new_name))) => {
                rename_key(dictionary_mut(current, path, depth)?, name, new_name, path, depth)
            }
            (PathElement::KeyName(_), Operation::Set(other)) => Err(Error::WrongUsage(format!(
                "A key name at '{}' can only be set to a string, got {}",
                path,
                other.kind()
            ))),

            (element, operation) => Err(Error::WrongUsage(format!(
                "Cannot {} at '{}': '{}' does not support it",
                operation.name(),
                path,
                element
            ))),
        }
    }
}

/// Rename `name` to `new_name` keeping its position among the entries
fn rename_key(
    dict: &mut Dictionary,
    name: &str,
    new_name: &str,
    path: &Path,
    depth: usize,
) -> Result<()> {
    let Some(position) = dict.get_index_of(name) else {
        return Err(missing_key(path, depth, name));
    };
    if name == new_name {
        return Ok(());
    }
    if dict.contains_key(new_name) {
        return Err(Error::WrongUsage(format!(
            "Cannot rename '{}' to '{}' at '{}': the key already exists",
            name,
            new_name,
            path.prefix(depth)
        )));
    }

    if let Some((_, value)) = dict.shift_remove_index(position) {
        dict.shift_insert(position, new_name.to_string(), value);
    }
    Ok(())
}

/// Follow a path made of keys and indices without copying anything
pub(crate) fn locate<'v>(value: &'v ExplorerValue, path: &Path) -> Result<&'v ExplorerValue> {
    let mut current = value;
    for (depth, element) in path.iter().enumerate() {
        current = match element {
            PathElement::Key(key) => dictionary(current, path, depth)?
                .get(key)
                .ok_or_else(|| missing_key(path, depth, key))?,
            PathElement::Index(index) => {
                let items = array(current, path, depth)?;
                &items[resolve_index(*index, items.len(), path, depth)?]
            }
            other => {
                return Err(Error::WrongUsage(format!(
                    "'{}' in '{}' does not address a single value",
                    other, path
                )));
            }
        };
    }
    Ok(current)
}

fn dictionary<'v>(value: &'v ExplorerValue, path: &Path, depth: usize) -> Result<&'v Dictionary> {
    match value {
        ExplorerValue::Dictionary(dict) => Ok(dict),
        other => Err(Error::wrong_type(&path.prefix(depth), "dictionary", other.kind())),
    }
}

fn dictionary_mut<'v>(
    value: &'v mut ExplorerValue,
    path: &Path,
    depth: usize,
) -> Result<&'v mut Dictionary> {
    match value {
        ExplorerValue::Dictionary(dict) => Ok(dict),
        other => Err(Error::wrong_type(&path.prefix(depth), "dictionary", other.kind())),
    }
}

fn array<'v>(value: &'v ExplorerValue, path: &Path, depth: usize) -> Result<&'v Vec<ExplorerValue>> {
    match value {
        ExplorerValue::Array(items) => Ok(items),
        other => Err(Error::wrong_type(&path.prefix(depth), "array", other.kind())),
    }
}

fn array_mut<'v>(
    value: &'v mut ExplorerValue,
    path: &Path,
    depth: usize,
) -> Result<&'v mut Vec<ExplorerValue>> {
    match value {
        ExplorerValue::Array(items) => Ok(items),
        other => Err(Error::wrong_type(&path.prefix(depth), "array", other.kind())),
    }
}

/// Position of an existing element, negative indices counting from the end
fn resolve_index(index: i64, count: usize, path: &Path, depth: usize) -> Result<usize> {
    let resolved = if index < 0 { count as i64 + index } else { index };
    if (0..count as i64).contains(&resolved) {
        Ok(resolved as usize)
    } else {
        Err(wrong_index(path, depth, index, count))
    }
}

/// Like [`resolve_index`], also accepting `count` (one past the end)
fn resolve_insertion(index: i64, count: usize, path: &Path, depth: usize) -> Result<usize> {
    let resolved = if index < 0 { count as i64 + index } else { index };
    if (0..=count as i64).contains(&resolved) {
        Ok(resolved as usize)
    } else {
        Err(wrong_index(path, depth, index, count))
    }
}

fn missing_key(path: &Path, depth: usize, key: &str) -> Error {
    Error::SubscriptMissingKey {
        path: path.prefix(depth),
        key: key.to_string(),
    }
}

fn wrong_index(path: &Path, depth: usize, index: i64, count: usize) -> Error {
    Error::SubscriptWrongIndex {
        path: path.prefix(depth),
        index,
        count,
    }
}

fn not_terminal(element: &PathElement, path: &Path, depth: usize) -> Error {
    Error::WrongUsage(format!(
        "'{}' must be the last element of a path (found in '{}' after '{}')",
        element,
        path,
        path.prefix(depth)
    ))
}

impl ExplorerValue {
    /// Read the value at `path`. See [`Navigator::get`].
    pub fn get(&self, path: &Path) -> Result<ExplorerValue> {
        Navigator::new().get(self, path)
    }

    /// Replace the value at `path`. See [`Navigator::set`].
    pub fn set(&mut self, path: &Path, value: impl Into<ExplorerValue>) -> Result<()> {
        Navigator::new().set(self, path, value.into())
    }

    /// Add a value at `path`. See [`Navigator::add`].
    pub fn add(&mut self, path: &Path, value: impl Into<ExplorerValue>) -> Result<()> {
        Navigator::new().add(self, path, value.into())
    }

    pub fn delete(&mut self, path: &Path) -> Result<()> {
        Navigator::new().delete(self, path)
    }
}
