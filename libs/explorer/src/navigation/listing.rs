//! Path listing and multi-path extraction

use std::sync::Arc;

use regex::Regex;

use super::{locate, Navigator};
use crate::error::{Error, Result};
use crate::path::{Path, PathElement};
use crate::predicate::Predicate;
use crate::tree::{PathTree, SiblingOrder};
use crate::value::ExplorerValue;

/// Which values a path listing reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathsTarget {
    /// Strings, numbers, booleans, data and dates
    Single,
    /// Arrays and dictionaries
    Group,
    #[default]
    All,
}

impl PathsTarget {
    fn includes(self, value: &ExplorerValue) -> bool {
        match self {
            PathsTarget::Single => value.is_single(),
            PathsTarget::Group => value.is_group(),
            PathsTarget::All => true,
        }
    }
}

/// Options of [`Navigator::paths`]
#[derive(Debug, Clone, Default)]
pub struct PathsFilter {
    /// Must match the whole last key of a listed path
    pub key: Option<Regex>,
    /// Must hold for the listed value. Groups never satisfy it.
    pub value: Option<Arc<Predicate>>,
    pub target: PathsTarget,
}

impl PathsFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep paths whose last key matches `pattern` entirely
    pub fn with_key_pattern(mut self, pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
            Error::parse(format!("Invalid key pattern '{}': {}", pattern, e), 0)
        })?;
        self.key = Some(regex);
        Ok(self)
    }

    pub fn with_value_predicate(mut self, predicate: impl Into<Arc<Predicate>>) -> Self {
        self.value = Some(predicate.into());
        self
    }

    pub fn with_target(mut self, target: PathsTarget) -> Self {
        self.target = target;
        self
    }
}

impl Navigator {
    /// List the key and index paths below `start`, depth first, in document order.
    pub fn paths(
        &mut self,
        value: &ExplorerValue,
        start: &Path,
        filter: &PathsFilter,
    ) -> Result<Vec<Path>> {
        let root = locate(value, start)?;
        let mut found = Vec::new();
        self.collect_paths(root, start, filter, &mut found);
        tracing::debug!(start = %start, count = found.len(), "listed paths");
        Ok(found)
    }

    fn collect_paths(
        &mut self,
        value: &ExplorerValue,
        current: &Path,
        filter: &PathsFilter,
        found: &mut Vec<Path>,
    ) {
        let children: Vec<(PathElement, &ExplorerValue)> = match value {
            ExplorerValue::Dictionary(dict) => dict
                .iter()
                .map(|(key, child)| (PathElement::Key(key.clone()), child))
                .collect(),
            ExplorerValue::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, child)| (PathElement::Index(index as i64), child))
                .collect(),
            _ => return,
        };

        for (element, child) in children {
            let path = current.appending(element);
            if self.keeps(&path, child, filter) {
                found.push(path.clone());
            }
            if child.is_group() {
                self.collect_paths(child, &path, filter, found);
            }
        }
    }

    fn keeps(&mut self, path: &Path, value: &ExplorerValue, filter: &PathsFilter) -> bool {
        if !filter.target.includes(value) {
            return false;
        }
        if let Some(regex) = &filter.key {
            if !last_key(path).is_some_and(|key| regex.is_match(key)) {
                return false;
            }
        }
        match &filter.value {
            Some(_) if value.is_group() => false,
            Some(predicate) => self.evaluate(predicate, value),
            None => true,
        }
    }

    /// Read every path (keys and indices only) and merge the results into one
    /// value shaped like the document, in the order the paths are given.
    ///
    /// Array positions are not kept: elements read from the same array are
    /// compacted and come out in argument order, so `ratings[1]` then
    /// `ratings[0]` yields `[ratings[1], ratings[0]]`.
    pub fn extract(&mut self, value: &ExplorerValue, paths: &[Path]) -> Result<ExplorerValue> {
        let mut tree = PathTree::with_order(SiblingOrder::FirstSeen);
        for path in paths {
            let found = locate(value, path)?;
            tree.insert(found.clone(), path)?;
        }
        tracing::debug!(paths = paths.len(), "extracted values");
        tree.flatten()
    }
}

fn last_key(path: &Path) -> Option<&str> {
    path.iter().rev().find_map(|element| match element {
        PathElement::Key(key) => Some(key.as_str()),
        _ => None,
    })
}
