//! Command execution over a decoded document

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{bail, Context, Result};
use sextant_explorer::{
    ExplorerValue, Navigator, Path, PathParser, PathsFilter, PathsTarget, Predicate, ValueKind,
};
use sextant_format::DataFormat;

/// What a command produces on stdout
#[derive(Debug, PartialEq)]
pub enum Output {
    /// A single value printed as plain text
    Text(String),
    /// A document encoded in the output format
    Document(ExplorerValue),
    /// One path per line
    Paths(Vec<Path>),
}

impl Output {
    pub fn render(&self, format: DataFormat) -> Result<Vec<u8>> {
        Ok(match self {
            Output::Text(text) => format!("{}\n", text).into_bytes(),
            Output::Document(value) => format
                .encode(value)
                .with_context(|| format!("Failed to encode the result as {}", format))?,
            Output::Paths(paths) => paths
                .iter()
                .map(|path| format!("{}\n", path))
                .collect::<String>()
                .into_bytes(),
        })
    }
}

/// Runs commands, sharing one predicate cache and one mismatch record
pub struct Session {
    parser: PathParser,
    navigator: Navigator,
}

impl Session {
    pub fn new() -> Self {
        Self {
            parser: PathParser::new(),
            navigator: Navigator::new(),
        }
    }

    pub fn parse_path(&self, text: &str) -> Result<Path> {
        self.parser
            .parse(text)
            .with_context(|| format!("Invalid path '{}'", text))
    }

    pub fn read(&mut self, document: &ExplorerValue, paths: &[String]) -> Result<Output> {
        let paths = paths
            .iter()
            .map(|text| self.parse_path(text))
            .collect::<Result<Vec<_>>>()?;

        match paths.as_slice() {
            [] => Ok(Output::Document(document.clone())),
            [path] => {
                let value = self
                    .navigator
                    .get(document, path)
                    .with_context(|| format!("Cannot read '{}'", path))?;
                Ok(single_output(value))
            }
            _ => {
                let value = self
                    .navigator
                    .extract(document, &paths)
                    .context("Cannot extract the requested paths")?;
                Ok(Output::Document(value))
            }
        }
    }

    pub fn set(&mut self, document: &mut ExplorerValue, assignments: &[String]) -> Result<Output> {
        for assignment in assignments {
            let (path, value) = self.assignment(assignment)?;
            self.navigator
                .set(document, &path, value)
                .with_context(|| format!("Cannot set '{}'", path))?;
        }
        Ok(Output::Document(document.clone()))
    }

    pub fn add(&mut self, document: &mut ExplorerValue, assignments: &[String]) -> Result<Output> {
        for assignment in assignments {
            let (path, value) = self.assignment(assignment)?;
            self.navigator
                .add(document, &path, value)
                .with_context(|| format!("Cannot add at '{}'", path))?;
        }
        Ok(Output::Document(document.clone()))
    }

    pub fn delete(
        &mut self,
        document: &mut ExplorerValue,
        paths: &[String],
        prune: bool,
    ) -> Result<Output> {
        for text in paths {
            let path = self.parse_path(text)?;
            let deleted = if prune {
                self.navigator.delete_pruning_empty(document, &path)
            } else {
                self.navigator.delete(document, &path)
            };
            deleted.with_context(|| format!("Cannot delete '{}'", path))?;
        }
        Ok(Output::Document(document.clone()))
    }

    pub fn paths(
        &mut self,
        document: &ExplorerValue,
        start: Option<&str>,
        key: Option<&str>,
        value: Option<&str>,
        target: PathsTarget,
    ) -> Result<Output> {
        let start = match start {
            Some(text) => self.parse_path(text)?,
            None => Path::root(),
        };

        let mut filter = PathsFilter::new().with_target(target);
        if let Some(pattern) = key {
            filter = filter
                .with_key_pattern(pattern)
                .with_context(|| format!("Invalid key pattern '{}'", pattern))?;
        }
        if let Some(text) = value {
            let predicate = Predicate::compile(text)
                .with_context(|| format!("Invalid value predicate '{}'", text))?;
            filter = filter.with_value_predicate(predicate);
        }

        let paths = self
            .navigator
            .paths(document, &start, &filter)
            .with_context(|| format!("Cannot list paths below '{}'", start))?;
        Ok(Output::Paths(paths))
    }

    /// Predicates that skipped values they could not compare, with the skipped kinds
    pub fn take_mismatches(&mut self) -> BTreeMap<String, BTreeSet<ValueKind>> {
        self.navigator.take_mismatches()
    }

    fn assignment(&self, text: &str) -> Result<(Path, ExplorerValue)> {
        let (path, value) = split_assignment(text)?;
        Ok((self.parse_path(path)?, ExplorerValue::from_literal(value)))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Data is encoded rather than printed as its byte count
fn single_output(value: ExplorerValue) -> Output {
    if value.is_group() || matches!(value, ExplorerValue::Data(_)) {
        Output::Document(value)
    } else {
        Output::Text(value.to_string())
    }
}

/// Split `path=value` on the first `=` outside brackets, parentheses and quotes
pub fn split_assignment(text: &str) -> Result<(&str, &str)> {
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '\'' if depth > 0 => in_quote = !in_quote,
            '[' | '(' if !in_quote => depth += 1,
            ']' | ')' if !in_quote => depth = depth.saturating_sub(1),
            '=' if depth == 0 && !in_quote => {
                let path = &text[..i];
                if path.is_empty() {
                    bail!("Missing path before '=' in '{}'", text);
                }
                return Ok((path, &text[i + 1..]));
            }
            _ => {}
        }
    }

    bail!("Expected 'path=value', found '{}'", text)
}
