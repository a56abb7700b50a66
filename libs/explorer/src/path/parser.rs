//! Path parser - converts path text into a [`Path`]
//!
//! Keys are separated by `.`; bracketed segments follow their element directly.
//! Bracket contents are classified in order: `#` (count), integer (index),
//! `lower:upper` (slice), anything else is compiled as a predicate filter.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

use super::{Path, PathElement};
use crate::bounds::{Bound, Bounds};
use crate::error::{Error, Result};
use crate::predicate::Predicate;

const DEFAULT_PREDICATE_CACHE_CAPACITY: usize = 256;

/// Path parser keeping an LRU cache of compiled filter predicates.
///
/// Parsing many paths sharing the same filters (e.g. from a script or a listing)
/// compiles each predicate once.
pub struct PathParser {
    predicates: Mutex<LruCache<String, Arc<Predicate>>>,
}

impl PathParser {
    pub fn new() -> Self {
        Self::with_capacity(
            NonZeroUsize::new(DEFAULT_PREDICATE_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
        )
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            predicates: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn parse(&self, text: &str) -> Result<Path> {
        parse_with(text, &mut |source: &str, offset: usize| {
            self.compile_cached(source, offset)
        })
    }

    fn compile_cached(&self, source: &str, offset: usize) -> Result<Arc<Predicate>> {
        {
            let mut cache = self
                .predicates
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(predicate) = cache.get(source) {
                tracing::trace!(predicate = source, "predicate cache hit");
                return Ok(predicate.clone());
            }
        }

        let predicate = Arc::new(compile_at(source, offset)?);
        tracing::trace!(predicate = source, "predicate cache miss");

        let mut cache = self
            .predicates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.put(source.to_string(), predicate.clone());
        Ok(predicate)
    }
}

impl Default for PathParser {
    fn default() -> Self {
        Self::new()
    }
}

pub(super) fn parse_uncached(text: &str) -> Result<Path> {
    parse_with(text, &mut |source: &str, offset: usize| {
        compile_at(source, offset).map(Arc::new)
    })
}

/// Compile a predicate found at character `offset` of the path text,
/// shifting error positions so they point into the path.
fn compile_at(source: &str, offset: usize) -> Result<Predicate> {
    Predicate::compile(source).map_err(|e| match e {
        Error::Parse { message, position } => Error::Parse {
            message,
            position: position + offset,
        },
        other => other,
    })
}

type CompileFn<'a> = dyn FnMut(&str, usize) -> Result<Arc<Predicate>> + 'a;

fn parse_with(text: &str, compile: &mut CompileFn<'_>) -> Result<Path> {
    let mut parser = Parser {
        chars: text.chars().collect(),
        position: 0,
        compile,
    };
    let path = parser.parse()?;
    tracing::trace!(path = %path, "parsed path");
    Ok(path)
}

struct Parser<'a, 'b> {
    chars: Vec<char>,
    position: usize,
    compile: &'a mut CompileFn<'b>,
}

impl Parser<'_, '_> {
    fn current(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    fn parse(&mut self) -> Result<Path> {
        let mut elements = Vec::new();

        while let Some(c) = self.current() {
            match c {
                '[' => elements.push(self.parse_bracket()?),
                '.' if elements.is_empty() => {
                    return Err(Error::parse(
                        "Path cannot start with '.' (empty key)",
                        self.position,
                    ));
                }
                '.' => {
                    self.position += 1;
                    match self.current() {
                        None => {
                            return Err(Error::parse(
                                "Path cannot end with '.' (empty key)",
                                self.position,
                            ));
                        }
                        Some('.') | Some('[') => {
                            return Err(Error::parse(
                                "Empty key between separators",
                                self.position,
                            ));
                        }
                        Some(_) => elements.push(self.parse_key_like()?),
                    }
                }
                _ if elements.is_empty() => elements.push(self.parse_key_like()?),
                other => {
                    return Err(Error::parse(
                        format!("Unexpected '{}' after '{}'", other, self.slice(0, self.position)),
                        self.position,
                    ));
                }
            }
        }

        Ok(Path::new(elements))
    }

    fn parse_key_like(&mut self) -> Result<PathElement> {
        match self.current() {
            Some('(') => {
                let key = self.read_delimited('(', ')')?;
                Ok(PathElement::Key(key))
            }
            Some('#') => {
                let name = self.read_delimited('#', '#')?;
                Ok(PathElement::KeyName(name))
            }
            _ => Ok(PathElement::Key(self.read_bare_key()?)),
        }
    }

    fn read_bare_key(&mut self) -> Result<String> {
        let start = self.position;
        while let Some(c) = self.current() {
            match c {
                '.' | '[' => break,
                ']' | ')' | '\\' => {
                    return Err(Error::parse(
                        format!(
                            "Unexpected '{}' in key '{}' (wrap the key in parentheses)",
                            c,
                            self.slice(start, self.position + 1)
                        ),
                        self.position,
                    ));
                }
                _ => self.position += 1,
            }
        }
        Ok(self.slice(start, self.position))
    }

    /// Read `open ... close` where `\` escapes the following character
    fn read_delimited(&mut self, open: char, close: char) -> Result<String> {
        let start = self.position;
        self.position += 1; // Skip opening delimiter

        let mut value = String::new();
        while let Some(c) = self.current() {
            self.position += 1;
            if c == '\\' {
                let Some(escaped) = self.current() else {
                    break;
                };
                value.push(escaped);
                self.position += 1;
            } else if c == close {
                return Ok(value);
            } else {
                value.push(c);
            }
        }

        Err(Error::parse(
            format!(
                "Unterminated '{}' in '{}' (expected closing '{}')",
                open,
                self.slice(start, self.chars.len()),
                close
            ),
            start,
        ))
    }

    /// Parse a `[...]` segment, skipping `]` inside quoted predicate strings
    fn parse_bracket(&mut self) -> Result<PathElement> {
        let open = self.position;
        self.position += 1;
        let content_start = self.position;

        let mut in_quote = false;
        let mut close = None;
        while let Some(c) = self.current() {
            match c {
                '\\' if in_quote => self.position += 1,
                '\'' => in_quote = !in_quote,
                ']' if !in_quote => {
                    close = Some(self.position);
                    break;
                }
                _ => {}
            }
            self.position += 1;
        }

        let Some(close) = close else {
            return Err(Error::parse(
                format!(
                    "Unterminated '[' in '{}'",
                    self.slice(open, self.chars.len())
                ),
                open,
            ));
        };
        self.position = close + 1;

        let content = self.slice(content_start, close);
        self.classify_bracket(&content, content_start)
    }

    fn classify_bracket(&mut self, content: &str, offset: usize) -> Result<PathElement> {
        let trimmed = content.trim();

        if trimmed.is_empty() {
            return Err(Error::parse("Empty brackets '[]'", offset));
        }

        if trimmed == "#" {
            return Ok(PathElement::Count);
        }

        if is_integer(trimmed) {
            let index = trimmed.parse::<i64>().map_err(|_| {
                Error::parse(format!("Index '{}' out of range", trimmed), offset)
            })?;
            return Ok(PathElement::Index(index));
        }

        if let Some(colon) = top_level_colon(content) {
            let lower = parse_bound(&content[..colon], Bound::First, offset)?;
            let upper = parse_bound(&content[colon + 1..], Bound::Last, offset)?;
            return Ok(PathElement::Slice(Bounds::new(lower, upper)));
        }

        let predicate = (self.compile)(content, offset)?;
        Ok(PathElement::Filter(predicate))
    }
}

fn is_integer(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Byte offset of the first `:` outside a quoted string
fn top_level_colon(content: &str) -> Option<usize> {
    let mut in_quote = false;
    let mut escaped = false;
    for (i, c) in content.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quote => escaped = true,
            '\'' => in_quote = !in_quote,
            ':' if !in_quote => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_bound(text: &str, sentinel: Bound, offset: usize) -> Result<Bound> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(sentinel);
    }
    if trimmed == Bound::FIRST_KEYWORD {
        return Ok(Bound::First);
    }
    if trimmed == Bound::LAST_KEYWORD {
        return Ok(Bound::Last);
    }
    if !is_integer(trimmed) {
        return Err(Error::parse(
            format!("Invalid slice bound '{}'", trimmed),
            offset,
        ));
    }
    trimmed
        .parse::<i64>()
        .map(Bound::Index)
        .map_err(|_| Error::parse(format!("Slice bound '{}' out of range", trimmed), offset))
}
