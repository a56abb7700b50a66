//! Shared fixtures for the explorer integration tests
#![allow(dead_code)]

use sextant_explorer::{ExplorerValue, Path};

pub fn path(text: &str) -> Path {
    Path::parse(text).unwrap_or_else(|e| panic!("invalid test path '{}': {}", text, e))
}

pub fn dict<const N: usize>(entries: [(&str, ExplorerValue); N]) -> ExplorerValue {
    entries.into_iter().collect()
}

pub fn array<const N: usize>(items: [ExplorerValue; N]) -> ExplorerValue {
    ExplorerValue::Array(items.into())
}

pub fn s(text: &str) -> ExplorerValue {
    ExplorerValue::from(text)
}

pub fn int(value: i64) -> ExplorerValue {
    ExplorerValue::Int(value)
}

/// Small document with nested dictionaries and arrays
pub fn people() -> ExplorerValue {
    dict([
        (
            "people",
            dict([
                (
                    "Tom",
                    dict([
                        ("age", int(68)),
                        ("height", int(175)),
                        ("hobbies", array([s("cooking"), s("guitar")])),
                    ]),
                ),
                (
                    "Robert",
                    dict([
                        ("age", int(23)),
                        ("height", int(181)),
                        (
                            "hobbies",
                            array([s("video games"), s("party"), s("tennis")]),
                        ),
                    ]),
                ),
                (
                    "Suzanne",
                    dict([
                        ("job", s("actress")),
                        (
                            "movies",
                            array([
                                dict([
                                    ("title", s("Tomorrow is today")),
                                    ("awards", s("Best speech for a silent movie")),
                                ]),
                                dict([
                                    ("title", s("Yesterday will never go")),
                                    ("awards", s("Best title")),
                                ]),
                            ]),
                        ),
                    ]),
                ),
            ]),
        ),
        ("ratings", array([int(2), int(4), int(6), int(8)])),
    ])
}
