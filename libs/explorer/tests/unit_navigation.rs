//! Unit tests for reading and mutating values along paths

use std::collections::BTreeSet;

use sextant_explorer::{Error, ExplorerValue, Navigator, PathsFilter, PathsTarget, Predicate, ValueKind};

mod test_support;
use test_support::{array, dict, int, path, people, s};

fn get(value: &ExplorerValue, text: &str) -> ExplorerValue {
    value
        .get(&path(text))
        .unwrap_or_else(|e| panic!("reading '{}': {}", text, e))
}

fn keys(value: &ExplorerValue) -> Vec<String> {
    value
        .as_dictionary()
        .map(|d| d.keys().cloned().collect())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

#[test]
fn test_get_keys_and_indices() {
    let doc = people();
    assert_eq!(get(&doc, "people.Tom.age"), int(68));
    assert_eq!(get(&doc, "people.Robert.hobbies[0]"), s("video games"));
    assert_eq!(get(&doc, "people.Suzanne.movies[1].title"), s("Yesterday will never go"));
    assert_eq!(get(&doc, ""), doc);
}

#[test]
fn test_negative_index_counts_from_end() {
    let doc = people();
    assert_eq!(
        get(&doc, "people.Robert.hobbies[-1]"),
        get(&doc, "people.Robert.hobbies[2]")
    );
    assert_eq!(get(&doc, "ratings[-4]"), int(2));
}

#[test]
fn test_get_count() {
    let doc = people();
    assert_eq!(get(&doc, "people.Tom.hobbies[#]"), int(2));
    assert_eq!(get(&doc, "people[#]"), int(3));
}

#[test]
fn test_get_slices() {
    let doc = people();
    assert_eq!(get(&doc, "ratings[1:2]"), array([int(4), int(6)]));
    assert_eq!(get(&doc, "ratings[:1]"), array([int(2), int(4)]));
    assert_eq!(get(&doc, "ratings[2:]"), array([int(6), int(8)]));
    assert_eq!(get(&doc, "ratings[-2:]"), array([int(4), int(6), int(8)]));
    assert_eq!(
        get(&doc, "people.Suzanne.movies[:].title"),
        array([s("Tomorrow is today"), s("Yesterday will never go")])
    );
}

#[test]
fn test_get_filters() {
    let doc = people();
    assert_eq!(get(&doc, "ratings[value > 4]"), array([int(6), int(8)]));
    assert_eq!(
        get(&doc, "people.Robert.hobbies[value contains 'a']"),
        array([s("video games"), s("party")])
    );

    let mut navigator = Navigator::new();
    let found = navigator
        .get(&doc, &path("people.Tom[value > 100]"))
        .unwrap();
    assert_eq!(found, dict([("height", int(175))]));
    assert_eq!(
        navigator.mismatches().get("value > 100"),
        Some(&BTreeSet::from([ValueKind::Array]))
    );
}

#[test]
fn test_get_key_name() {
    let doc = people();
    assert_eq!(get(&doc, "people.#Tom#"), s("Tom"));
    assert_eq!(
        doc.get(&path("people.#Ben#")).unwrap_err(),
        Error::SubscriptMissingKey {
            path: path("people"),
            key: "Ben".into()
        }
    );
}

#[test]
fn test_get_errors() {
    let doc = people();
    assert_eq!(
        doc.get(&path("people.Ben.age")).unwrap_err(),
        Error::SubscriptMissingKey {
            path: path("people"),
            key: "Ben".into()
        }
    );
    assert_eq!(
        doc.get(&path("ratings[4]")).unwrap_err(),
        Error::SubscriptWrongIndex {
            path: path("ratings"),
            index: 4,
            count: 4
        }
    );
    assert_eq!(
        doc.get(&path("ratings.first")).unwrap_err(),
        Error::WrongValueType {
            path: path("ratings"),
            expected: "dictionary",
            found: ValueKind::Array
        }
    );
    assert_eq!(
        doc.get(&path("people.Tom.age[0]")).unwrap_err(),
        Error::WrongValueType {
            path: path("people.Tom.age"),
            expected: "array",
            found: ValueKind::Int
        }
    );
    assert!(matches!(
        doc.get(&path("ratings[2:9]")).unwrap_err(),
        Error::WrongBounds {
            last_valid_index: 3,
            ..
        }
    ));
    assert!(matches!(
        doc.get(&path("people[#].age")).unwrap_err(),
        Error::WrongUsage(_)
    ));
    assert!(matches!(
        doc.get(&path("people.#Tom#.age")).unwrap_err(),
        Error::WrongUsage(_)
    ));
}

// ---------------------------------------------------------------------------
// Setting
// ---------------------------------------------------------------------------

#[test]
fn test_set_replaces_and_inserts() {
    let mut doc = people();
    doc.set(&path("people.Tom.age"), 70).unwrap();
    assert_eq!(get(&doc, "people.Tom.age"), int(70));

    doc.set(&path("people.Tom.surname"), "Smith").unwrap();
    assert_eq!(
        keys(&get(&doc, "people.Tom")),
        vec!["age", "height", "hobbies", "surname"]
    );

    doc.set(&path("ratings[-1]"), 0).unwrap();
    assert_eq!(get(&doc, "ratings"), array([int(2), int(4), int(6), int(0)]));

    // one past the end appends
    doc.set(&path("ratings[4]"), 10).unwrap();
    assert_eq!(get(&doc, "ratings[#]"), int(5));

    doc.set(&path(""), "replaced").unwrap();
    assert_eq!(doc, s("replaced"));
}

#[test]
fn test_set_errors() {
    let mut doc = people();
    assert_eq!(
        doc.set(&path("ratings[5]"), 1).unwrap_err(),
        Error::SubscriptWrongIndex {
            path: path("ratings"),
            index: 5,
            count: 4
        }
    );
    assert_eq!(
        doc.set(&path("people.Ben.age"), 1).unwrap_err(),
        Error::SubscriptMissingKey {
            path: path("people"),
            key: "Ben".into()
        }
    );
    assert!(matches!(
        doc.set(&path("people[#]"), 1).unwrap_err(),
        Error::WrongValueType {
            expected: "array",
            found: ValueKind::Dictionary,
            ..
        }
    ));
    assert_eq!(doc, people());
}

#[test]
fn test_set_slice_and_filter() {
    let mut doc = people();
    doc.set(&path("ratings[1:2]"), 0).unwrap();
    assert_eq!(get(&doc, "ratings"), array([int(2), int(0), int(0), int(8)]));

    let mut doc = people();
    doc.set(&path("ratings[value > 4]"), 5).unwrap();
    assert_eq!(get(&doc, "ratings"), array([int(2), int(4), int(5), int(5)]));

    let mut doc = people();
    doc.set(&path("people.Suzanne.movies[:].awards"), "None").unwrap();
    assert_eq!(
        get(&doc, "people.Suzanne.movies[:].awards"),
        array([s("None"), s("None")])
    );
}

#[test]
fn test_rename_key_keeps_position() {
    let mut doc = people();
    doc.set(&path("people.#Tom#"), "Thomas").unwrap();
    assert_eq!(keys(&get(&doc, "people")), vec!["Thomas", "Robert", "Suzanne"]);
    assert_eq!(get(&doc, "people.Thomas.age"), int(68));

    assert!(matches!(
        doc.set(&path("people.#Thomas#"), "Robert").unwrap_err(),
        Error::WrongUsage(_)
    ));
    assert!(matches!(
        doc.set(&path("people.#Thomas#"), 3).unwrap_err(),
        Error::WrongUsage(_)
    ));
    assert!(matches!(
        doc.set(&path("people.#Tom#"), "Tommy").unwrap_err(),
        Error::SubscriptMissingKey { .. }
    ));
}

// ---------------------------------------------------------------------------
// Adding
// ---------------------------------------------------------------------------

#[test]
fn test_add_inserts() {
    let mut doc = people();
    doc.add(&path("ratings[0]"), 1).unwrap();
    assert_eq!(
        get(&doc, "ratings"),
        array([int(1), int(2), int(4), int(6), int(8)])
    );

    doc.add(&path("ratings[#]"), 10).unwrap();
    assert_eq!(get(&doc, "ratings[-1]"), int(10));

    doc.add(&path("people.Tom.hobbies[1]"), "chess").unwrap();
    assert_eq!(
        get(&doc, "people.Tom.hobbies"),
        array([s("cooking"), s("chess"), s("guitar")])
    );

    doc.add(&path("people.Robert.job"), "baker").unwrap();
    assert_eq!(get(&doc, "people.Robert.job"), s("baker"));
}

#[test]
fn test_add_requires_intermediates() {
    let mut doc = people();
    assert_eq!(
        doc.add(&path("people.Ben.age"), 1).unwrap_err(),
        Error::SubscriptMissingKey {
            path: path("people"),
            key: "Ben".into()
        }
    );
    assert!(matches!(
        doc.add(&path("ratings[1:2]"), 1).unwrap_err(),
        Error::WrongUsage(_)
    ));
    assert!(matches!(
        doc.add(&path(""), 1).unwrap_err(),
        Error::WrongUsage(_)
    ));
}

// ---------------------------------------------------------------------------
// Deleting
// ---------------------------------------------------------------------------

#[test]
fn test_delete() {
    let mut doc = people();
    doc.delete(&path("people.Tom.age")).unwrap();
    assert_eq!(keys(&get(&doc, "people.Tom")), vec!["height", "hobbies"]);

    doc.delete(&path("ratings[0]")).unwrap();
    assert_eq!(get(&doc, "ratings"), array([int(4), int(6), int(8)]));

    let mut doc = people();
    doc.delete(&path("ratings[1:2]")).unwrap();
    assert_eq!(get(&doc, "ratings"), array([int(2), int(8)]));

    let mut doc = people();
    doc.delete(&path("ratings[value < 5]")).unwrap();
    assert_eq!(get(&doc, "ratings"), array([int(6), int(8)]));

    let mut doc = people();
    doc.delete(&path("people.Suzanne.movies[:].awards")).unwrap();
    assert_eq!(
        get(&doc, "people.Suzanne.movies[0]"),
        dict([("title", s("Tomorrow is today"))])
    );
}

#[test]
fn test_delete_errors() {
    let mut doc = people();
    assert!(matches!(
        doc.delete(&path("people.Ben")).unwrap_err(),
        Error::SubscriptMissingKey { .. }
    ));
    assert!(matches!(
        doc.delete(&path("ratings[7]")).unwrap_err(),
        Error::SubscriptWrongIndex { .. }
    ));
    assert!(matches!(
        doc.delete(&path("ratings[#]")).unwrap_err(),
        Error::WrongUsage(_)
    ));
    assert!(matches!(doc.delete(&path("")).unwrap_err(), Error::WrongUsage(_)));
}

#[test]
fn test_delete_pruning_empty() {
    let mut doc = dict([("a", dict([("b", dict([("c", int(1))]))])), ("d", int(2))]);
    Navigator::new()
        .delete_pruning_empty(&mut doc, &path("a.b.c"))
        .unwrap();
    assert_eq!(doc, dict([("d", int(2))]));

    let mut doc = dict([("a", dict([("b", dict([("c", int(1))])), ("x", int(1))]))]);
    Navigator::new()
        .delete_pruning_empty(&mut doc, &path("a.b.c"))
        .unwrap();
    assert_eq!(doc, dict([("a", dict([("x", int(1))]))]));

    let mut doc = dict([("list", array([array([int(1)])]))]);
    Navigator::new()
        .delete_pruning_empty(&mut doc, &path("list[0][0]"))
        .unwrap();
    assert_eq!(doc, ExplorerValue::dictionary());
}

// ---------------------------------------------------------------------------
// Listing and extraction
// ---------------------------------------------------------------------------

fn listed(filter: &PathsFilter, start: &str) -> Vec<String> {
    Navigator::new()
        .paths(&people(), &path(start), filter)
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[test]
fn test_paths_lists_depth_first() {
    assert_eq!(
        listed(&PathsFilter::new(), "people.Tom"),
        vec![
            "people.Tom.age",
            "people.Tom.height",
            "people.Tom.hobbies",
            "people.Tom.hobbies[0]",
            "people.Tom.hobbies[1]",
        ]
    );
}

#[test]
fn test_paths_target() {
    let singles = PathsFilter::new().with_target(PathsTarget::Single);
    assert_eq!(
        listed(&singles, "people.Tom"),
        vec![
            "people.Tom.age",
            "people.Tom.height",
            "people.Tom.hobbies[0]",
            "people.Tom.hobbies[1]",
        ]
    );

    let groups = PathsFilter::new().with_target(PathsTarget::Group);
    assert_eq!(
        listed(&groups, ""),
        vec![
            "people",
            "people.Tom",
            "people.Tom.hobbies",
            "people.Robert",
            "people.Robert.hobbies",
            "people.Suzanne",
            "people.Suzanne.movies",
            "people.Suzanne.movies[0]",
            "people.Suzanne.movies[1]",
            "ratings",
        ]
    );
}

#[test]
fn test_paths_key_pattern() {
    let filter = PathsFilter::new().with_key_pattern("age").unwrap();
    assert_eq!(listed(&filter, ""), vec!["people.Tom.age", "people.Robert.age"]);

    // the pattern must match the whole key
    let filter = PathsFilter::new().with_key_pattern("ag").unwrap();
    assert!(listed(&filter, "").is_empty());

    let filter = PathsFilter::new()
        .with_key_pattern("hob.*")
        .unwrap()
        .with_target(PathsTarget::Single);
    assert_eq!(
        listed(&filter, "people.Robert"),
        vec![
            "people.Robert.hobbies[0]",
            "people.Robert.hobbies[1]",
            "people.Robert.hobbies[2]",
        ]
    );

    assert!(PathsFilter::new().with_key_pattern("(").is_err());
}

#[test]
fn test_paths_value_predicate() {
    let filter =
        PathsFilter::new().with_value_predicate(Predicate::compile("value > 100").unwrap());
    let mut navigator = Navigator::new();
    let found: Vec<String> = navigator
        .paths(&people(), &path(""), &filter)
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();

    assert_eq!(found, vec!["people.Tom.height", "people.Robert.height"]);
    assert!(navigator.mismatches()["value > 100"].contains(&ValueKind::String));
}

#[test]
fn test_extract_merges_paths() {
    let extracted = Navigator::new()
        .extract(
            &people(),
            &[
                path("people.Tom.age"),
                path("people.Robert.age"),
                path("ratings[0]"),
            ],
        )
        .unwrap();

    assert_eq!(
        extracted,
        dict([
            (
                "people",
                dict([("Tom", dict([("age", int(68))])), ("Robert", dict([("age", int(23))]))])
            ),
            ("ratings", array([int(2)])),
        ])
    );
    assert_eq!(keys(&get(&extracted, "people")), vec!["Tom", "Robert"]);
}

#[test]
fn test_extract_compacts_array_elements_in_argument_order() {
    let extracted = Navigator::new()
        .extract(&people(), &[path("ratings[1]"), path("ratings[0]")])
        .unwrap();
    assert_eq!(extracted, dict([("ratings", array([int(4), int(2)]))]));

    let extracted = Navigator::new()
        .extract(&people(), &[path("ratings[3]")])
        .unwrap();
    assert_eq!(extracted, dict([("ratings", array([int(8)]))]));
}

#[test]
fn test_extract_rejects_non_concrete_paths() {
    let err = Navigator::new()
        .extract(&people(), &[path("ratings[1:2]")])
        .unwrap_err();
    assert!(matches!(err, Error::WrongUsage(_)));
}
