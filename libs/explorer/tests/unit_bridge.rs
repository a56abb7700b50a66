//! Unit tests for the serde bridge

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sextant_explorer::{from_value, to_value, Error, ExplorerValue, Path, PathElement};

mod test_support;
use test_support::{array, dict, int, path, s};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Role {
    Admin,
    Guest { since: i64 },
    Custom(String),
    Pair(i64, i64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Person {
    name: String,
    age: u32,
    height: f64,
    hobbies: Vec<String>,
    nickname: Option<String>,
    role: Role,
}

fn tom() -> Person {
    Person {
        name: "Tom".into(),
        age: 68,
        height: 1.75,
        hobbies: vec!["cooking".into(), "guitar".into()],
        nickname: None,
        role: Role::Admin,
    }
}

#[test]
fn test_encode_record() {
    let value = to_value(&tom()).unwrap();
    assert_eq!(
        value,
        dict([
            ("name", s("Tom")),
            ("age", int(68)),
            ("height", ExplorerValue::Double(1.75)),
            ("hobbies", array([s("cooking"), s("guitar")])),
            ("role", s("Admin")),
        ])
    );
}

#[test]
fn test_round_trip_record() {
    let mut person = tom();
    assert_eq!(from_value::<Person>(to_value(&person).unwrap()).unwrap(), person);

    person.nickname = Some("T".into());
    for role in [
        Role::Guest { since: 3 },
        Role::Custom("editor".into()),
        Role::Pair(1, 2),
    ] {
        person.role = role;
        assert_eq!(from_value::<Person>(to_value(&person).unwrap()).unwrap(), person);
    }
}

#[test]
fn test_encode_enum_variants() {
    assert_eq!(
        to_value(&Role::Guest { since: 3 }).unwrap(),
        dict([("Guest", dict([("since", int(3))]))])
    );
    assert_eq!(
        to_value(&Role::Custom("editor".into())).unwrap(),
        dict([("Custom", s("editor"))])
    );
    assert_eq!(
        to_value(&Role::Pair(1, 2)).unwrap(),
        dict([("Pair", array([int(1), int(2)]))])
    );
}

#[test]
fn test_encode_scalars_and_collections() {
    assert_eq!(to_value(&7u8).unwrap(), int(7));
    assert_eq!(to_value(&-7i16).unwrap(), int(-7));
    assert_eq!(to_value(&1.5f32).unwrap(), ExplorerValue::Double(1.5));
    assert_eq!(to_value(&'x').unwrap(), s("x"));
    assert_eq!(to_value(&(1, "a")).unwrap(), array([int(1), s("a")]));

    let mut map = BTreeMap::new();
    map.insert("b", 2);
    map.insert("a", 1);
    assert_eq!(to_value(&map).unwrap(), dict([("a", int(1)), ("b", int(2))]));
}

#[test]
fn test_explorer_value_is_its_own_encoding() {
    let date = Utc.with_ymd_and_hms(2024, 5, 17, 8, 30, 0).unwrap();
    let value = dict([
        ("data", ExplorerValue::Data(vec![1, 2, 3])),
        ("date", ExplorerValue::Date(date)),
        ("list", array([int(1), ExplorerValue::Bool(true)])),
    ]);

    let encoded = to_value(&value).unwrap();
    assert_eq!(encoded, value);
    assert_eq!(from_value::<ExplorerValue>(encoded).unwrap(), value);
}

#[test]
fn test_unrepresentable_values() {
    assert!(matches!(
        to_value(&u64::MAX).unwrap_err(),
        Error::ValueConversion { .. }
    ));
    assert!(to_value(&()).is_err());
    assert!(to_value(&Option::<i32>::None).is_err());

    // sequence elements are coded with `[#]`
    assert_eq!(
        to_value(&vec![1u64, u64::MAX]).unwrap_err(),
        Error::ValueConversion {
            path: Path::new(vec![PathElement::Count]),
            message: format!("integer {} does not fit in a signed 64-bit int", u64::MAX),
        }
    );
}

#[test]
fn test_decode_error_names_innermost_path() {
    let mut value = to_value(&tom()).unwrap();
    value.set(&path("age"), "old").unwrap();
    match from_value::<Person>(value).unwrap_err() {
        Error::ValueConversion { path: at, message } => {
            assert_eq!(at, path("age"));
            assert!(message.contains("invalid type"), "{}", message);
        }
        other => panic!("unexpected error {other:?}"),
    }

    let mut value = to_value(&tom()).unwrap();
    value.set(&path("hobbies[1]"), 3).unwrap();
    match from_value::<Person>(value).unwrap_err() {
        Error::ValueConversion { path: at, .. } => assert_eq!(at, path("hobbies[1]")),
        other => panic!("unexpected error {other:?}"),
    }

    let mut value = to_value(&tom()).unwrap();
    value.set(&path("role"), dict([("Guest", dict([("since", s("x"))]))])).unwrap();
    match from_value::<Person>(value).unwrap_err() {
        Error::ValueConversion { path: at, .. } => assert_eq!(at, path("role.Guest.since")),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_decode_missing_field() {
    let mut value = to_value(&tom()).unwrap();
    value.delete(&path("name")).unwrap();
    match from_value::<Person>(value).unwrap_err() {
        Error::ValueConversion { path: at, message } => {
            assert!(at.is_empty());
            assert!(message.contains("name"), "{}", message);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_decode_dates_as_strings() {
    let date = Utc.with_ymd_and_hms(2024, 5, 17, 8, 30, 0).unwrap();
    let text: String = from_value(ExplorerValue::Date(date)).unwrap();
    assert_eq!(text, "2024-05-17T08:30:00Z");

    let decoded: chrono::DateTime<Utc> = from_value(ExplorerValue::Date(date)).unwrap();
    assert_eq!(decoded, date);
}
