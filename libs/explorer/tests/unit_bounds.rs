//! Unit tests for slice bounds resolution

use sextant_explorer::{Bound, Bounds, Error, ExplorerValue, Path};

/// Resolve bounds against the last valid index of an array
fn range(lower: Bound, upper: Bound, last_valid_index: i64) -> Result<(usize, usize), Error> {
    Bounds::new(lower, upper)
        .range(last_valid_index, &Path::root())
        .map(|r| (*r.start(), *r.end()))
}

#[test]
fn test_literal_bounds() {
    assert_eq!(range(Bound::Index(2), Bound::Index(7), 10).unwrap(), (2, 7));
    assert_eq!(range(Bound::Index(3), Bound::Index(3), 10).unwrap(), (3, 3));
}

#[test]
fn test_sentinels() {
    assert_eq!(range(Bound::First, Bound::Index(5), 10).unwrap(), (0, 5));
    assert_eq!(range(Bound::Index(2), Bound::Last, 5).unwrap(), (2, 5));
    assert_eq!(range(Bound::First, Bound::Last, 0).unwrap(), (0, 0));
}

#[test]
fn test_negative_bounds_count_back_from_last() {
    assert_eq!(range(Bound::Index(-2), Bound::Last, 5).unwrap(), (3, 5));
    assert_eq!(range(Bound::Index(4), Bound::Index(-2), 10).unwrap(), (4, 8));
}

#[test]
fn test_invalid_bounds_are_not_clamped() {
    // -2 resolves to 8, past the upper bound 0
    assert!(range(Bound::Index(-2), Bound::Index(0), 10).is_err());
    // lower bound past upper bound
    assert!(range(Bound::Index(10), Bound::Index(1), 5).is_err());
    // upper bound past the last index
    assert!(range(Bound::Index(0), Bound::Index(6), 5).is_err());
    // lower bound before the first index
    assert!(range(Bound::Index(-7), Bound::Last, 5).is_err());
}

#[test]
fn test_empty_array_has_no_range() {
    assert!(range(Bound::First, Bound::Last, -1).is_err());
}

#[test]
fn test_counting_back_past_i64_min_is_wrong_bounds() {
    let err = range(Bound::Index(i64::MIN), Bound::Last, -1).unwrap_err();
    assert!(matches!(err, Error::WrongBounds { last_valid_index: -1, .. }));

    let path = Path::parse("[-9223372036854775808:]").unwrap();
    let err = ExplorerValue::Array(vec![]).get(&path).unwrap_err();
    assert!(matches!(err, Error::WrongBounds { .. }), "got {err:?}");
}

#[test]
fn test_error_carries_context() {
    let path = Path::parse("ratings").unwrap();
    let bounds = Bounds::new(Bound::Index(2), Bound::Index(9));
    let err = bounds.range(3, &path).unwrap_err();
    assert_eq!(
        err,
        Error::WrongBounds {
            bounds,
            path,
            last_valid_index: 3
        }
    );
}

#[test]
fn test_display() {
    assert_eq!(Bounds::all().to_string(), "[:]");
    assert_eq!(Bounds::new(Bound::Index(1), Bound::Index(-1)).to_string(), "[1:-1]");
    assert_eq!(Bounds::new(Bound::First, Bound::Index(2)).to_string(), "[:2]");
    assert_eq!(Bounds::new(Bound::Index(2), Bound::Last).to_string(), "[2:]");
    assert_eq!(Bounds::new(Bound::Index(1), Bound::First).to_string(), "[1:first]");
    assert_eq!(Bounds::new(Bound::Last, Bound::Index(2)).to_string(), "[last:2]");
    assert_eq!(Bounds::new(Bound::Last, Bound::First).to_string(), "[last:first]");
}
