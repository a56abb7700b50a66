//! Unit tests for the path tree

use sextant_explorer::{
    Bounds, Error, ExplorerValue, PathElement, PathTree, SiblingOrder, TreeNode,
};

mod test_support;
use test_support::{array, dict, int, s};

fn key(name: &str) -> PathElement {
    PathElement::key(name)
}

#[test]
fn test_sorted_ranks() {
    let mut tree = PathTree::new();
    assert_eq!(tree.insert(int(1), &[key("c")]).unwrap(), 0);
    assert_eq!(tree.insert(int(2), &[key("a")]).unwrap(), 0);
    assert_eq!(tree.insert(int(3), &[key("b")]).unwrap(), 1);
    assert_eq!(tree.insert(int(4), &[key("e")]).unwrap(), 3);

    let order: Vec<&PathElement> = tree.children().iter().map(TreeNode::element).collect();
    assert_eq!(order, vec![&key("a"), &key("b"), &key("c"), &key("e")]);
}

#[test]
fn test_first_seen_ranks() {
    let mut tree = PathTree::with_order(SiblingOrder::FirstSeen);
    assert_eq!(tree.insert(int(1), &[key("c")]).unwrap(), 0);
    assert_eq!(tree.insert(int(2), &[key("a")]).unwrap(), 1);
    assert_eq!(tree.insert(int(3), &[key("b")]).unwrap(), 2);

    let flattened = tree.flatten().unwrap();
    let keys: Vec<&String> = flattened.as_dictionary().unwrap().keys().collect();
    assert_eq!(keys, vec!["c", "a", "b"]);
}

#[test]
fn test_flatten_nested_value() {
    let mut tree = PathTree::new();
    tree.insert(int(30), &[key("Tom"), key("score")]).unwrap();
    tree.insert(s("surfing"), &[key("Tom"), key("hobbies"), PathElement::Count])
        .unwrap();
    tree.insert(s("cooking"), &[key("Tom"), key("hobbies"), PathElement::Count])
        .unwrap();

    assert_eq!(
        tree.flatten().unwrap(),
        dict([(
            "Tom",
            dict([
                ("score", int(30)),
                ("hobbies", array([s("surfing"), s("cooking")])),
            ])
        )])
    );
}

#[test]
fn test_count_always_appends() {
    let mut tree = PathTree::new();
    let at = [key("list"), PathElement::Count];
    assert_eq!(tree.insert(int(1), &at).unwrap(), 0);
    assert_eq!(tree.insert(int(2), &at).unwrap(), 1);
    assert_eq!(tree.insert(int(3), &at).unwrap(), 2);
    assert_eq!(
        tree.flatten().unwrap(),
        dict([("list", array([int(1), int(2), int(3)]))])
    );
}

#[test]
fn test_indices_are_sorted_numerically() {
    let mut tree = PathTree::new();
    assert_eq!(tree.insert(s("c"), &[PathElement::Index(10)]).unwrap(), 0);
    assert_eq!(tree.insert(s("a"), &[PathElement::Index(0)]).unwrap(), 0);
    assert_eq!(tree.insert(s("b"), &[PathElement::Index(2)]).unwrap(), 1);
    assert_eq!(tree.flatten().unwrap(), array([s("a"), s("b"), s("c")]));
}

#[test]
fn test_reinsert_replaces_leaf() {
    let mut tree = PathTree::new();
    tree.insert(int(1), &[key("b")]).unwrap();
    assert_eq!(tree.insert(int(1), &[key("a")]).unwrap(), 0);
    assert_eq!(tree.insert(int(2), &[key("a")]).unwrap(), 0);
    assert_eq!(
        tree.flatten().unwrap(),
        dict([("a", int(2)), ("b", int(1))])
    );
}

#[test]
fn test_add_child_and_leaf() {
    let mut tree: PathTree<ExplorerValue> = PathTree::new();
    let (rank, tom) = tree.add_child(key("Tom")).unwrap();
    assert_eq!(rank, 0);
    tom.add_leaf(key("score"), int(30)).unwrap();

    let (rank, tom) = tree.add_child(key("Tom")).unwrap();
    assert_eq!(rank, 0);
    let (_, hobbies) = tom.add_child(key("hobbies")).unwrap();
    hobbies.add_leaf(PathElement::Count, s("surfing")).unwrap();

    assert_eq!(tree.add_leaf(key("Ann"), int(1)).unwrap(), 0);
    assert_eq!(
        tree.flatten().unwrap(),
        dict([
            ("Ann", int(1)),
            (
                "Tom",
                dict([("score", int(30)), ("hobbies", array([s("surfing")]))])
            ),
        ])
    );
}

#[test]
fn test_empty_tree_flattens_to_empty_dictionary() {
    let tree: PathTree<ExplorerValue> = PathTree::new();
    assert_eq!(tree.flatten().unwrap(), ExplorerValue::dictionary());
}

#[test]
fn test_mixed_siblings_cannot_flatten() {
    let mut tree = PathTree::new();
    tree.insert(int(1), &[key("a")]).unwrap();
    tree.insert(int(2), &[PathElement::Index(0)]).unwrap();
    assert!(matches!(tree.flatten().unwrap_err(), Error::WrongUsage(_)));
}

#[test]
fn test_leaf_node_collision() {
    let mut tree = PathTree::new();
    tree.insert(int(1), &[key("a")]).unwrap();
    assert!(matches!(
        tree.insert(int(2), &[key("a"), key("b")]).unwrap_err(),
        Error::WrongUsage(_)
    ));

    let mut tree = PathTree::new();
    tree.insert(int(1), &[key("a"), key("b")]).unwrap();
    assert!(matches!(
        tree.insert(int(2), &[key("a")]).unwrap_err(),
        Error::WrongUsage(_)
    ));
}

#[test]
fn test_rejects_unsupported_elements() {
    let mut tree = PathTree::new();
    assert!(matches!(
        tree.insert(int(1), &[PathElement::Slice(Bounds::all())]).unwrap_err(),
        Error::WrongUsage(_)
    ));
    assert!(matches!(
        tree.insert(int(1), &[PathElement::KeyName("a".into())]).unwrap_err(),
        Error::WrongUsage(_)
    ));
    assert!(matches!(tree.insert(int(1), &[]).unwrap_err(), Error::WrongUsage(_)));
}
