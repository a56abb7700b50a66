//! Path tree: assembles one nested value from scattered `(path, value)` writes
//!
//! Every inserted path becomes a branch; intermediate elements become nodes and
//! the terminal element a leaf. [`PathTree::flatten`] then turns nodes whose
//! children are indices into arrays and nodes whose children are keys into
//! dictionaries.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::path::PathElement;
use crate::value::{Dictionary, ExplorerValue};

/// Placement of a new child among its siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SiblingOrder {
    /// Indices numerically, keys lexicographically, counts last in arrival order
    #[default]
    Sorted,
    /// First-insertion order
    FirstSeen,
}

/// Node of a [`PathTree`]
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode<T> {
    Node {
        element: PathElement,
        children: Vec<TreeNode<T>>,
    },
    Leaf {
        element: PathElement,
        value: T,
    },
}

impl<T> TreeNode<T> {
    pub fn element(&self) -> &PathElement {
        match self {
            TreeNode::Node { element, .. } | TreeNode::Leaf { element, .. } => element,
        }
    }
}

/// Tree of path elements under an implicit root
#[derive(Debug, Clone, PartialEq)]
pub struct PathTree<T> {
    order: SiblingOrder,
    children: Vec<TreeNode<T>>,
}

impl<T> Default for PathTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PathTree<T> {
    /// Tree with [`SiblingOrder::Sorted`] placement
    pub fn new() -> Self {
        Self::with_order(SiblingOrder::default())
    }

    pub fn with_order(order: SiblingOrder) -> Self {
        Self {
            order,
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[TreeNode<T>] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Insert `value` at `at`, creating the intermediate nodes.
    ///
    /// Returns the rank of the terminal element among its siblings. Re-inserting at
    /// an existing key replaces the leaf value and keeps its rank.
    pub fn insert(&mut self, value: T, at: &[PathElement]) -> Result<usize> {
        if at.is_empty() {
            return Err(Error::WrongUsage(
                "Cannot insert a value at the root of a path tree".to_string(),
            ));
        }
        insert_into(&mut self.children, self.order, value, at)
    }

    /// Get or create the node for `element` directly under the root
    pub fn add_child(&mut self, element: PathElement) -> Result<(usize, NodeMut<'_, T>)> {
        self.root_mut().add_child(element)
    }

    /// Add (or replace) a leaf directly under the root
    pub fn add_leaf(&mut self, element: PathElement, value: T) -> Result<usize> {
        self.root_mut().add_leaf(element, value)
    }

    fn root_mut(&mut self) -> NodeMut<'_, T> {
        NodeMut {
            order: self.order,
            children: &mut self.children,
        }
    }
}

impl<T: Into<ExplorerValue>> PathTree<T> {
    /// Consume the tree into one nested value. An empty tree is an empty dictionary.
    pub fn flatten(self) -> Result<ExplorerValue> {
        flatten_children(self.children)
    }
}

/// Mutable handle on the children of a tree node
pub struct NodeMut<'a, T> {
    order: SiblingOrder,
    children: &'a mut Vec<TreeNode<T>>,
}

impl<'a, T> NodeMut<'a, T> {
    pub fn add_child(self, element: PathElement) -> Result<(usize, NodeMut<'a, T>)> {
        check_element(&element)?;
        let order = self.order;
        let rank = match find(self.children, &element) {
            Some(rank) => rank,
            None => {
                let rank = position(self.children, order, &element);
                self.children.insert(
                    rank,
                    TreeNode::Node {
                        element,
                        children: Vec::new(),
                    },
                );
                rank
            }
        };

        match &mut self.children[rank] {
            TreeNode::Node { children, .. } => Ok((rank, NodeMut { order, children })),
            TreeNode::Leaf { element, .. } => Err(collision(element)),
        }
    }

    pub fn add_leaf(self, element: PathElement, value: T) -> Result<usize> {
        check_element(&element)?;
        match find(self.children, &element) {
            Some(rank) => match &mut self.children[rank] {
                TreeNode::Leaf { value: existing, .. } => {
                    *existing = value;
                    Ok(rank)
                }
                TreeNode::Node { element, .. } => Err(collision(element)),
            },
            None => {
                let rank = position(self.children, self.order, &element);
                self.children.insert(rank, TreeNode::Leaf { element, value });
                Ok(rank)
            }
        }
    }
}

fn insert_into<T>(
    children: &mut Vec<TreeNode<T>>,
    order: SiblingOrder,
    value: T,
    at: &[PathElement],
) -> Result<usize> {
    let node = NodeMut { order, children };
    match at {
        [] => Err(Error::WrongUsage("Empty path in path tree".to_string())),
        [last] => node.add_leaf(last.clone(), value),
        [first, rest @ ..] => {
            let (_, child) = node.add_child(first.clone())?;
            insert_into(child.children, order, value, rest)
        }
    }
}

fn check_element(element: &PathElement) -> Result<()> {
    match element {
        PathElement::Key(_) | PathElement::Index(_) | PathElement::Count => Ok(()),
        other => Err(Error::WrongUsage(format!(
            "Path tree only accepts keys, indices and counts, got '{}'",
            other
        ))),
    }
}

fn collision(element: &PathElement) -> Error {
    Error::WrongUsage(format!(
        "'{}' is used both as a value and as a container",
        element
    ))
}

/// Existing sibling for `element`. Counts always make a new sibling.
fn find<T>(children: &[TreeNode<T>], element: &PathElement) -> Option<usize> {
    if *element == PathElement::Count {
        return None;
    }
    children.iter().position(|child| child.element() == element)
}

fn position<T>(children: &[TreeNode<T>], order: SiblingOrder, element: &PathElement) -> usize {
    match order {
        SiblingOrder::FirstSeen => children.len(),
        SiblingOrder::Sorted => children
            .partition_point(|child| sort_order(element, child.element()) != Ordering::Less),
    }
}

fn sort_order(new: &PathElement, existing: &PathElement) -> Ordering {
    use PathElement::{Count, Index, Key};

    match (new, existing) {
        (Index(a), Index(b)) => a.cmp(b),
        (Key(a), Key(b)) => a.cmp(b),
        (Count, _) => Ordering::Greater,
        (_, Count) => Ordering::Less,
        (Index(_), _) => Ordering::Less,
        _ => Ordering::Greater,
    }
}

fn flatten_children<T: Into<ExplorerValue>>(children: Vec<TreeNode<T>>) -> Result<ExplorerValue> {
    let index_like = |node: &TreeNode<T>| {
        matches!(node.element(), PathElement::Index(_) | PathElement::Count)
    };

    if children.is_empty() {
        return Ok(ExplorerValue::dictionary());
    }

    if children.iter().all(index_like) {
        let items = children
            .into_iter()
            .map(flatten_node)
            .collect::<Result<Vec<_>>>()?;
        return Ok(ExplorerValue::Array(items));
    }

    if children.iter().any(index_like) {
        return Err(Error::WrongUsage(
            "Cannot flatten siblings mixing keys and indices".to_string(),
        ));
    }

    let mut dictionary = Dictionary::with_capacity(children.len());
    for child in children {
        let key = match child.element() {
            PathElement::Key(key) => key.clone(),
            other => {
                return Err(Error::WrongUsage(format!(
                    "Unexpected '{}' while flattening",
                    other
                )));
            }
        };
        dictionary.insert(key, flatten_node(child)?);
    }
    Ok(ExplorerValue::Dictionary(dictionary))
}

fn flatten_node<T: Into<ExplorerValue>>(node: TreeNode<T>) -> Result<ExplorerValue> {
    match node {
        TreeNode::Leaf { value, .. } => Ok(value.into()),
        TreeNode::Node { children, .. } => flatten_children(children),
    }
}
