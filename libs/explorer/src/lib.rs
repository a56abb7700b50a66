//! Sextant explorer - path and predicate navigation over semi-structured documents
//!
//! Every supported format (JSON, YAML, XML, ...) is decoded into one canonical
//! [`ExplorerValue`]. Values are then read and mutated with compact textual paths:
//!
//! ```text
//! people.Tom.hobbies[0]
//! people[value hasPrefix 'T']
//! ratings[1:3]
//! ```
//!
//! # Architecture Overview
//!
//! ```text
//! Path text ---> PathParser ---> Path ---+
//!                  |                     |
//!          Predicate (filters)           v
//! Document bytes -> format backend -> ExplorerValue -> Navigator -> values
//!                                                         |
//!                             (path, value) results -> PathTree -> ExplorerValue
//! ```
//!
//! Typed values enter and leave the document model through serde ([`bridge`]).

pub mod bounds;
pub mod bridge;
pub mod error;
pub mod navigation;
pub mod path;
pub mod predicate;
pub mod tree;
pub mod value;

// Re-export main types
pub use bounds::{Bound, Bounds};
pub use bridge::{from_value, to_value};
pub use error::{Error, Result};
pub use navigation::{Navigator, PathsFilter, PathsTarget};
pub use path::{Path, PathElement, PathParser};
pub use predicate::{Evaluation, Predicate, PredicateEvaluator, VariableKind};
pub use tree::{NodeMut, PathTree, SiblingOrder, TreeNode};
pub use value::{Dictionary, ExplorerValue, ValueKind};
