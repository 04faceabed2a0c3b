//! # Search Attributes
//!
//! Properties compile their search terms into `SearchAttribute` nodes. A
//! query executor then evaluates the tree; `executor::evaluate` is the
//! reference implementation over any `GraphStore`.
//!
//! ## Occurrence
//!
//! | Occurrence | Combines as |
//! |------------|-------------|
//! | `Required` | AND |
//! | `Optional` | OR |
//! | `Forbidden` | NOT, applied by the executor |

pub mod node_set;
pub mod compiler;
pub mod executor;

use serde::{Deserialize, Serialize};

use crate::model::{Direction, Value};

pub use node_set::NodeSet;
pub use compiler::{compile_relation_search, reverse_related};
pub use executor::evaluate;

/// Composition role of a search term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Occurrence {
    #[default]
    Required,
    Optional,
    Forbidden,
}

/// How the children of a group combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Combinator {
    Intersection,
    Union,
}

/// The relation an empty-filter attribute tests, as seen from the matched node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRef {
    pub rel_type: String,
    pub direction: Direction,
    /// Type of the node at the other end; edges to other types belong to
    /// other relations sharing `rel_type`.
    pub far_type: String,
}

/// One node of a compiled query tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchAttribute {
    /// Leaf match on a plain node property.
    Property {
        key: String,
        value: Value,
        occurrence: Occurrence,
        exact: bool,
    },

    /// Precomputed result set of a relationship term.
    Source {
        key: String,
        occurrence: Occurrence,
        result: NodeSet,
    },

    /// "The property is unset on the matched node."
    ///
    /// Produced for an empty or blank search value. This is not the same
    /// as a `Source` whose result happens to be empty.
    Empty {
        key: String,
        occurrence: Occurrence,
        relation: Option<RelationRef>,
    },

    /// Composite of child attributes.
    Group {
        occurrence: Occurrence,
        combinator: Combinator,
        children: Vec<SearchAttribute>,
    },
}

impl SearchAttribute {
    pub fn group(
        occurrence: Occurrence,
        combinator: Combinator,
        children: Vec<SearchAttribute>,
    ) -> Self {
        SearchAttribute::Group { occurrence, combinator, children }
    }

    pub fn occurrence(&self) -> Occurrence {
        match self {
            SearchAttribute::Property { occurrence, .. }
            | SearchAttribute::Source { occurrence, .. }
            | SearchAttribute::Empty { occurrence, .. }
            | SearchAttribute::Group { occurrence, .. } => *occurrence,
        }
    }

    /// Property key the attribute was compiled from; `None` for groups.
    pub fn key(&self) -> Option<&str> {
        match self {
            SearchAttribute::Property { key, .. }
            | SearchAttribute::Source { key, .. }
            | SearchAttribute::Empty { key, .. } => Some(key.as_str()),
            SearchAttribute::Group { .. } => None,
        }
    }

    pub fn is_empty_filter(&self) -> bool {
        matches!(self, SearchAttribute::Empty { .. })
    }

    /// Result set of a `Source` attribute.
    pub fn result(&self) -> Option<&NodeSet> {
        match self {
            SearchAttribute::Source { result, .. } => Some(result),
            _ => None,
        }
    }
}
