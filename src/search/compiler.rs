//! Compiles relationship search terms into `SearchAttribute::Source` nodes.
//!
//! Every target in the search value contributes its reverse-related set:
//! the nodes that reach it through the relation in the forward direction.
//!
//! | Match | Occurrence | Combination |
//! |-------|------------|-------------|
//! | exact | `Required` | first set seeds, the rest intersect |
//! | exact | `Optional` | union |
//! | exact | `Forbidden` | term skipped |
//! | loose | any | union |
//!
//! Loose matching has no AND: even `Required` terms are unioned.
//!
//! Compilation is read-only and never fails. A reverse lookup that errors
//! is logged and counts as an empty set for that one target.

use tracing::{trace, warn};

use crate::endpoint::Related;
use crate::model::{Direction, Node};
use crate::predicate::NodePredicate;
use crate::schema::RelationDescriptor;
use crate::security::SecurityContext;
use crate::storage::GraphStore;
use crate::Error;
use super::{NodeSet, Occurrence, RelationRef, SearchAttribute};

/// Nodes that reach `target` through `relation`, filtered by `predicate`.
///
/// Never fails: a traversal error is logged at warning level and yields an
/// empty set.
pub fn reverse_related<S: GraphStore>(
    relation: &RelationDescriptor,
    store: &S,
    tx: &S::Tx,
    ctx: &dyn SecurityContext,
    target: &Node,
    predicate: Option<&dyn NodePredicate>,
) -> NodeSet {
    match relation.source().get(store, tx, ctx, target, predicate) {
        Ok(Some(Related::Single(node))) => NodeSet::from_iter([node]),
        Ok(Some(Related::Many(nodes))) => nodes.into_iter().collect(),
        Ok(None) => NodeSet::new(),
        Err(err) => {
            let err = Error::Traversal(err.to_string());
            warn!(
                relation = %relation.id,
                target = %target.id,
                error = %err,
                "Unable to fetch related nodes, treating term as empty"
            );
            NodeSet::new()
        }
    }
}

/// Compile one relationship term.
///
/// An empty search value yields `SearchAttribute::Empty` ("the property is
/// unset"); anything else yields a `SearchAttribute::Source` carrying the
/// combined reverse-related sets.
#[allow(clippy::too_many_arguments)]
pub fn compile_relation_search<S: GraphStore>(
    key: &str,
    relation: &RelationDescriptor,
    store: &S,
    tx: &S::Tx,
    ctx: &dyn SecurityContext,
    occurrence: Occurrence,
    targets: &[Node],
    exact: bool,
    predicate: Option<&dyn NodePredicate>,
) -> SearchAttribute {
    if targets.is_empty() {
        return SearchAttribute::Empty {
            key: key.to_string(),
            occurrence,
            relation: Some(RelationRef {
                rel_type: relation.rel_type.clone(),
                direction: Direction::Outgoing,
                far_type: relation.target_type.clone(),
            }),
        };
    }

    let mut result = NodeSet::new();
    let mut seeded = false;

    for target in targets {
        if exact && occurrence == Occurrence::Forbidden {
            continue;
        }

        let related = reverse_related(relation, store, tx, ctx, target, predicate);
        trace!(key, target = %target.id, matches = related.len(), "reverse lookup");

        match (exact, occurrence) {
            (true, Occurrence::Required) if seeded => result.intersect_with(&related),
            (true, Occurrence::Required) => {
                result = related;
                seeded = true;
            }
            _ => result.union_with(related),
        }
    }

    SearchAttribute::Source {
        key: key.to_string(),
        occurrence,
        result,
    }
}
