//! Reference query executor.
//!
//! Evaluates compiled search attributes against every node of one type.
//! Production stores are expected to push this down into their own query
//! engine; this one scans.

use crate::model::Node;
use crate::security::{Permission, SecurityContext};
use crate::storage::GraphStore;
use crate::Result;
use super::{Combinator, Occurrence, RelationRef, SearchAttribute};

/// Nodes of `node_type` matching `attrs`, in store order.
///
/// Required attributes must all match, forbidden ones must not match, and
/// when optional attributes are present at least one of them must match.
/// Nodes the context cannot read are never returned.
pub fn evaluate<S: GraphStore>(
    store: &S,
    tx: &S::Tx,
    ctx: &dyn SecurityContext,
    node_type: &str,
    attrs: &[SearchAttribute],
) -> Result<Vec<Node>> {
    let mut matched = Vec::new();
    for node in store.nodes_by_type(tx, node_type)? {
        if ctx.is_allowed(&node, Permission::Read) && combine(store, tx, &node, attrs)? {
            matched.push(node);
        }
    }
    Ok(matched)
}

fn combine<S: GraphStore>(
    store: &S,
    tx: &S::Tx,
    node: &Node,
    attrs: &[SearchAttribute],
) -> Result<bool> {
    let mut any_optional = false;
    let mut optional_hit = false;

    for attr in attrs {
        let hit = matches(store, tx, node, attr)?;
        match attr.occurrence() {
            Occurrence::Required if !hit => return Ok(false),
            Occurrence::Forbidden if hit => return Ok(false),
            Occurrence::Optional => {
                any_optional = true;
                optional_hit |= hit;
            }
            _ => {}
        }
    }

    Ok(!any_optional || optional_hit)
}

/// Whether `node` matches one attribute, ignoring its occurrence.
fn matches<S: GraphStore>(
    store: &S,
    tx: &S::Tx,
    node: &Node,
    attr: &SearchAttribute,
) -> Result<bool> {
    Ok(match attr {
        SearchAttribute::Property { key, value, exact, .. } => match node.get(key) {
            Some(found) if *exact => found == value,
            Some(found) => found.loosely_matches(value),
            None => false,
        },
        SearchAttribute::Source { result, .. } => result.contains(node.id),
        SearchAttribute::Empty { relation: Some(rel), .. } => !has_related(store, tx, node, rel)?,
        SearchAttribute::Empty { key, relation: None, .. } => {
            node.get(key).is_none_or(|v| v.is_blank())
        }
        SearchAttribute::Group { combinator, children, .. } => {
            let mut hits = Vec::with_capacity(children.len());
            for child in children {
                hits.push(matches(store, tx, node, child)?);
            }
            match combinator {
                Combinator::Intersection => hits.iter().all(|h| *h),
                Combinator::Union => hits.iter().any(|h| *h),
            }
        }
    })
}

/// Whether `node` has an edge of `rel` whose other end exists and is of
/// the relation's far type.
fn has_related<S: GraphStore>(
    store: &S,
    tx: &S::Tx,
    node: &Node,
    rel: &RelationRef,
) -> Result<bool> {
    let edges = store.get_relationships(tx, node.id, rel.direction, Some(rel.rel_type.as_str()))?;
    for edge in edges {
        let Some(far) = edge.far_end(node.id, rel.direction) else { continue };
        if store.get_node(tx, far)?.is_some_and(|n| n.is_a(&rel.far_type)) {
            return Ok(true);
        }
    }
    Ok(false)
}
