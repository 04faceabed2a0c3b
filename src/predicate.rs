//! Node predicates.
//!
//! Callers may narrow a traversal or a reverse lookup with their own
//! predicate. It is always combined (AND) with the accessor's own
//! filtering, never substituted for it.

use crate::model::Node;

/// A filter over nodes.
pub trait NodePredicate: Send + Sync {
    fn accept(&self, node: &Node) -> bool;
}

impl<F> NodePredicate for F
where
    F: Fn(&Node) -> bool + Send + Sync,
{
    fn accept(&self, node: &Node) -> bool {
        self(node)
    }
}

/// Logical AND of two predicates, evaluated left to right.
pub struct And<A, B>(pub A, pub B);

impl<A: NodePredicate, B: NodePredicate> NodePredicate for And<A, B> {
    fn accept(&self, node: &Node) -> bool {
        self.0.accept(node) && self.1.accept(node)
    }
}

/// Matches nodes of one type tag.
#[derive(Debug, Clone)]
pub struct OfType(pub String);

impl NodePredicate for OfType {
    fn accept(&self, node: &Node) -> bool {
        node.is_a(&self.0)
    }
}

/// Drops missing targets, then applies the caller's predicate if any.
///
/// This is the built-in filter every relation read goes through: a dangling
/// edge to a deleted node yields `None` and is dropped before any caller
/// predicate sees it.
pub fn not_null<'a>(
    nodes: impl IntoIterator<Item = Option<Node>> + 'a,
    predicate: Option<&'a dyn NodePredicate>,
) -> impl Iterator<Item = Node> + 'a {
    nodes
        .into_iter()
        .flatten()
        .filter(move |n| predicate.map_or(true, |p| p.accept(n)))
}
