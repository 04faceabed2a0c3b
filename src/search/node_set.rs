//! Insertion-ordered, id-deduplicated set of nodes.

use hashbrown::HashSet;

use crate::model::{Node, NodeId};

/// Result set of a compiled search term.
///
/// Keeps the order nodes were first inserted in, so the outcome of a
/// compilation is deterministic.
#[derive(Debug, Clone, Default)]
pub struct NodeSet {
    nodes: Vec<Node>,
    ids: HashSet<NodeId>,
}

impl NodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if a node with the same id was already present.
    pub fn insert(&mut self, node: Node) -> bool {
        if self.ids.insert(node.id) {
            self.nodes.push(node);
            true
        } else {
            false
        }
    }

    /// Union in place.
    pub fn union_with(&mut self, other: NodeSet) {
        self.extend(other.nodes);
    }

    /// Intersection in place; keeps this set's order.
    pub fn intersect_with(&mut self, other: &NodeSet) {
        self.nodes.retain(|n| other.ids.contains(&n.id));
        self.ids.retain(|id| other.ids.contains(id));
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    pub fn into_vec(self) -> Vec<Node> {
        self.nodes
    }
}

impl PartialEq for NodeSet {
    /// Set equality; order is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.ids == other.ids
    }
}

impl Extend<Node> for NodeSet {
    fn extend<I: IntoIterator<Item = Node>>(&mut self, iter: I) {
        for node in iter {
            self.insert(node);
        }
    }
}

impl FromIterator<Node> for NodeSet {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        let mut set = NodeSet::new();
        set.extend(iter);
        set
    }
}

impl<'a> IntoIterator for &'a NodeSet {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
