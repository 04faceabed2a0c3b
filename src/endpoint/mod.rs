//! # Endpoint Accessors
//!
//! An `Endpoint` reads and replaces the edges of one relation as seen from
//! one of its ends:
//!
//! | Side | Walks | From | Reaches |
//! |------|-------|------|---------|
//! | `Target` | outgoing | a source node | its targets |
//! | `Source` | incoming | a target node | its sources |
//!
//! Whether an end is single- or many-valued follows from the relation's
//! cardinality. Reads return a tagged `Related` value instead of making
//! callers inspect what came back.

use hashbrown::HashSet;
use tracing::{debug, trace};

use crate::model::{Direction, Node, NodeId, RelId};
use crate::predicate::{self, NodePredicate};
use crate::schema::RelationDescriptor;
use crate::security::{Permission, SecurityContext};
use crate::storage::{EdgeChanges, GraphStore};
use crate::{Error, Result};

/// Which end of a relation an endpoint reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Source,
    Target,
}

/// What an endpoint read produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Related {
    Single(Node),
    Many(Vec<Node>),
}

impl Related {
    pub fn into_nodes(self) -> Vec<Node> {
        match self {
            Related::Single(node) => vec![node],
            Related::Many(nodes) => nodes,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Related::Single(_) => 1,
            Related::Many(nodes) => nodes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Accessor for one end of a relation. Cheap to create; borrows the
/// descriptor it was taken from.
#[derive(Debug, Clone, Copy)]
pub struct Endpoint<'r> {
    relation: &'r RelationDescriptor,
    side: Side,
}

impl<'r> Endpoint<'r> {
    pub fn new(relation: &'r RelationDescriptor, side: Side) -> Self {
        Self { relation, side }
    }

    pub fn relation(&self) -> &'r RelationDescriptor {
        self.relation
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Direction walked from the near node.
    pub fn direction(&self) -> Direction {
        match self.side {
            Side::Target => Direction::Outgoing,
            Side::Source => Direction::Incoming,
        }
    }

    /// Type of the nodes this endpoint reaches.
    pub fn far_type(&self) -> &'r str {
        match self.side {
            Side::Target => &self.relation.target_type,
            Side::Source => &self.relation.source_type,
        }
    }

    pub fn is_many(&self) -> bool {
        match self.side {
            Side::Target => self.relation.cardinality.target_is_many(),
            Side::Source => self.relation.cardinality.source_is_many(),
        }
    }

    /// Whether a far node may be linked to only one near node.
    fn far_is_exclusive(&self) -> bool {
        match self.side {
            Side::Target => !self.relation.cardinality.source_is_many(),
            Side::Source => !self.relation.cardinality.target_is_many(),
        }
    }

    /// Type of the nodes this endpoint is read from.
    pub fn near_type(&self) -> &'r str {
        match self.side {
            Side::Target => &self.relation.source_type,
            Side::Source => &self.relation.target_type,
        }
    }

    /// Edges of this relation at `from` walking `dir`, paired with the node
    /// at their other end.
    ///
    /// Relations may share an edge type, so an edge only counts when its
    /// other end is a `far_type`. Dangling edges are skipped.
    fn edges_from<S: GraphStore>(
        &self,
        store: &S,
        tx: &S::Tx,
        from: NodeId,
        dir: Direction,
        far_type: &str,
    ) -> Result<Vec<(RelId, Node)>> {
        let rels = store.get_relationships(tx, from, dir, Some(self.relation.rel_type.as_str()))?;
        let mut edges = Vec::with_capacity(rels.len());
        for rel in rels {
            let Some(far) = rel.far_end(from, dir) else { continue };
            match store.get_node(tx, far)? {
                Some(node) if node.is_a(far_type) => edges.push((rel.id, node)),
                _ => {}
            }
        }
        Ok(edges)
    }

    /// Read the related nodes of `node`.
    ///
    /// Dangling edges and nodes the context may not read are dropped before
    /// `predicate` is applied. Many-valued ends always return
    /// `Related::Many`; single-valued ends return `Related::Single` or `None`.
    pub fn get<S: GraphStore>(
        &self,
        store: &S,
        tx: &S::Tx,
        ctx: &dyn SecurityContext,
        node: &Node,
        predicate: Option<&dyn NodePredicate>,
    ) -> Result<Option<Related>> {
        let edges = self.edges_from(store, tx, node.id, self.direction(), self.far_type())?;
        let fetched: Vec<Option<Node>> = edges
            .into_iter()
            .map(|(_, far)| Some(far).filter(|n| ctx.is_allowed(n, Permission::Read)))
            .collect();

        let mut related = predicate::not_null(fetched, predicate);
        if self.is_many() {
            return Ok(Some(Related::Many(related.collect())));
        }

        let first = related.next();
        if related.next().is_some() {
            debug!(
                relation = %self.relation.id,
                node = %node.id,
                "single-valued end has more than one edge, using the first"
            );
        }
        Ok(first.map(Related::Single))
    }

    /// Replace the related nodes of `node` with `targets`, returning the
    /// previous ones.
    ///
    /// Write permission is required on `node`, on every target and on every
    /// node the replacement unlinks, including ones the context cannot read.
    /// Everything is checked before the store is touched, and the whole
    /// replacement goes to the store as one `EdgeChanges` batch. When a far
    /// node may belong to only one near node (e.g. a child in a one-to-many
    /// containment), its existing edge to another node is removed.
    pub fn set<S: GraphStore>(
        &self,
        store: &S,
        tx: &mut S::Tx,
        ctx: &dyn SecurityContext,
        node: &Node,
        targets: &[Node],
    ) -> Result<Vec<Node>> {
        ctx.check(node, Permission::Write)?;

        if !self.is_many() && targets.len() > 1 {
            return Err(Error::ConstraintViolation(format!(
                "relation '{}' allows one related node, got {}",
                self.relation.id,
                targets.len()
            )));
        }

        let far_type = self.far_type();
        let mut resolved = Vec::with_capacity(targets.len());
        for target in targets {
            let current = store
                .get_node(tx, target.id)?
                .ok_or_else(|| Error::NotFound(format!("Node {}", target.id)))?;
            if !current.is_a(far_type) {
                return Err(Error::TypeError {
                    expected: far_type.to_string(),
                    got: current.node_type,
                });
            }
            ctx.check(&current, Permission::Write)?;
            resolved.push(current.id);
        }

        let dir = self.direction();
        let existing = self.edges_from(store, tx, node.id, dir, far_type)?;

        let mut changes = EdgeChanges::new(self.relation.rel_type.as_str());
        let mut removing: HashSet<RelId> = HashSet::new();
        let mut previous = Vec::with_capacity(existing.len());
        for (rel, far) in existing {
            if !resolved.contains(&far.id) {
                ctx.check(&far, Permission::Write)?;
            }
            if removing.insert(rel) {
                changes.remove.push(rel);
            }
            previous.push(far);
        }

        if self.far_is_exclusive() {
            for far in &resolved {
                let owners = self.edges_from(store, tx, *far, dir.reverse(), self.near_type())?;
                for (rel, owner) in owners {
                    if owner.id != node.id && removing.insert(rel) {
                        changes.remove.push(rel);
                    }
                }
            }
        }

        for far in &resolved {
            changes.create.push(match self.side {
                Side::Target => (node.id, *far),
                Side::Source => (*far, node.id),
            });
        }

        trace!(
            relation = %self.relation.id,
            node = %node.id,
            removed = changes.remove.len(),
            created = changes.create.len(),
            "replacing relation edges"
        );
        store.apply_edge_changes(tx, &changes)?;

        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyMap;
    use crate::schema::Cardinality;
    use crate::security::{AccessList, SuperUserContext};
    use crate::storage::MemoryStore;
    use crate::tx::TxMode;

    type Tx = <MemoryStore as GraphStore>::Tx;

    fn node(store: &MemoryStore, tx: &mut Tx, node_type: &str) -> Node {
        let id = store.create_node(tx, node_type, PropertyMap::new()).unwrap();
        store.get_node(tx, id).unwrap().unwrap()
    }

    fn nodes(store: &MemoryStore, tx: &mut Tx, node_type: &str, n: usize) -> Vec<Node> {
        (0..n).map(|_| node(store, tx, node_type)).collect()
    }

    fn ids(nodes: &[Node]) -> Vec<NodeId> {
        nodes.iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_many_end_set_then_get() {
        let rel = RelationDescriptor::children("folders", "Folder", "Folder");
        let store = MemoryStore::new();
        let mut tx = store.begin_tx(TxMode::ReadWrite).unwrap();
        let f = nodes(&store, &mut tx, "Folder", 3);

        let prev = rel
            .target()
            .set(&store, &mut tx, &SuperUserContext, &f[0], &[f[2].clone(), f[1].clone()])
            .unwrap();
        assert!(prev.is_empty());

        let got = rel.target().get(&store, &tx, &SuperUserContext, &f[0], None).unwrap();
        assert_eq!(got, Some(Related::Many(vec![f[2].clone(), f[1].clone()])));

        let prev =
            rel.target().set(&store, &mut tx, &SuperUserContext, &f[0], &[f[1].clone()]).unwrap();
        assert_eq!(ids(&prev), vec![f[2].id, f[1].id]);
    }

    #[test]
    fn test_single_end_of_containment() {
        let rel = RelationDescriptor::children("folders", "Folder", "Folder");
        let store = MemoryStore::new();
        let mut tx = store.begin_tx(TxMode::ReadWrite).unwrap();
        let (parent, child) = (node(&store, &mut tx, "Folder"), node(&store, &mut tx, "Folder"));

        assert_eq!(rel.source().get(&store, &tx, &SuperUserContext, &child, None).unwrap(), None);

        rel.target().set(&store, &mut tx, &SuperUserContext, &parent, &[child.clone()]).unwrap();
        let got = rel.source().get(&store, &tx, &SuperUserContext, &child, None).unwrap();
        assert_eq!(got, Some(Related::Single(parent)));
    }

    #[test]
    fn test_exclusive_far_end_moves_child() {
        let rel = RelationDescriptor::children("folders", "Folder", "Folder");
        let store = MemoryStore::new();
        let mut tx = store.begin_tx(TxMode::ReadWrite).unwrap();
        let f = nodes(&store, &mut tx, "Folder", 3);
        let (p1, p2, child) = (&f[0], &f[1], &f[2]);

        rel.target().set(&store, &mut tx, &SuperUserContext, p1, &[child.clone()]).unwrap();
        rel.target().set(&store, &mut tx, &SuperUserContext, p2, &[child.clone()]).unwrap();

        let p1_children =
            rel.target().get(&store, &tx, &SuperUserContext, p1, None).unwrap().unwrap();
        assert!(p1_children.is_empty());
        assert_eq!(store.relationship_count(&tx).unwrap(), 1);
    }

    #[test]
    fn test_many_to_many_keeps_other_links() {
        let rel = RelationDescriptor::new("tags", "TAGGED", "Page", "Tag", Cardinality::ManyToMany);
        let store = MemoryStore::new();
        let mut tx = store.begin_tx(TxMode::ReadWrite).unwrap();
        let pages = nodes(&store, &mut tx, "Page", 2);
        let tag = node(&store, &mut tx, "Tag");

        rel.target().set(&store, &mut tx, &SuperUserContext, &pages[0], &[tag.clone()]).unwrap();
        rel.target().set(&store, &mut tx, &SuperUserContext, &pages[1], &[tag.clone()]).unwrap();

        let sources =
            rel.source().get(&store, &tx, &SuperUserContext, &tag, None).unwrap().unwrap();
        assert_eq!(ids(&sources.into_nodes()), ids(&pages));
    }

    #[test]
    fn test_relations_sharing_an_edge_type_stay_apart() {
        let folders = RelationDescriptor::children("folders", "Folder", "Folder");
        let files = RelationDescriptor::children("files", "Folder", "File");
        let store = MemoryStore::new();
        let mut tx = store.begin_tx(TxMode::ReadWrite).unwrap();
        let (root, sub) = (node(&store, &mut tx, "Folder"), node(&store, &mut tx, "Folder"));
        let doc = node(&store, &mut tx, "File");

        files.target().set(&store, &mut tx, &SuperUserContext, &root, &[doc.clone()]).unwrap();
        let prev = folders
            .target()
            .set(&store, &mut tx, &SuperUserContext, &root, &[sub.clone()])
            .unwrap();
        assert!(prev.is_empty());

        let got = files.target().get(&store, &tx, &SuperUserContext, &root, None).unwrap();
        assert_eq!(got, Some(Related::Many(vec![doc.clone()])));
        let got = folders.target().get(&store, &tx, &SuperUserContext, &root, None).unwrap();
        assert_eq!(got, Some(Related::Many(vec![sub.clone()])));

        // Moving the subfolder must not touch the file's parent edge.
        let other = node(&store, &mut tx, "Folder");
        folders.target().set(&store, &mut tx, &SuperUserContext, &other, &[sub]).unwrap();
        let parent = files.source().get(&store, &tx, &SuperUserContext, &doc, None).unwrap();
        assert_eq!(parent, Some(Related::Single(root)));
    }

    #[test]
    fn test_single_end_rejects_many_targets() {
        let rel = RelationDescriptor::new("owner", "OWNS", "File", "User", Cardinality::ManyToOne);
        let store = MemoryStore::new();
        let mut tx = store.begin_tx(TxMode::ReadWrite).unwrap();
        let file = node(&store, &mut tx, "File");
        let users = nodes(&store, &mut tx, "User", 2);

        let err = rel.target().set(&store, &mut tx, &SuperUserContext, &file, &users).unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));
        assert_eq!(store.relationship_count(&tx).unwrap(), 0);
    }

    #[test]
    fn test_wrong_target_type_is_rejected() {
        let rel = RelationDescriptor::children("files", "Folder", "File");
        let store = MemoryStore::new();
        let mut tx = store.begin_tx(TxMode::ReadWrite).unwrap();
        let (folder, other) = (node(&store, &mut tx, "Folder"), node(&store, &mut tx, "Folder"));

        let err =
            rel.target().set(&store, &mut tx, &SuperUserContext, &folder, &[other]).unwrap_err();
        assert!(matches!(err, Error::TypeError { .. }));
    }

    #[test]
    fn test_permission_failure_leaves_edges_untouched() {
        let rel = RelationDescriptor::children("folders", "Folder", "Folder");
        let store = MemoryStore::new();
        let mut tx = store.begin_tx(TxMode::ReadWrite).unwrap();
        let f = nodes(&store, &mut tx, "Folder", 3);
        rel.target().set(&store, &mut tx, &SuperUserContext, &f[0], &[f[1].clone()]).unwrap();

        let ctx = AccessList::new("alice").grant_write([f[0].id, f[1].id]);
        let err = rel
            .target()
            .set(&store, &mut tx, &ctx, &f[0], &[f[1].clone(), f[2].clone()])
            .unwrap_err();
        assert!(matches!(err, Error::PermissionDenied { action: Permission::Write, .. }));

        let got = rel.target().get(&store, &tx, &SuperUserContext, &f[0], None).unwrap().unwrap();
        assert_eq!(ids(&got.into_nodes()), vec![f[1].id]);
    }

    #[test]
    fn test_unlinking_needs_write_on_the_old_target() {
        let rel = RelationDescriptor::children("folders", "Folder", "Folder");
        let store = MemoryStore::new();
        let mut tx = store.begin_tx(TxMode::ReadWrite).unwrap();
        let f = nodes(&store, &mut tx, "Folder", 3);
        rel.target().set(&store, &mut tx, &SuperUserContext, &f[0], &[f[1].clone()]).unwrap();

        let ctx = AccessList::new("alice").grant_write([f[0].id, f[2].id]);
        let err = rel.target().set(&store, &mut tx, &ctx, &f[0], &[f[2].clone()]).unwrap_err();
        assert!(matches!(err, Error::PermissionDenied { node, .. } if node == f[1].id));

        let got = rel.target().get(&store, &tx, &SuperUserContext, &f[0], None).unwrap().unwrap();
        assert_eq!(ids(&got.into_nodes()), vec![f[1].id]);
    }

    #[test]
    fn test_unreadable_targets_are_hidden() {
        let rel = RelationDescriptor::children("folders", "Folder", "Folder");
        let store = MemoryStore::new();
        let mut tx = store.begin_tx(TxMode::ReadWrite).unwrap();
        let f = nodes(&store, &mut tx, "Folder", 3);
        rel.target()
            .set(&store, &mut tx, &SuperUserContext, &f[0], &[f[1].clone(), f[2].clone()])
            .unwrap();

        let ctx = AccessList::new("bob").grant_read([f[0].id, f[2].id]);
        let got = rel.target().get(&store, &tx, &ctx, &f[0], None).unwrap().unwrap();
        assert_eq!(ids(&got.into_nodes()), vec![f[2].id]);
    }
}
