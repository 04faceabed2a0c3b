//! In-memory graph store.
//!
//! This is the reference implementation of `GraphStore`.
//! It uses simple HashMaps protected by RwLock.
//!
//! ## Limitations
//!
//! - **No real transactions**: `commit_tx()` and `rollback_tx()` are no-ops.
//!   Writes are applied immediately. Rollback does NOT undo mutations.
//!   Read-only transactions do reject writes.
//! - **Batch edge changes are atomic**: `apply_edge_changes()` validates the
//!   whole batch and applies it under one set of write locks, so a
//!   collection replacement is never half-visible.
//! - **No property indexes**: all property lookups do a full scan of the
//!   node type.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use parking_lot::RwLock;

use crate::model::*;
use crate::tx::{Transaction, TxMode, TxId};
use crate::{Error, Result};
use super::{EdgeChanges, GraphStore};

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory property graph storage.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    nodes: RwLock<HashMap<NodeId, Node>>,
    relationships: RwLock<HashMap<RelId, Relationship>>,
    /// node_id → list of relationship IDs, in creation order
    adjacency: RwLock<HashMap<NodeId, Vec<RelId>>>,
    /// node type → node IDs in creation order
    type_index: RwLock<HashMap<String, Vec<NodeId>>>,
    next_node_id: AtomicU64,
    next_rel_id: AtomicU64,
    next_tx_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_node_id(&self) -> NodeId {
        NodeId(self.inner.next_node_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn next_rel_id(&self) -> RelId {
        RelId(self.inner.next_rel_id.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

fn ensure_writable(tx: &MemoryTx) -> Result<()> {
    if tx.is_writable() {
        Ok(())
    } else {
        Err(Error::TxError(format!("{} is read-only", tx.id)))
    }
}

// ============================================================================
// MemoryTx
// ============================================================================

/// In-memory transaction. Only the mode is enforced; there is no MVCC.
#[derive(Debug)]
pub struct MemoryTx {
    id: TxId,
    mode: TxMode,
}

impl Transaction for MemoryTx {
    fn mode(&self) -> TxMode { self.mode }
    fn id(&self) -> TxId { self.id }
}

// ============================================================================
// GraphStore impl
// ============================================================================

impl GraphStore for MemoryStore {
    type Tx = MemoryTx;

    fn begin_tx(&self, mode: TxMode) -> Result<MemoryTx> {
        let id = TxId(self.inner.next_tx_id.fetch_add(1, Ordering::Relaxed) + 1);
        Ok(MemoryTx { id, mode })
    }

    /// No-op: memory store applies writes immediately, not on commit.
    fn commit_tx(&self, _tx: MemoryTx) -> Result<()> { Ok(()) }

    /// WARNING: No-op. Mutations applied during this transaction are NOT reverted.
    fn rollback_tx(&self, _tx: MemoryTx) -> Result<()> { Ok(()) }

    // ========================================================================
    // Node CRUD
    // ========================================================================

    fn create_node(
        &self,
        tx: &mut MemoryTx,
        node_type: &str,
        props: PropertyMap,
    ) -> Result<NodeId> {
        ensure_writable(tx)?;
        let id = self.next_node_id();
        let node = Node {
            id,
            node_type: node_type.to_string(),
            properties: props,
        };

        self.inner.type_index.write().entry(node.node_type.clone()).or_default().push(id);
        self.inner.nodes.write().insert(id, node);
        self.inner.adjacency.write().insert(id, Vec::new());

        Ok(id)
    }

    fn get_node(&self, _tx: &MemoryTx, id: NodeId) -> Result<Option<Node>> {
        Ok(self.inner.nodes.read().get(&id).cloned())
    }

    fn delete_node(&self, tx: &mut MemoryTx, id: NodeId) -> Result<bool> {
        ensure_writable(tx)?;
        {
            let adj = self.inner.adjacency.read();
            if let Some(rels) = adj.get(&id) {
                if !rels.is_empty() {
                    return Err(Error::ConstraintViolation(
                        format!("Cannot delete node {id} with {} relationships. Delete relationships first.", rels.len())
                    ));
                }
            }
        }

        let removed = self.inner.nodes.write().remove(&id);
        self.inner.adjacency.write().remove(&id);

        if let Some(node) = &removed {
            if let Some(ids) = self.inner.type_index.write().get_mut(&node.node_type) {
                ids.retain(|nid| *nid != id);
            }
        }

        Ok(removed.is_some())
    }

    fn set_node_property(
        &self,
        tx: &mut MemoryTx,
        id: NodeId,
        key: &str,
        val: Value,
    ) -> Result<()> {
        ensure_writable(tx)?;
        let mut nodes = self.inner.nodes.write();
        let node = nodes.get_mut(&id).ok_or_else(|| Error::NotFound(format!("Node {id}")))?;
        node.properties.insert(key.to_string(), val);
        Ok(())
    }

    // ========================================================================
    // Relationship CRUD
    // ========================================================================

    fn create_relationship(
        &self,
        tx: &mut MemoryTx,
        src: NodeId,
        dst: NodeId,
        rel_type: &str,
        props: PropertyMap,
    ) -> Result<RelId> {
        ensure_writable(tx)?;
        {
            let nodes = self.inner.nodes.read();
            if !nodes.contains_key(&src) {
                return Err(Error::NotFound(format!("Source node {src}")));
            }
            if !nodes.contains_key(&dst) {
                return Err(Error::NotFound(format!("Target node {dst}")));
            }
        }

        let id = self.next_rel_id();
        let rel = Relationship {
            id,
            src,
            dst,
            rel_type: rel_type.to_string(),
            properties: props,
        };

        self.inner.relationships.write().insert(id, rel);

        let mut adj = self.inner.adjacency.write();
        adj.entry(src).or_default().push(id);
        if src != dst {
            adj.entry(dst).or_default().push(id);
        }

        Ok(id)
    }

    fn get_relationship(&self, _tx: &MemoryTx, id: RelId) -> Result<Option<Relationship>> {
        Ok(self.inner.relationships.read().get(&id).cloned())
    }

    fn delete_relationship(&self, tx: &mut MemoryTx, id: RelId) -> Result<bool> {
        ensure_writable(tx)?;
        let removed = self.inner.relationships.write().remove(&id);
        if let Some(rel) = &removed {
            let mut adj = self.inner.adjacency.write();
            if let Some(rels) = adj.get_mut(&rel.src) {
                rels.retain(|rid| *rid != id);
            }
            if rel.src != rel.dst {
                if let Some(rels) = adj.get_mut(&rel.dst) {
                    rels.retain(|rid| *rid != id);
                }
            }
        }
        Ok(removed.is_some())
    }

    fn apply_edge_changes(&self, tx: &mut MemoryTx, changes: &EdgeChanges) -> Result<Vec<RelId>> {
        ensure_writable(tx)?;

        // Lock order: nodes, relationships, adjacency.
        let nodes = self.inner.nodes.read();
        let mut rels = self.inner.relationships.write();
        let mut adj = self.inner.adjacency.write();

        // Validate everything before the first mutation.
        for id in &changes.remove {
            if !rels.contains_key(id) {
                return Err(Error::NotFound(format!("Relationship {id}")));
            }
        }
        for (src, dst) in &changes.create {
            if !nodes.contains_key(src) {
                return Err(Error::NotFound(format!("Source node {src}")));
            }
            if !nodes.contains_key(dst) {
                return Err(Error::NotFound(format!("Target node {dst}")));
            }
        }

        for id in &changes.remove {
            if let Some(rel) = rels.remove(id) {
                for end in [rel.src, rel.dst] {
                    if let Some(list) = adj.get_mut(&end) {
                        list.retain(|rid| rid != id);
                    }
                }
            }
        }

        let mut created = Vec::with_capacity(changes.create.len());
        for (src, dst) in &changes.create {
            let id = self.next_rel_id();
            rels.insert(id, Relationship::new(id, *src, *dst, changes.rel_type.as_str()));
            adj.entry(*src).or_default().push(id);
            if src != dst {
                adj.entry(*dst).or_default().push(id);
            }
            created.push(id);
        }

        Ok(created)
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    fn get_relationships(
        &self,
        _tx: &MemoryTx,
        node: NodeId,
        dir: Direction,
        rel_type: Option<&str>,
    ) -> Result<Vec<Relationship>> {
        let rels = self.inner.relationships.read();
        let adj = self.inner.adjacency.read();

        let Some(rel_ids) = adj.get(&node) else {
            return Ok(Vec::new());
        };

        let mut result = Vec::new();
        for rid in rel_ids {
            if let Some(rel) = rels.get(rid) {
                let matches_dir = match dir {
                    Direction::Outgoing => rel.src == node,
                    Direction::Incoming => rel.dst == node,
                    Direction::Both => true,
                };
                let matches_type = rel_type.map_or(true, |t| rel.rel_type == t);

                if matches_dir && matches_type {
                    result.push(rel.clone());
                }
            }
        }

        Ok(result)
    }

    // ========================================================================
    // Scan
    // ========================================================================

    fn node_count(&self, _tx: &MemoryTx) -> Result<u64> {
        Ok(self.inner.nodes.read().len() as u64)
    }

    fn relationship_count(&self, _tx: &MemoryTx) -> Result<u64> {
        Ok(self.inner.relationships.read().len() as u64)
    }

    fn nodes_by_type(&self, _tx: &MemoryTx, node_type: &str) -> Result<Vec<Node>> {
        let idx = self.inner.type_index.read();
        let nodes = self.inner.nodes.read();

        Ok(idx.get(node_type)
            .map(|ids| ids.iter().filter_map(|id| nodes.get(id).cloned()).collect())
            .unwrap_or_default())
    }
}

// ============================================================================
// Tests
// ============================================================================
