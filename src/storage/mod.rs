//! # Graph Store Trait
//!
//! The contract between the relation accessors and whatever graph database
//! actually holds the nodes and edges. Everything the accessors, notions
//! and the search compiler need from a store is defined here.
//!
//! All calls are synchronous and run inside a transaction the caller
//! opened. Errors returned by a store cross this boundary unmodified.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | In-memory for testing/embedding |

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::model::*;
use crate::tx::{Transaction, TxMode};
use crate::Result;

pub use memory::MemoryStore;

// ============================================================================
// Edge change set
// ============================================================================

/// A batch of edge removals and creations for one relation type.
///
/// Stores apply the whole batch or nothing: this is what makes a
/// collection `set` observable only as a complete replacement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeChanges {
    pub rel_type: String,
    pub remove: Vec<RelId>,
    /// (source, target) pairs, created in order.
    pub create: Vec<(NodeId, NodeId)>,
}

impl EdgeChanges {
    pub fn new(rel_type: impl Into<String>) -> Self {
        Self { rel_type: rel_type.into(), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.create.is_empty()
    }
}

// ============================================================================
// GraphStore Trait
// ============================================================================

/// The store contract.
///
/// Stores should return `Error::StorageError` for operations they cannot
/// handle rather than panicking.
pub trait GraphStore: Send + Sync + 'static {
    /// The transaction type for this store.
    type Tx: Transaction;

    // ========================================================================
    // Transactions (driven by the caller, never by the accessors)
    // ========================================================================

    /// Begin a new transaction.
    fn begin_tx(&self, mode: TxMode) -> Result<Self::Tx>;

    /// Commit a transaction.
    fn commit_tx(&self, tx: Self::Tx) -> Result<()>;

    /// Roll back a transaction.
    fn rollback_tx(&self, tx: Self::Tx) -> Result<()>;

    // ========================================================================
    // Node CRUD
    // ========================================================================

    /// Create a node with the given type tag and properties.
    fn create_node(
        &self,
        tx: &mut Self::Tx,
        node_type: &str,
        props: PropertyMap,
    ) -> Result<NodeId>;

    /// Get a node by ID. Returns None if not found (or deleted).
    fn get_node(&self, tx: &Self::Tx, id: NodeId) -> Result<Option<Node>>;

    /// Delete a node. Returns true if it existed.
    /// Fails if the node still has relationships.
    fn delete_node(&self, tx: &mut Self::Tx, id: NodeId) -> Result<bool>;

    /// Set a property on a node (upsert).
    fn set_node_property(
        &self,
        tx: &mut Self::Tx,
        id: NodeId,
        key: &str,
        val: Value,
    ) -> Result<()>;

    /// Delete a node and all its relationships in one operation.
    ///
    /// Default: get all relationships, delete each, then delete the node.
    fn detach_delete_node(&self, tx: &mut Self::Tx, id: NodeId) -> Result<bool> {
        let rels = self.get_relationships(tx, id, Direction::Both, None)?;
        for rel in &rels {
            self.delete_relationship(tx, rel.id)?;
        }
        self.delete_node(tx, id)
    }

    // ========================================================================
    // Relationship CRUD
    // ========================================================================

    /// Create a relationship between two nodes.
    fn create_relationship(
        &self,
        tx: &mut Self::Tx,
        src: NodeId,
        dst: NodeId,
        rel_type: &str,
        props: PropertyMap,
    ) -> Result<RelId>;

    /// Get a relationship by ID.
    fn get_relationship(&self, tx: &Self::Tx, id: RelId) -> Result<Option<Relationship>>;

    /// Delete a relationship. Returns true if it existed.
    fn delete_relationship(&self, tx: &mut Self::Tx, id: RelId) -> Result<bool>;

    /// Apply a batch of edge changes: removals first, then creations.
    ///
    /// Returns the IDs of the created relationships in creation order.
    ///
    /// Default falls back to sequential calls and is only as atomic as the
    /// caller's transaction. Stores with their own locking should override
    /// it and validate the whole batch before touching anything.
    fn apply_edge_changes(&self, tx: &mut Self::Tx, changes: &EdgeChanges) -> Result<Vec<RelId>> {
        for id in &changes.remove {
            self.delete_relationship(tx, *id)?;
        }
        let mut created = Vec::with_capacity(changes.create.len());
        for (src, dst) in &changes.create {
            let props = PropertyMap::new();
            created.push(self.create_relationship(tx, *src, *dst, &changes.rel_type, props)?);
        }
        Ok(created)
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Get all relationships of a node, optionally filtered by direction and type.
    ///
    /// Relationships come back in creation order.
    fn get_relationships(
        &self,
        tx: &Self::Tx,
        node: NodeId,
        dir: Direction,
        rel_type: Option<&str>,
    ) -> Result<Vec<Relationship>>;

    // ========================================================================
    // Scan
    // ========================================================================

    /// Total number of nodes.
    fn node_count(&self, tx: &Self::Tx) -> Result<u64>;

    /// Total number of relationships.
    fn relationship_count(&self, tx: &Self::Tx) -> Result<u64>;

    /// Find all nodes with a given type tag, in creation order.
    fn nodes_by_type(&self, tx: &Self::Tx, node_type: &str) -> Result<Vec<Node>>;

    /// Find nodes by type + property value.
    ///
    /// Default: scans `nodes_by_type` and compares.
    fn nodes_by_property(
        &self,
        tx: &Self::Tx,
        node_type: &str,
        key: &str,
        value: &Value,
    ) -> Result<Vec<Node>> {
        Ok(self.nodes_by_type(tx, node_type)?
            .into_iter()
            .filter(|n| n.get(key) == Some(value))
            .collect())
    }
}

// ============================================================================
// Node lookup (object-safe view of a store + transaction)
// ============================================================================

/// Read-only node lookup, object safe so that notions can be held as
/// trait objects without knowing the concrete store.
pub trait NodeLookup {
    fn node_by_id(&self, id: NodeId) -> Result<Option<Node>>;

    fn nodes_by_property(&self, node_type: &str, key: &str, value: &Value) -> Result<Vec<Node>>;
}

/// Binds a store to the caller's transaction for `NodeLookup`.
pub struct TxLookup<'a, S: GraphStore> {
    store: &'a S,
    tx: &'a S::Tx,
}

impl<'a, S: GraphStore> TxLookup<'a, S> {
    pub fn new(store: &'a S, tx: &'a S::Tx) -> Self {
        Self { store, tx }
    }
}

impl<S: GraphStore> NodeLookup for TxLookup<'_, S> {
    fn node_by_id(&self, id: NodeId) -> Result<Option<Node>> {
        self.store.get_node(self.tx, id)
    }

    fn nodes_by_property(&self, node_type: &str, key: &str, value: &Value) -> Result<Vec<Node>> {
        self.store.nodes_by_property(self.tx, node_type, key, value)
    }
}
