//! # propgraph-orm: Typed Relationship Properties over a Property Graph
//!
//! Exposes edges of a property graph as strongly-typed, collection-valued
//! properties of an object model, and compiles property-level search terms
//! into a boolean search-attribute tree.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `GraphStore` is the contract between the relation layer and storage
//! 2. **Registered once**: relation descriptors and properties are built at startup
//!    through a `SchemaBuilder` and frozen into an immutable `TypeRegistry`
//! 3. **Caller owns the transaction**: accessors never open, commit or roll back
//! 4. **Search compilation never fails**: a broken edge degrades one term to "no match"
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use propgraph_orm::{
//!     graph_entity, CollectionProperty, Entity, GraphStore, IdentityNotion, MemoryStore,
//!     Occurrence, PropertyMap, Readable, RelationDescriptor, SchemaBuilder, Searchable,
//!     SuperUserContext, TxMode, Writable,
//! };
//!
//! graph_entity!(Folder, "Folder");
//!
//! # fn main() -> propgraph_orm::Result<()> {
//! let mut schema = SchemaBuilder::new();
//! schema.register_entity::<Folder>()?;
//! schema.register_relation(RelationDescriptor::children("folders", "Folder", "Folder"))?;
//! let children: Arc<CollectionProperty<Folder, Folder>> =
//!     CollectionProperty::register(&mut schema, "children", "folders", Arc::new(IdentityNotion))?;
//! let _registry = schema.build();
//!
//! let store = MemoryStore::new();
//! let ctx = SuperUserContext;
//! let mut tx = store.begin_tx(TxMode::ReadWrite)?;
//! let mut folder = || -> propgraph_orm::Result<Folder> {
//!     let id = store.create_node(&mut tx, "Folder", PropertyMap::new())?;
//!     Ok(Folder::from(store.get_node(&tx, id)?.expect("just created")))
//! };
//! let (f1, f2, f3) = (folder()?, folder()?, folder()?);
//!
//! children.set(&store, &mut tx, &ctx, &f1, vec![f2.clone(), f3])?;
//! assert_eq!(children.get(&store, &tx, &ctx, &f1, None)?.len(), 2);
//!
//! let value = vec![f2];
//! let attr =
//!     children.search_attribute(&store, &tx, &ctx, Occurrence::Required, &value, true, None);
//! assert!(attr.result().is_some_and(|r| r.contains(f1.id())));
//! store.commit_tx(tx)?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod tx;
pub mod storage;
pub mod security;
pub mod predicate;
pub mod entity;
pub mod schema;
pub mod endpoint;
pub mod notion;
pub mod property;
pub mod search;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Node, Relationship, Value, PropertyMap,
    NodeId, RelId, Direction,
};

// ============================================================================
// Re-exports: Storage, transactions, security
// ============================================================================

pub use storage::{GraphStore, MemoryStore, EdgeChanges, NodeLookup, TxLookup};
pub use tx::{Transaction, TxMode, TxId};
pub use security::{SecurityContext, Permission, SuperUserContext, AccessList};
pub use predicate::NodePredicate;
pub use entity::Entity;

// ============================================================================
// Re-exports: Schema, relations, properties
// ============================================================================

pub use schema::{
    Autocreation, Cardinality, RelationDescriptor, SchemaBuilder, SchemaConfig, TypeRegistry,
};
pub use endpoint::{Endpoint, Related, Side};
pub use notion::{CollectionConverter, IdentityNotion, Notion, PropertyNotion};
pub use property::{
    Autocreatable, CollectionProperty, PropertyKey, Readable, Searchable, ValueProperty, Writable,
};

// ============================================================================
// Re-exports: Search
// ============================================================================

pub use search::{Combinator, NodeSet, Occurrence, SearchAttribute};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Relation or type binding inconsistency, raised while the schema is
    /// being registered.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Permission denied: {action} on node {node}")]
    PermissionDenied { action: Permission, node: NodeId },

    #[error("Type error: expected {expected}, got {got}")]
    TypeError { expected: String, got: String },

    /// A store fetch failed while walking a relation.
    #[error("Traversal error: {0}")]
    Traversal(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Transaction error: {0}")]
    TxError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
