//! Shared fixtures for the end-to-end tests.
#![allow(dead_code)]

use std::sync::Arc;

use propgraph_orm::storage::memory::MemoryTx;
use propgraph_orm::{
    graph_entity, Cardinality, CollectionProperty, Direction, EdgeChanges, Error, GraphStore,
    IdentityNotion, MemoryStore, Notion, Node, NodeId, PropertyMap, RelId, Relationship,
    RelationDescriptor, Result, SchemaBuilder, TxMode, TypeRegistry, Value,
};

graph_entity!(Folder, "Folder");
graph_entity!(File, "File");
graph_entity!(Page, "Page");
graph_entity!(Tag, "Tag");

// ============================================================================
// Schema
// ============================================================================

pub struct Schema {
    pub registry: TypeRegistry,
    pub children: Arc<CollectionProperty<Folder, Folder>>,
    pub files: Arc<CollectionProperty<Folder, File>>,
    pub tags: Arc<CollectionProperty<Page, Tag>>,
}

/// Folder -CONTAINS-> Folder and Folder -CONTAINS-> File (both one-to-many,
/// sharing an edge type), and Page -TAGGED-> Tag (many-to-many).
pub fn schema() -> Schema {
    let mut builder = SchemaBuilder::new();
    builder
        .register_entity::<Folder>()
        .unwrap()
        .register_entity::<File>()
        .unwrap()
        .register_entity::<Page>()
        .unwrap()
        .register_entity::<Tag>()
        .unwrap();
    let tags = RelationDescriptor::new("tags", "TAGGED", "Page", "Tag", Cardinality::ManyToMany);
    builder.register_relation(RelationDescriptor::children("folders", "Folder", "Folder")).unwrap();
    builder.register_relation(RelationDescriptor::children("files", "Folder", "File")).unwrap();
    builder.register_relation(tags).unwrap();

    let children =
        CollectionProperty::register(&mut builder, "children", "folders", identity()).unwrap();
    let files = CollectionProperty::register(&mut builder, "files", "files", identity()).unwrap();
    let tags = CollectionProperty::register(&mut builder, "tags", "tags", identity()).unwrap();
    Schema { registry: builder.build(), children, files, tags }
}

pub fn identity() -> Arc<dyn Notion> {
    Arc::new(IdentityNotion)
}

// ============================================================================
// Node helpers
// ============================================================================

pub fn create<S: GraphStore>(store: &S, node_type: &str, name: &str) -> Node {
    let mut tx = store.begin_tx(TxMode::ReadWrite).unwrap();
    let mut props = PropertyMap::new();
    props.insert("name".into(), Value::from(name));
    let id = store.create_node(&mut tx, node_type, props).unwrap();
    let node = store.get_node(&tx, id).unwrap().unwrap();
    store.commit_tx(tx).unwrap();
    node
}

pub fn folder<S: GraphStore>(store: &S, name: &str) -> Folder {
    Folder(create(store, "Folder", name))
}

pub fn file<S: GraphStore>(store: &S, name: &str) -> File {
    File(create(store, "File", name))
}

pub fn page<S: GraphStore>(store: &S, name: &str) -> Page {
    Page(create(store, "Page", name))
}

pub fn tag<S: GraphStore>(store: &S, name: &str) -> Tag {
    Tag(create(store, "Tag", name))
}

// ============================================================================
// FaultyStore
// ============================================================================

/// `MemoryStore` wrapper that fails traversals from one node and pretends
/// another node does not exist.
#[derive(Clone, Default)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    pub broken: Option<NodeId>,
    pub hidden: Option<NodeId>,
}

impl FaultyStore {
    pub fn wrap(inner: &MemoryStore) -> Self {
        Self { inner: inner.clone(), ..Self::default() }
    }

    pub fn breaking(mut self, id: NodeId) -> Self {
        self.broken = Some(id);
        self
    }

    pub fn hiding(mut self, id: NodeId) -> Self {
        self.hidden = Some(id);
        self
    }
}

impl GraphStore for FaultyStore {
    type Tx = MemoryTx;

    fn begin_tx(&self, mode: TxMode) -> Result<MemoryTx> {
        self.inner.begin_tx(mode)
    }

    fn commit_tx(&self, tx: MemoryTx) -> Result<()> {
        self.inner.commit_tx(tx)
    }

    fn rollback_tx(&self, tx: MemoryTx) -> Result<()> {
        self.inner.rollback_tx(tx)
    }

    fn create_node(
        &self,
        tx: &mut MemoryTx,
        node_type: &str,
        props: PropertyMap,
    ) -> Result<NodeId> {
        self.inner.create_node(tx, node_type, props)
    }

    fn get_node(&self, tx: &MemoryTx, id: NodeId) -> Result<Option<Node>> {
        if self.hidden == Some(id) {
            return Ok(None);
        }
        self.inner.get_node(tx, id)
    }

    fn delete_node(&self, tx: &mut MemoryTx, id: NodeId) -> Result<bool> {
        self.inner.delete_node(tx, id)
    }

    fn set_node_property(
        &self,
        tx: &mut MemoryTx,
        id: NodeId,
        key: &str,
        val: Value,
    ) -> Result<()> {
        self.inner.set_node_property(tx, id, key, val)
    }

    fn create_relationship(
        &self,
        tx: &mut MemoryTx,
        src: NodeId,
        dst: NodeId,
        rel_type: &str,
        props: PropertyMap,
    ) -> Result<RelId> {
        self.inner.create_relationship(tx, src, dst, rel_type, props)
    }

    fn get_relationship(&self, tx: &MemoryTx, id: RelId) -> Result<Option<Relationship>> {
        self.inner.get_relationship(tx, id)
    }

    fn delete_relationship(&self, tx: &mut MemoryTx, id: RelId) -> Result<bool> {
        self.inner.delete_relationship(tx, id)
    }

    fn apply_edge_changes(&self, tx: &mut MemoryTx, changes: &EdgeChanges) -> Result<Vec<RelId>> {
        self.inner.apply_edge_changes(tx, changes)
    }

    fn get_relationships(
        &self,
        tx: &MemoryTx,
        node: NodeId,
        dir: Direction,
        rel_type: Option<&str>,
    ) -> Result<Vec<Relationship>> {
        if self.broken == Some(node) {
            return Err(Error::StorageError(format!("adjacency of {node} is unreadable")));
        }
        self.inner.get_relationships(tx, node, dir, rel_type)
    }

    fn node_count(&self, tx: &MemoryTx) -> Result<u64> {
        self.inner.node_count(tx)
    }

    fn relationship_count(&self, tx: &MemoryTx) -> Result<u64> {
        self.inner.relationship_count(tx)
    }

    fn nodes_by_type(&self, tx: &MemoryTx, node_type: &str) -> Result<Vec<Node>> {
        self.inner.nodes_by_type(tx, node_type)
    }
}
