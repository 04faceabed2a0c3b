//! Collection-valued relationship property.
//!
//! `CollectionProperty<S, T>` exposes the targets of a relation as an
//! ordered `Vec<T>` on source entities of type `S`. It composes the
//! relation descriptor, the relation's target-side endpoint and a notion.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::endpoint::Endpoint;
use crate::entity::Entity;
use crate::model::{Node, Value};
use crate::notion::{split_tokens, Notion};
use crate::predicate::NodePredicate;
use crate::schema::{RelationDescriptor, SchemaBuilder};
use crate::search::{compile_relation_search, Occurrence, SearchAttribute};
use crate::security::{Permission, SecurityContext};
use crate::storage::{GraphStore, TxLookup};
use crate::{Error, Result};
use super::{Autocreatable, PropertyKey, Readable, Searchable, Writable};

pub struct CollectionProperty<S: Entity, T: Entity> {
    name: String,
    relation: Arc<RelationDescriptor>,
    notion: Arc<dyn Notion>,
    _types: PhantomData<fn() -> (S, T)>,
}

impl<S: Entity, T: Entity> CollectionProperty<S, T> {
    /// Bind a property to a relation.
    ///
    /// The relation must run from `S` to `T` and be many-valued on the
    /// target side.
    pub fn new(
        name: impl Into<String>,
        relation: Arc<RelationDescriptor>,
        notion: Arc<dyn Notion>,
    ) -> Result<Self> {
        let name = name.into();
        if relation.source_type != S::TYPE_NAME {
            return Err(Error::Configuration(format!(
                "property '{}.{name}' is bound to relation '{}' whose source type is '{}'",
                S::TYPE_NAME, relation.id, relation.source_type
            )));
        }
        if relation.target_type != T::TYPE_NAME {
            return Err(Error::Configuration(format!(
                "property '{}.{name}' expects targets of type '{}' but relation '{}' targets '{}'",
                S::TYPE_NAME, T::TYPE_NAME, relation.id, relation.target_type
            )));
        }
        if !relation.cardinality.target_is_many() {
            return Err(Error::Configuration(format!(
                "property '{}.{name}' is a collection but relation '{}' is {:?}",
                S::TYPE_NAME, relation.id, relation.cardinality
            )));
        }

        Ok(Self { name, relation, notion, _types: PhantomData })
    }

    /// Build the property against a registered relation and register it
    /// under (`S`, `name`).
    pub fn register(
        schema: &mut SchemaBuilder,
        name: impl Into<String>,
        relation_id: &str,
        notion: Arc<dyn Notion>,
    ) -> Result<Arc<Self>> {
        let relation = schema.require_relation(relation_id)?;
        let property = Arc::new(Self::new(name, relation, notion)?);
        schema.register_property(Arc::clone(&property) as Arc<dyn PropertyKey>)?;
        Ok(property)
    }

    pub fn endpoint(&self) -> Endpoint<'_> {
        self.relation.target()
    }

    pub fn target_type(&self) -> &'static str {
        T::TYPE_NAME
    }

    pub fn direction_key(&self) -> &'static str {
        "out"
    }

    /// Targets mapped through the notion.
    pub fn get_representation<G: GraphStore>(
        &self,
        store: &G,
        tx: &G::Tx,
        ctx: &dyn SecurityContext,
        entity: &S,
        predicate: Option<&dyn NodePredicate>,
    ) -> Result<Vec<Value>> {
        Ok(self
            .get(store, tx, ctx, entity, predicate)?
            .iter()
            .map(|t| self.notion.represent(t.node()))
            .collect())
    }

    /// Append one element: read the collection, push, write it back.
    ///
    /// Targets hidden from `ctx` are missing from what is read back, so
    /// writing the list would unlink them. `set` refuses that with
    /// `PermissionDenied` unless `ctx` may write those targets.
    ///
    /// This is a read-modify-write. Two callers appending to the same
    /// collection concurrently can lose an element unless the caller's
    /// transaction is serializable.
    pub fn add_single_element<G: GraphStore>(
        &self,
        store: &G,
        tx: &mut G::Tx,
        ctx: &dyn SecurityContext,
        entity: &S,
        element: T,
    ) -> Result<()> {
        let mut list = self.get(store, tx, ctx, entity, None)?;
        list.push(element);
        self.set(store, tx, ctx, entity, list)?;
        Ok(())
    }

    fn wrap_all(nodes: Vec<Node>) -> Vec<T> {
        nodes.into_iter().filter(|n| n.is_a(T::TYPE_NAME)).map(T::wrap).collect()
    }
}

impl<S: Entity, T: Entity> fmt::Debug for CollectionProperty<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionProperty")
            .field("declaring_type", &S::TYPE_NAME)
            .field("name", &self.name)
            .field("relation", &self.relation.id)
            .field("notion", &self.notion.name())
            .finish()
    }
}

impl<S: Entity, T: Entity> PropertyKey for CollectionProperty<S, T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn declaring_type(&self) -> &str {
        S::TYPE_NAME
    }

    fn type_name(&self) -> &'static str {
        "collection"
    }

    fn related_type(&self) -> Option<&str> {
        Some(T::TYPE_NAME)
    }

    fn is_collection(&self) -> bool {
        true
    }

    fn is_searchable(&self) -> bool {
        true
    }

    fn relation(&self) -> Option<&RelationDescriptor> {
        Some(&*self.relation)
    }

    fn notion(&self) -> Option<&dyn Notion> {
        Some(self.notion.as_ref())
    }
}

impl<S: Entity, T: Entity> Readable<S> for CollectionProperty<S, T> {
    type Value = Vec<T>;

    fn get<G: GraphStore>(
        &self,
        store: &G,
        tx: &G::Tx,
        ctx: &dyn SecurityContext,
        entity: &S,
        predicate: Option<&dyn NodePredicate>,
    ) -> Result<Vec<T>> {
        ctx.check(entity.node(), Permission::Read)?;
        let related = self.endpoint().get(store, tx, ctx, entity.node(), predicate)?;
        Ok(related.map(|r| Self::wrap_all(r.into_nodes())).unwrap_or_default())
    }
}

impl<S: Entity, T: Entity> Writable<S> for CollectionProperty<S, T> {
    type Previous = Vec<T>;

    fn set<G: GraphStore>(
        &self,
        store: &G,
        tx: &mut G::Tx,
        ctx: &dyn SecurityContext,
        entity: &S,
        value: Vec<T>,
    ) -> Result<Vec<T>> {
        let targets: Vec<Node> = value.iter().map(|t| t.node().clone()).collect();
        let previous = self.endpoint().set(store, tx, ctx, entity.node(), &targets)?;
        Ok(Self::wrap_all(previous))
    }
}

impl<S: Entity, T: Entity> Searchable for CollectionProperty<S, T> {
    type SearchValue = Vec<T>;

    fn convert_search_value<G: GraphStore>(
        &self,
        store: &G,
        tx: &G::Tx,
        ctx: &dyn SecurityContext,
        raw: &str,
    ) -> Result<Option<Vec<T>>> {
        let Some(converter) = self.notion.collection_converter(ctx, T::TYPE_NAME) else {
            return Ok(None);
        };
        let lookup = TxLookup::new(store, tx);
        let nodes = converter.convert(&lookup, split_tokens(raw))?;
        Ok(Some(nodes.into_iter().map(T::wrap).collect()))
    }

    fn search_attribute<G: GraphStore>(
        &self,
        store: &G,
        tx: &G::Tx,
        ctx: &dyn SecurityContext,
        occurrence: Occurrence,
        value: &Vec<T>,
        exact: bool,
        predicate: Option<&dyn NodePredicate>,
    ) -> SearchAttribute {
        let targets: Vec<Node> = value.iter().map(|t| t.node().clone()).collect();
        compile_relation_search(
            &self.name,
            &self.relation,
            store,
            tx,
            ctx,
            occurrence,
            &targets,
            exact,
            predicate,
        )
    }
}

impl<S: Entity, T: Entity> Autocreatable for CollectionProperty<S, T> {}
