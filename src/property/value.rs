//! Scalar property stored in the node's own property map.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::entity::Entity;
use crate::model::Value;
use crate::predicate::NodePredicate;
use crate::schema::SchemaBuilder;
use crate::search::{Occurrence, SearchAttribute};
use crate::security::{Permission, SecurityContext};
use crate::storage::GraphStore;
use crate::Result;
use super::{PropertyKey, Readable, Searchable, Writable};

pub struct ValueProperty<E: Entity> {
    name: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> ValueProperty<E> {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), _entity: PhantomData }
    }

    pub fn register(schema: &mut SchemaBuilder, name: impl Into<String>) -> Result<Arc<Self>> {
        let property = Arc::new(Self::new(name));
        schema.register_property(Arc::clone(&property) as Arc<dyn PropertyKey>)?;
        Ok(property)
    }
}

impl<E: Entity> fmt::Debug for ValueProperty<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueProperty({}.{})", E::TYPE_NAME, self.name)
    }
}

impl<E: Entity> PropertyKey for ValueProperty<E> {
    fn name(&self) -> &str {
        &self.name
    }

    fn declaring_type(&self) -> &str {
        E::TYPE_NAME
    }

    fn type_name(&self) -> &'static str {
        "value"
    }

    fn is_searchable(&self) -> bool {
        true
    }
}

impl<E: Entity> Readable<E> for ValueProperty<E> {
    type Value = Value;

    /// Reads from the store so that writes earlier in `tx` are visible.
    /// `predicate` does not apply to scalar values.
    fn get<S: GraphStore>(
        &self,
        store: &S,
        tx: &S::Tx,
        ctx: &dyn SecurityContext,
        entity: &E,
        _predicate: Option<&dyn NodePredicate>,
    ) -> Result<Value> {
        ctx.check(entity.node(), Permission::Read)?;
        let current = store.get_node(tx, entity.id())?;
        Ok(current
            .and_then(|node| node.properties.get(&self.name).cloned())
            .unwrap_or(Value::Null))
    }
}

impl<E: Entity> Writable<E> for ValueProperty<E> {
    type Previous = Value;

    fn set<S: GraphStore>(
        &self,
        store: &S,
        tx: &mut S::Tx,
        ctx: &dyn SecurityContext,
        entity: &E,
        value: Value,
    ) -> Result<Value> {
        ctx.check(entity.node(), Permission::Write)?;
        let previous = self.get(store, tx, ctx, entity, None)?;
        store.set_node_property(tx, entity.id(), &self.name, value)?;
        Ok(previous)
    }
}

impl<E: Entity> Searchable for ValueProperty<E> {
    type SearchValue = Value;

    fn convert_search_value<S: GraphStore>(
        &self,
        _store: &S,
        _tx: &S::Tx,
        _ctx: &dyn SecurityContext,
        raw: &str,
    ) -> Result<Option<Value>> {
        let raw = raw.trim();
        Ok(Some(match raw.parse::<i64>() {
            Ok(n) => Value::Int(n),
            Err(_) => Value::from(raw),
        }))
    }

    fn search_attribute<S: GraphStore>(
        &self,
        _store: &S,
        _tx: &S::Tx,
        _ctx: &dyn SecurityContext,
        occurrence: Occurrence,
        value: &Value,
        exact: bool,
        _predicate: Option<&dyn NodePredicate>,
    ) -> SearchAttribute {
        if value.is_blank() {
            return SearchAttribute::Empty { key: self.name.clone(), occurrence, relation: None };
        }
        SearchAttribute::Property {
            key: self.name.clone(),
            value: value.clone(),
            occurrence,
            exact,
        }
    }
}
