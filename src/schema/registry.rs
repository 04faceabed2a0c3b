//! Type registry.
//!
//! `SchemaBuilder` collects node types, relation descriptors and properties
//! at startup and reports every inconsistency as `Error::Configuration` the
//! moment it is registered. `build()` freezes it into a `TypeRegistry`,
//! which is immutable and meant to be shared behind an `Arc`.

use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use tracing::debug;

use crate::entity::Entity;
use crate::property::PropertyKey;
use crate::{Error, Result};
use super::RelationDescriptor;

/// Property handles by declaring type, then by property name.
type PropertyTable = HashMap<String, HashMap<String, Arc<dyn PropertyKey>>>;

/// Mutable registration phase of the schema.
#[derive(Default)]
pub struct SchemaBuilder {
    types: HashSet<String>,
    relations: HashMap<String, Arc<RelationDescriptor>>,
    properties: PropertyTable,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node type tag.
    pub fn register_type(&mut self, node_type: impl Into<String>) -> Result<&mut Self> {
        let node_type = node_type.into();
        if node_type.trim().is_empty() {
            return Err(Error::Configuration("empty node type name".into()));
        }
        if !self.types.insert(node_type.clone()) {
            return Err(Error::Configuration(format!("node type '{node_type}' registered twice")));
        }
        debug!(%node_type, "registered node type");
        Ok(self)
    }

    pub fn register_entity<E: Entity>(&mut self) -> Result<&mut Self> {
        self.register_type(E::TYPE_NAME)
    }

    pub fn has_type(&self, node_type: &str) -> bool {
        self.types.contains(node_type)
    }

    /// Register a relation descriptor under its id.
    ///
    /// Both end types must already be registered.
    pub fn register_relation(
        &mut self,
        relation: RelationDescriptor,
    ) -> Result<Arc<RelationDescriptor>> {
        relation.validate()?;
        let ends = [("source", &relation.source_type), ("target", &relation.target_type)];
        for (end, node_type) in ends {
            if !self.types.contains(node_type) {
                return Err(Error::Configuration(format!(
                    "relation '{}' names unknown {end} type '{node_type}'",
                    relation.id
                )));
            }
        }
        if self.relations.contains_key(&relation.id) {
            return Err(Error::Configuration(format!(
                "relation '{}' registered twice",
                relation.id
            )));
        }

        debug!(
            id = %relation.id,
            rel_type = %relation.rel_type,
            source = %relation.source_type,
            target = %relation.target_type,
            cardinality = ?relation.cardinality,
            "registered relation"
        );
        let relation = Arc::new(relation);
        self.relations.insert(relation.id.clone(), Arc::clone(&relation));
        Ok(relation)
    }

    pub fn relation(&self, id: &str) -> Option<Arc<RelationDescriptor>> {
        self.relations.get(id).cloned()
    }

    /// Look up a relation a property is about to bind to.
    pub fn require_relation(&self, id: &str) -> Result<Arc<RelationDescriptor>> {
        self.relation(id)
            .ok_or_else(|| Error::Configuration(format!("unknown relation '{id}'")))
    }

    /// Register a property under (declaring type, name).
    pub fn register_property(&mut self, property: Arc<dyn PropertyKey>) -> Result<()> {
        let declaring = property.declaring_type().to_string();
        let name = property.name().to_string();

        if !self.types.contains(&declaring) {
            return Err(Error::Configuration(format!(
                "property '{name}' declared on unknown type '{declaring}'"
            )));
        }
        let by_name = self.properties.entry(declaring.clone()).or_default();
        if by_name.contains_key(&name) {
            return Err(Error::Configuration(format!(
                "property '{declaring}.{name}' registered twice"
            )));
        }

        debug!(%declaring, %name, kind = property.type_name(), "registered property");
        by_name.insert(name, property);
        Ok(())
    }

    /// Freeze the schema.
    pub fn build(self) -> TypeRegistry {
        TypeRegistry {
            types: self.types,
            relations: self.relations,
            properties: self.properties,
        }
    }
}

/// Immutable, shareable schema: node types, relations and properties.
pub struct TypeRegistry {
    types: HashSet<String>,
    relations: HashMap<String, Arc<RelationDescriptor>>,
    properties: PropertyTable,
}

impl TypeRegistry {
    pub fn has_type(&self, node_type: &str) -> bool {
        self.types.contains(node_type)
    }

    /// Registered node types, sorted.
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.types.iter().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn relation(&self, id: &str) -> Option<&Arc<RelationDescriptor>> {
        self.relations.get(id)
    }

    /// Relations whose source or target is `node_type`, sorted by id.
    pub fn relations_of(&self, node_type: &str) -> Vec<&Arc<RelationDescriptor>> {
        let mut found: Vec<&Arc<RelationDescriptor>> = self
            .relations
            .values()
            .filter(|r| r.source_type == node_type || r.target_type == node_type)
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found
    }

    pub fn property(&self, declaring_type: &str, name: &str) -> Option<&Arc<dyn PropertyKey>> {
        self.properties.get(declaring_type)?.get(name)
    }

    /// Properties declared on `node_type`, sorted by name.
    pub fn properties_of(&self, node_type: &str) -> Vec<&Arc<dyn PropertyKey>> {
        let mut found: Vec<&Arc<dyn PropertyKey>> = self
            .properties
            .get(node_type)
            .map(|by_name| by_name.values().collect())
            .unwrap_or_default();
        found.sort_by(|a, b| a.name().cmp(b.name()));
        found
    }
}

impl std::fmt::Debug for SchemaBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaBuilder")
            .field("types", &self.types)
            .field("relations", &self.relations.len())
            .field("properties", &self.properties.values().map(|m| m.len()).sum::<usize>())
            .finish()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.types())
            .field("relations", &self.relations.len())
            .field("properties", &self.properties.values().map(|m| m.len()).sum::<usize>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Cardinality;

    fn folder_schema() -> SchemaBuilder {
        let mut schema = SchemaBuilder::new();
        schema.register_type("Folder").unwrap().register_type("File").unwrap();
        schema
    }

    #[test]
    fn test_register_relation_requires_known_types() {
        let mut schema = folder_schema();
        let images =
            RelationDescriptor::new("images", "HAS", "Folder", "Image", Cardinality::OneToMany);
        let err = schema.register_relation(images).unwrap_err();
        assert!(matches!(err, Error::Configuration(msg) if msg.contains("Image")));
    }

    #[test]
    fn test_duplicate_registrations_are_rejected() {
        let mut schema = folder_schema();
        assert!(schema.register_type("Folder").is_err());
        let folders = RelationDescriptor::children("folders", "Folder", "Folder");
        schema.register_relation(folders).unwrap();
        let again = RelationDescriptor::children("folders", "Folder", "File");
        assert!(schema.register_relation(again).is_err());
    }

    #[test]
    fn test_unknown_relation_is_a_configuration_error() {
        let schema = folder_schema();
        assert!(matches!(schema.require_relation("nope"), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_frozen_registry_lookups() {
        let mut schema = folder_schema();
        let folders = RelationDescriptor::children("folders", "Folder", "Folder");
        schema.register_relation(folders).unwrap();
        schema.register_relation(RelationDescriptor::children("files", "Folder", "File")).unwrap();
        let registry = schema.build();

        assert_eq!(registry.types(), vec!["File", "Folder"]);
        assert!(registry.relation("folders").is_some());
        let ids: Vec<&str> = registry.relations_of("File").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["files"]);
        assert!(registry.property("Folder", "children").is_none());
    }
}
