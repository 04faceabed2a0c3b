//! Schema configuration.
//!
//! Node types and relation descriptors can be declared in JSON and loaded
//! at startup:
//!
//! ```json
//! {
//!   "types": ["Folder", "File"],
//!   "relations": [
//!     { "id": "folders", "type": "CONTAINS", "source": "Folder", "target": "Folder",
//!       "cardinality": "oneToMany", "autocreate": "none" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::Result;
use super::{Autocreation, Cardinality, RelationDescriptor, SchemaBuilder};

/// Declarative schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub relations: Vec<RelationConfig>,
}

/// One relation entry of a `SchemaConfig`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub rel_type: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub cardinality: Cardinality,
    #[serde(default)]
    pub autocreate: Autocreation,
}

impl From<RelationConfig> for RelationDescriptor {
    fn from(cfg: RelationConfig) -> Self {
        RelationDescriptor::new(cfg.id, cfg.rel_type, cfg.source, cfg.target, cfg.cardinality)
            .with_autocreation(cfg.autocreate)
    }
}

impl SchemaConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Register every type and relation, failing on the first inconsistency.
    ///
    /// Properties are bound afterwards, against the returned builder.
    pub fn into_builder(self) -> Result<SchemaBuilder> {
        let mut builder = SchemaBuilder::new();
        for node_type in self.types {
            builder.register_type(node_type)?;
        }
        for relation in self.relations {
            builder.register_relation(relation.into())?;
        }
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const FOLDERS: &str = r#"{
        "types": ["Folder", "File"],
        "relations": [
            { "id": "folders", "type": "CONTAINS", "source": "Folder", "target": "Folder" },
            { "id": "files", "type": "CONTAINS", "source": "Folder", "target": "File",
              "cardinality": "oneToMany", "autocreate": "always" }
        ]
    }"#;

    #[test]
    fn test_load_and_register() {
        let cfg = SchemaConfig::from_json(FOLDERS).unwrap();
        assert_eq!(cfg.relations[0].cardinality, Cardinality::OneToMany);
        assert_eq!(cfg.relations[0].autocreate, Autocreation::None);
        assert_eq!(cfg.relations[1].autocreate, Autocreation::Always);

        let registry = cfg.into_builder().unwrap().build();
        assert_eq!(registry.relation("files").unwrap().autocreation, Autocreation::Always);
    }

    #[test]
    fn test_unknown_type_fails_at_load() {
        let cfg = SchemaConfig::from_json(
            r#"{ "types": ["Folder"], "relations": [
                { "id": "files", "type": "CONTAINS", "source": "Folder", "target": "File" } ] }"#,
        )
        .unwrap();
        assert!(matches!(cfg.into_builder(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_malformed_json_is_a_serialization_error() {
        let err = SchemaConfig::from_json("{ \"types\": 3 }");
        assert!(matches!(err, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_to_json_round_trips() {
        let cfg = SchemaConfig::from_json(FOLDERS).unwrap();
        let again = SchemaConfig::from_json(&cfg.to_json().unwrap()).unwrap();
        assert_eq!(cfg, again);
    }
}
