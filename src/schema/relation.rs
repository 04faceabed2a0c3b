//! Relation descriptors: the static metadata of one relation type.

use serde::{Deserialize, Serialize};

use crate::endpoint::{Endpoint, Side};
use crate::{Error, Result};

/// Edge type used by `RelationDescriptor::children`.
pub const CONTAINS: &str = "CONTAINS";

/// How many nodes sit on each end of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cardinality {
    OneToOne,
    #[default]
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl Cardinality {
    /// Whether a source node can reach many targets.
    pub fn target_is_many(self) -> bool {
        matches!(self, Cardinality::OneToMany | Cardinality::ManyToMany)
    }

    /// Whether a target node can be reached from many sources.
    pub fn source_is_many(self) -> bool {
        matches!(self, Cardinality::ManyToOne | Cardinality::ManyToMany)
    }
}

/// Autocreation policy: whether missing related nodes are created
/// implicitly when a relationship property is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Autocreation {
    #[default]
    None = 0,
    SourceToTarget = 1,
    TargetToSource = 2,
    Always = 3,
}

/// Descriptions indexed by autocreation ordinal.
pub const CASCADING_DESCRIPTIONS: [&str; 4] =
    ["none", "sourceToTarget", "targetToSource", "always"];

impl Autocreation {
    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        match ordinal {
            0 => Some(Autocreation::None),
            1 => Some(Autocreation::SourceToTarget),
            2 => Some(Autocreation::TargetToSource),
            3 => Some(Autocreation::Always),
            _ => None,
        }
    }

    pub fn description(self) -> &'static str {
        describe_ordinal(self.ordinal())
    }
}

/// Description for a raw ordinal. Unknown ordinals fall back to index 0.
pub fn describe_ordinal(ordinal: usize) -> &'static str {
    CASCADING_DESCRIPTIONS.get(ordinal).copied().unwrap_or(CASCADING_DESCRIPTIONS[0])
}

/// Description of a relation's autocreation flag, or of the default flag
/// when there is no relation.
pub fn autocreate_description(relation: Option<&RelationDescriptor>) -> &'static str {
    match relation {
        Some(rel) => rel.autocreation.description(),
        None => describe_ordinal(0),
    }
}

/// Static metadata of one relation type.
///
/// Built once at startup and registered in a `SchemaBuilder` under `id`;
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDescriptor {
    /// Registry key (e.g. `"folders"`).
    pub id: String,
    /// Edge type in the store (e.g. `"CONTAINS"`).
    pub rel_type: String,
    pub source_type: String,
    pub target_type: String,
    pub cardinality: Cardinality,
    pub autocreation: Autocreation,
}

impl RelationDescriptor {
    pub fn new(
        id: impl Into<String>,
        rel_type: impl Into<String>,
        source_type: impl Into<String>,
        target_type: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            id: id.into(),
            rel_type: rel_type.into(),
            source_type: source_type.into(),
            target_type: target_type.into(),
            cardinality,
            autocreation: Autocreation::None,
        }
    }

    /// One-to-many containment (`parent -[:CONTAINS]-> child`).
    pub fn children(
        id: impl Into<String>,
        parent_type: impl Into<String>,
        child_type: impl Into<String>,
    ) -> Self {
        Self::new(id, CONTAINS, parent_type, child_type, Cardinality::OneToMany)
    }

    pub fn with_autocreation(mut self, autocreation: Autocreation) -> Self {
        self.autocreation = autocreation;
        self
    }

    /// Accessor for the targets of a source node.
    pub fn target(&self) -> Endpoint<'_> {
        Endpoint::new(self, Side::Target)
    }

    /// Accessor for the sources of a target node.
    pub fn source(&self) -> Endpoint<'_> {
        Endpoint::new(self, Side::Source)
    }

    /// Structural checks that do not need the registry.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("id", &self.id),
            ("relationship type", &self.rel_type),
            ("source type", &self.source_type),
            ("target type", &self.target_type),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Configuration(format!(
                    "relation '{}' has an empty {field}",
                    self.id
                )));
            }
        }
        Ok(())
    }
}
