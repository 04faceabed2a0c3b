//! # Schema
//!
//! Relation descriptors, the type registry they are kept in, and the
//! declarative configuration that populates it at startup.

pub mod relation;
pub mod registry;
pub mod config;

pub use relation::{
    Autocreation, Cardinality, RelationDescriptor,
    CASCADING_DESCRIPTIONS, CONTAINS, autocreate_description, describe_ordinal,
};
pub use registry::{SchemaBuilder, TypeRegistry};
pub use config::{RelationConfig, SchemaConfig};
