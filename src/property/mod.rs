//! # Properties
//!
//! A property is a typed accessor bound to a declaring type and a name.
//! What a property can do is expressed as capability traits, composed per
//! property kind:
//!
//! | Trait | Capability |
//! |-------|------------|
//! | `PropertyKey` | identity and metadata (object safe, kept in the registry) |
//! | `Readable` | read the value from an entity |
//! | `Writable` | replace the value on an entity |
//! | `Searchable` | parse search input and compile search attributes |
//! | `Autocreatable` | report the relation's autocreation policy |

pub mod collection;
pub mod value;

use crate::entity::Entity;
use crate::notion::Notion;
use crate::predicate::NodePredicate;
use crate::schema::relation::{autocreate_description, Autocreation, RelationDescriptor};
use crate::search::{Occurrence, SearchAttribute};
use crate::security::SecurityContext;
use crate::storage::GraphStore;
use crate::Result;

pub use collection::CollectionProperty;
pub use value::ValueProperty;

/// Identity and metadata of a property.
pub trait PropertyKey: Send + Sync {
    fn name(&self) -> &str;

    /// Node type the property is declared on.
    fn declaring_type(&self) -> &str;

    /// Short kind name, e.g. `"collection"`.
    fn type_name(&self) -> &'static str;

    /// Node type on the far end, for relationship properties.
    fn related_type(&self) -> Option<&str> {
        None
    }

    fn is_collection(&self) -> bool {
        false
    }

    fn is_searchable(&self) -> bool {
        false
    }

    fn relation(&self) -> Option<&RelationDescriptor> {
        None
    }

    fn notion(&self) -> Option<&dyn Notion> {
        None
    }
}

/// Read access on entities of type `E`.
pub trait Readable<E: Entity>: PropertyKey {
    type Value;

    fn get<S: GraphStore>(
        &self,
        store: &S,
        tx: &S::Tx,
        ctx: &dyn SecurityContext,
        entity: &E,
        predicate: Option<&dyn NodePredicate>,
    ) -> Result<Self::Value>;
}

/// Write access on entities of type `E`.
///
/// Runs inside the caller's transaction; nothing here commits.
pub trait Writable<E: Entity>: Readable<E> {
    type Previous;

    fn set<S: GraphStore>(
        &self,
        store: &S,
        tx: &mut S::Tx,
        ctx: &dyn SecurityContext,
        entity: &E,
        value: Self::Value,
    ) -> Result<Self::Previous>;
}

/// Search support.
pub trait Searchable: PropertyKey {
    type SearchValue;

    /// Parse a raw request parameter.
    ///
    /// `Ok(None)` means the property cannot be searched this way, which is
    /// different from a search value that parsed to nothing.
    fn convert_search_value<S: GraphStore>(
        &self,
        store: &S,
        tx: &S::Tx,
        ctx: &dyn SecurityContext,
        raw: &str,
    ) -> Result<Option<Self::SearchValue>>;

    /// Compile one search term. Never fails.
    #[allow(clippy::too_many_arguments)]
    fn search_attribute<S: GraphStore>(
        &self,
        store: &S,
        tx: &S::Tx,
        ctx: &dyn SecurityContext,
        occurrence: Occurrence,
        value: &Self::SearchValue,
        exact: bool,
        predicate: Option<&dyn NodePredicate>,
    ) -> SearchAttribute;
}

/// Autocreation policy of a relationship property.
pub trait Autocreatable: PropertyKey {
    /// True for `Always` and `SourceToTarget`.
    fn do_autocreate(&self) -> bool {
        self.relation().is_some_and(|rel| {
            matches!(rel.autocreation, Autocreation::Always | Autocreation::SourceToTarget)
        })
    }

    /// Description of the autocreation flag; the default flag's
    /// description when there is no relation.
    fn autocreate_flag_name(&self) -> &'static str {
        autocreate_description(self.relation())
    }
}
