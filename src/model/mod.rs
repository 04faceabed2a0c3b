//! # Property Graph Model
//!
//! Plain data types shared by the store contract, the relation accessors
//! and the search compiler.
//!
//! Pure data: no I/O and no shared state.

pub mod node;
pub mod relationship;
pub mod value;
pub mod property_map;

pub use node::{Node, NodeId};
pub use relationship::{Relationship, RelId, Direction};
pub use value::Value;
pub use property_map::PropertyMap;
