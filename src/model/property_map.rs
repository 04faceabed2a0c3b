//! Property maps carried by nodes and relationships.

use std::collections::HashMap;
use super::Value;

/// Property names to values. Keys are case-sensitive.
pub type PropertyMap = HashMap<String, Value>;
