//! # Notions
//!
//! A notion decides how a related node is exposed to the application and
//! how request-style tokens are resolved back into nodes. Notions hold no
//! per-call state and are shared by every caller of a property.

use std::fmt;

use smallvec::SmallVec;

use crate::model::{Node, NodeId, Value};
use crate::security::{Permission, SecurityContext};
use crate::storage::NodeLookup;
use crate::{Error, Result};

/// Split a raw search parameter on runs of `,` and `;`.
///
/// Empty and all-whitespace tokens are dropped; the rest are trimmed.
pub fn split_tokens(raw: &str) -> SmallVec<[&str; 8]> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Conversion strategy between a related node and its exposed form.
pub trait Notion: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Exposed representation of a related node.
    fn represent(&self, node: &Node) -> Value;

    /// Whether this notion can turn tokens back into nodes at all.
    fn accepts_input(&self) -> bool {
        true
    }

    /// Resolve one token to a node of `target_type`.
    fn resolve(
        &self,
        lookup: &dyn NodeLookup,
        ctx: &dyn SecurityContext,
        target_type: &str,
        token: &str,
    ) -> Result<Node>;
}

impl dyn Notion + '_ {
    /// Converter from raw tokens to nodes, or `None` when the notion takes
    /// no input.
    pub fn collection_converter<'a>(
        &'a self,
        ctx: &'a dyn SecurityContext,
        target_type: &'a str,
    ) -> Option<CollectionConverter<'a>> {
        self.accepts_input().then_some(CollectionConverter { notion: self, ctx, target_type })
    }
}

/// Resolves a sequence of tokens through a notion.
pub struct CollectionConverter<'a> {
    notion: &'a dyn Notion,
    ctx: &'a dyn SecurityContext,
    target_type: &'a str,
}

impl CollectionConverter<'_> {
    /// Resolve every token, in order. Blank tokens are skipped; the first
    /// token that does not resolve fails the conversion.
    pub fn convert<'t>(
        &self,
        lookup: &dyn NodeLookup,
        tokens: impl IntoIterator<Item = &'t str>,
    ) -> Result<Vec<Node>> {
        tokens
            .into_iter()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| self.notion.resolve(lookup, self.ctx, self.target_type, t))
            .collect()
    }
}

fn check_resolved(node: Node, ctx: &dyn SecurityContext, target_type: &str) -> Result<Node> {
    if !node.is_a(target_type) {
        return Err(Error::TypeError {
            expected: target_type.to_string(),
            got: node.node_type,
        });
    }
    ctx.check(&node, Permission::Read)?;
    Ok(node)
}

// ============================================================================
// IdentityNotion
// ============================================================================

/// Exposes a related node as itself; tokens are node ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityNotion;

impl Notion for IdentityNotion {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn represent(&self, node: &Node) -> Value {
        Value::Node(Box::new(node.clone()))
    }

    fn resolve(
        &self,
        lookup: &dyn NodeLookup,
        ctx: &dyn SecurityContext,
        target_type: &str,
        token: &str,
    ) -> Result<Node> {
        let id: NodeId = token
            .parse()
            .map_err(|_| Error::NotFound(format!("{target_type} with id '{token}'")))?;
        let node = lookup
            .node_by_id(id)?
            .ok_or_else(|| Error::NotFound(format!("{target_type} with id '{token}'")))?;
        check_resolved(node, ctx, target_type)
    }
}

// ============================================================================
// PropertyNotion
// ============================================================================

/// Exposes one property of the related node; tokens are matched against
/// that property on nodes of the target type.
#[derive(Debug, Clone)]
pub struct PropertyNotion {
    key: String,
    accepts_input: bool,
}

impl PropertyNotion {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), accepts_input: true }
    }

    /// A notion that only exposes the property and takes no input.
    pub fn output_only(key: impl Into<String>) -> Self {
        Self { key: key.into(), accepts_input: false }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Notion for PropertyNotion {
    fn name(&self) -> &'static str {
        "property"
    }

    fn represent(&self, node: &Node) -> Value {
        node.get(&self.key).cloned().unwrap_or(Value::Null)
    }

    fn accepts_input(&self) -> bool {
        self.accepts_input
    }

    fn resolve(
        &self,
        lookup: &dyn NodeLookup,
        ctx: &dyn SecurityContext,
        target_type: &str,
        token: &str,
    ) -> Result<Node> {
        let mut candidates = lookup.nodes_by_property(target_type, &self.key, &Value::from(token))?;
        if candidates.is_empty() {
            if let Ok(n) = token.parse::<i64>() {
                candidates = lookup.nodes_by_property(target_type, &self.key, &Value::Int(n))?;
            }
        }

        let first = candidates
            .into_iter()
            .find(|n| ctx.is_allowed(n, Permission::Read))
            .ok_or_else(|| Error::NotFound(format!("{target_type} with {} '{token}'", self.key)))?;
        check_resolved(first, ctx, target_type)
    }
}
