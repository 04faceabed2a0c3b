//! Security contexts.
//!
//! A security context decides whether the current principal may read or
//! write a node. It is passed explicitly to every accessor call and is
//! never cached by the relation layer.

use std::fmt;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::model::{Node, NodeId};
use crate::{Error, Result};

/// Access kind checked against a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Read => write!(f, "read"),
            Permission::Write => write!(f, "write"),
        }
    }
}

/// Permission oracle supplied by the caller.
pub trait SecurityContext: Send + Sync {
    fn is_allowed(&self, node: &Node, permission: Permission) -> bool;

    /// Name of the principal, for log output only.
    fn principal(&self) -> Option<&str> {
        None
    }
}

impl dyn SecurityContext + '_ {
    /// Turn a failed check into `Error::PermissionDenied`.
    pub fn check(&self, node: &Node, permission: Permission) -> Result<()> {
        if self.is_allowed(node, permission) {
            Ok(())
        } else {
            Err(Error::PermissionDenied { action: permission, node: node.id })
        }
    }
}

/// Allows everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuperUserContext;

impl SecurityContext for SuperUserContext {
    fn is_allowed(&self, _node: &Node, _permission: Permission) -> bool {
        true
    }

    fn principal(&self) -> Option<&str> {
        Some("superuser")
    }
}

/// Explicit grants per node.
///
/// A write grant implies read. Nodes of a type listed in `public_types`
/// are readable by everyone.
#[derive(Debug, Clone, Default)]
pub struct AccessList {
    principal: String,
    readable: HashSet<NodeId>,
    writable: HashSet<NodeId>,
    public_types: HashSet<String>,
}

impl AccessList {
    pub fn new(principal: impl Into<String>) -> Self {
        Self { principal: principal.into(), ..Self::default() }
    }

    pub fn grant_read(mut self, ids: impl IntoIterator<Item = NodeId>) -> Self {
        self.readable.extend(ids);
        self
    }

    pub fn grant_write(mut self, ids: impl IntoIterator<Item = NodeId>) -> Self {
        self.writable.extend(ids);
        self
    }

    pub fn public_type(mut self, node_type: impl Into<String>) -> Self {
        self.public_types.insert(node_type.into());
        self
    }
}

impl SecurityContext for AccessList {
    fn is_allowed(&self, node: &Node, permission: Permission) -> bool {
        let writable = self.writable.contains(&node.id);
        match permission {
            Permission::Write => writable,
            Permission::Read => {
                writable
                    || self.readable.contains(&node.id)
                    || self.public_types.contains(&node.node_type)
            }
        }
    }

    fn principal(&self) -> Option<&str> {
        Some(self.principal.as_str())
    }
}
