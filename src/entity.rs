//! Typed object-model wrappers around graph nodes.

use crate::model::{Node, NodeId};
use crate::{Error, Result};

/// A node type of the object model.
///
/// `TYPE_NAME` is the node type tag the wrapper accepts. Relation
/// descriptors name the same tags, which is how a typed property is
/// checked against its relation at registration.
pub trait Entity: Clone + Send + Sync + 'static {
    const TYPE_NAME: &'static str;

    /// Wrap a node without checking its type tag.
    fn wrap(node: Node) -> Self;

    fn node(&self) -> &Node;

    fn id(&self) -> NodeId {
        self.node().id
    }

    /// Wrap a node, rejecting nodes of another type.
    fn from_node(node: Node) -> Result<Self> {
        if node.is_a(Self::TYPE_NAME) {
            Ok(Self::wrap(node))
        } else {
            Err(Error::TypeError {
                expected: Self::TYPE_NAME.into(),
                got: node.node_type,
            })
        }
    }
}

/// Declare a newtype entity over `Node`.
///
/// ```
/// propgraph_orm::graph_entity!(Folder, "Folder");
/// ```
#[macro_export]
macro_rules! graph_entity {
    ($name:ident, $type_name:expr) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(pub $crate::Node);

        impl $crate::Entity for $name {
            const TYPE_NAME: &'static str = $type_name;

            fn wrap(node: $crate::Node) -> Self {
                $name(node)
            }

            fn node(&self) -> &$crate::Node {
                &self.0
            }
        }

        impl From<$crate::Node> for $name {
            fn from(node: $crate::Node) -> Self {
                $name(node)
            }
        }
    };
}
