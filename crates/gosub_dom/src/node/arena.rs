use crate::node::node_impl::NodeImpl;
use gosub_shared::node::NodeId;
use std::collections::HashMap;

/// The node arena is the single source for nodes in a document. Nodes are never removed from
/// the arena, a detached node simply has no parent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeArena {
    /// Current nodes stored as <id, node>
    nodes: HashMap<NodeId, NodeImpl>,
    /// Next node ID to use
    next_id: NodeId,
}

impl NodeArena {
    /// Creates a new NodeArena
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Peek what the next node ID is without incrementing the internal counter
    pub fn peek_next_id(&self) -> NodeId {
        self.next_id
    }

    /// Gets the node with the given id
    pub fn node_ref(&self, node_id: NodeId) -> Option<&NodeImpl> {
        self.nodes.get(&node_id)
    }

    /// Get the node with the given id as a mutable reference
    pub(crate) fn node_mut(&mut self, node_id: NodeId) -> Option<&mut NodeImpl> {
        self.nodes.get_mut(&node_id)
    }

    /// Registers an unregistered node into the arena and returns its new id
    pub(crate) fn register_node(&mut self, mut node: NodeImpl) -> NodeId {
        let id = self.next_id;
        self.next_id = id.next();

        node.id = id;
        self.nodes.insert(id, node);
        id
    }

    pub fn nodes(&self) -> &HashMap<NodeId, NodeImpl> {
        &self.nodes
    }
}
