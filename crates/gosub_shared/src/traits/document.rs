use crate::node::NodeId;
use crate::traits::node::Node;

/// Read access to a node tree
pub trait Document {
    type Node: Node;

    /// Fetches a node by id
    fn node_by_id(&self, node_id: NodeId) -> Option<&Self::Node>;

    /// Returns the document node
    fn get_root(&self) -> Option<&Self::Node> {
        self.node_by_id(NodeId::root())
    }
}
