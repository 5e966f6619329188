use gosub_shared::node::NodeId;
use gosub_shared::ordered::OrderedSet;

/// State a node carries that is never exposed through the public node API. It lives in the arena
/// entry of the node and is only touched by the algorithms in this crate.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct NodeInternals {
    /// Slot this slottable is assigned to
    pub assigned_slot: Option<NodeId>,
    /// Slot that manually assigned this slottable
    pub manual_slot_assignment: Option<NodeId>,
    /// Slottables currently assigned to this slot
    pub assigned_nodes: OrderedSet<NodeId>,
    /// Slottables given to this slot through `assign()`
    pub manually_assigned_nodes: OrderedSet<NodeId>,
}
