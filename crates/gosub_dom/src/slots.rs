//! Shadow roots and the assignment of slottables to slots.
//!
//! See: https://dom.spec.whatwg.org/#shadow-tree-slots

use crate::document::document_impl::DocumentImpl;
use crate::errors::Error;
use crate::node::data::fragment::{ShadowRootData, ShadowRootInit, SlotAssignmentMode};
use crate::node::elements::is_valid_shadow_host_name;
use crate::node::node_impl::{NodeDataTypeInternal, NodeImpl};
use gosub_config::config;
use gosub_shared::node::NodeId;
use gosub_shared::ordered::OrderedSet;
use gosub_shared::traits::document::Document;
use gosub_shared::traits::node::Node;
use gosub_shared::types::Result;
use log::debug;

impl DocumentImpl {
    /// Attaches a new shadow root to the host element and returns it
    pub fn attach_shadow(&mut self, host: NodeId, init: ShadowRootInit) -> Result<NodeId> {
        let node = self.existing(host)?;
        let Some(element) = node.get_element_data() else {
            return Err(Error::NotSupported(format!("node {host} is not an element")).into());
        };

        if !element.is_html() {
            return Err(Error::NotSupported(format!(
                "{} is not in the HTML namespace",
                element.name
            ))
            .into());
        }
        if !is_valid_shadow_host_name(&element.name) {
            return Err(Error::NotSupported(format!(
                "{} cannot host a shadow root",
                element.name
            ))
            .into());
        }
        if element.shadow_root.is_some() {
            return Err(Error::NotSupported(format!(
                "node {host} already hosts a shadow root"
            ))
            .into());
        }

        let shadow_root = self.arena.register_node(NodeImpl::new(NodeDataTypeInternal::ShadowRoot(
            ShadowRootData::new(host, init),
        )));
        if let Some(element) = self.node_mut(host).and_then(NodeImpl::get_element_data_mut) {
            element.shadow_root = Some(shadow_root);
        }

        debug!(
            "attached {} shadow root {shadow_root} to {host}",
            init.mode
        );
        Ok(shadow_root)
    }

    /// Shadow root attached to the host, regardless of its mode
    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.element_data(host).and_then(|data| data.shadow_root)
    }

    fn shadow_root_data(&self, shadow_root: NodeId) -> Option<&ShadowRootData> {
        self.node_by_id(shadow_root)
            .and_then(NodeImpl::get_shadow_root_data)
    }

    /// Slot the slottable would be assigned to. With `open` set, slots in closed shadow trees are
    /// not found.
    pub fn find_slot(&self, slottable: NodeId, open: bool) -> Option<NodeId> {
        if !self.is_slottable_id(slottable) {
            return None;
        }
        let parent = self.parent(slottable)?;
        let shadow_root = self.shadow_root(parent)?;
        let data = self.shadow_root_data(shadow_root)?;

        if open && !data.is_open() {
            return None;
        }

        let mut slots = self
            .descendants(shadow_root)
            .filter(|id| self.is_slot_id(*id));

        if data.slot_assignment == SlotAssignmentMode::Manual {
            return slots.find(|slot| {
                self.node_by_id(*slot)
                    .is_some_and(|node| node.internals.manually_assigned_nodes.contains(&slottable))
            });
        }

        let name = self.node_by_id(slottable)?.slottable_name();
        slots.find(|slot| {
            self.node_by_id(*slot)
                .is_some_and(|node| node.slot_name() == name)
        })
    }

    /// Slottables that belong in the slot, in tree order
    pub fn find_slottables(&self, slot: NodeId) -> Vec<NodeId> {
        let root = self.root(slot);
        let Some(data) = self.shadow_root_data(root) else {
            return Vec::new();
        };
        let host = data.host;

        if data.slot_assignment == SlotAssignmentMode::Manual {
            return self
                .node_by_id(slot)
                .map(|node| {
                    node.internals
                        .manually_assigned_nodes
                        .iter()
                        .copied()
                        .filter(|slottable| self.parent(*slottable) == Some(host))
                        .collect()
                })
                .unwrap_or_default();
        }

        self.children(host)
            .iter()
            .copied()
            .filter(|child| self.is_slottable_id(*child))
            .filter(|child| self.find_slot(*child, false) == Some(slot))
            .collect()
    }

    /// Slottables of the slot with nested slots replaced by their own flattened slottables. A slot
    /// without slottables falls back to its own children.
    pub fn find_flattened_slottables(&self, slot: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        if self.containing_shadow_root(slot).is_none() {
            return result;
        }

        let mut slottables = self.find_slottables(slot);
        if slottables.is_empty() {
            slottables = self
                .children(slot)
                .iter()
                .copied()
                .filter(|child| self.is_slottable_id(*child))
                .collect();
        }

        for node in slottables {
            if self.is_slot_id(node) && self.containing_shadow_root(node).is_some() {
                result.extend(self.find_flattened_slottables(node));
            } else {
                result.push(node);
            }
        }

        result
    }

    /// Recomputes the assigned nodes of the slot and signals a change when they differ
    pub fn assign_slottables(&mut self, slot: NodeId) {
        let slottables: OrderedSet<NodeId> = self.find_slottables(slot).into_iter().collect();
        let Some(previous) = self
            .node_by_id(slot)
            .map(|node| node.internals.assigned_nodes.clone())
        else {
            return;
        };

        if previous != slottables {
            self.signal_a_slot_change(slot);
        }

        for dropped in previous.iter().filter(|node| !slottables.contains(node)) {
            if let Some(node) = self.node_mut(*dropped) {
                if node.internals.assigned_slot == Some(slot) {
                    node.internals.assigned_slot = None;
                }
            }
        }
        for slottable in &slottables {
            if let Some(node) = self.node_mut(*slottable) {
                node.internals.assigned_slot = Some(slot);
            }
        }
        if let Some(node) = self.node_mut(slot) {
            node.internals.assigned_nodes = slottables;
        }
    }

    /// Runs slot assignment for every slot in the tree of `root`
    pub fn assign_slottables_for_tree(&mut self, root: NodeId) {
        let slots: Vec<NodeId> = self
            .inclusive_descendants(root)
            .filter(|id| self.is_slot_id(*id))
            .collect();

        for slot in slots {
            self.assign_slottables(slot);
        }
    }

    /// Assigns the slottable to the slot it belongs in, if any
    pub fn assign_a_slot(&mut self, slottable: NodeId) {
        if let Some(slot) = self.find_slot(slottable, false) {
            self.assign_slottables(slot);
        }
    }

    /// Queues a slotchange notification for the slot
    pub fn signal_a_slot_change(&mut self, slot: NodeId) {
        if !config!(bool "dom.slots.signal_slotchange") {
            return;
        }

        debug!("slotchange signalled for slot {slot}");
        self.slot_change_signals.append(slot);
    }

    /// Returns the slots that signalled a change, in signal order, and clears the queue
    pub fn take_slot_change_signals(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.slot_change_signals).into_vec()
    }

    /// Manually assigns the given slottables to the slot. Only has an effect in shadow trees with
    /// manual slot assignment.
    pub fn assign_slot_nodes(&mut self, slot: NodeId, nodes: &[NodeId]) -> Result<()> {
        if !self.is_slot_id(slot) {
            return Err(Error::InvalidNodeType(format!("node {slot} is not a slot")).into());
        }
        if let Some(node) = nodes.iter().find(|node| !self.is_slottable_id(**node)) {
            return Err(Error::InvalidNodeType(format!("node {node} is not slottable")).into());
        }

        let previous = self
            .node_by_id(slot)
            .map(|node| node.internals.manually_assigned_nodes.clone())
            .unwrap_or_default();
        for node in &previous {
            if let Some(node) = self.node_mut(*node) {
                node.internals.manual_slot_assignment = None;
            }
        }

        let mut assigned = OrderedSet::new();
        for node_id in nodes {
            let old_slot = self
                .node_by_id(*node_id)
                .and_then(|node| node.internals.manual_slot_assignment);
            if let Some(old_slot) = old_slot.filter(|old| *old != slot) {
                if let Some(old) = self.node_mut(old_slot) {
                    old.internals.manually_assigned_nodes.remove(node_id);
                }
            }
            if let Some(node) = self.node_mut(*node_id) {
                node.internals.manual_slot_assignment = Some(slot);
            }
            assigned.append(*node_id);
        }

        if let Some(node) = self.node_mut(slot) {
            node.internals.manually_assigned_nodes = assigned;
        }

        self.assign_slottables_for_tree(self.root(slot));
        Ok(())
    }

    /// Slot the slottable is assigned to, hidden when the slot lives in a closed shadow tree
    pub fn assigned_slot(&self, slottable: NodeId) -> Option<NodeId> {
        self.find_slot(slottable, true)
    }

    /// Nodes assigned to the slot. With `flatten`, nested slots are replaced by their contents and
    /// fallback children are used for empty slots.
    pub fn assigned_nodes(&self, slot: NodeId, flatten: bool) -> Vec<NodeId> {
        if flatten {
            return self.find_flattened_slottables(slot);
        }

        self.node_by_id(slot)
            .map(|node| node.internals.assigned_nodes.as_slice().to_vec())
            .unwrap_or_default()
    }

    pub fn assigned_elements(&self, slot: NodeId, flatten: bool) -> Vec<NodeId> {
        self.assigned_nodes(slot, flatten)
            .into_iter()
            .filter(|id| self.node_by_id(*id).is_some_and(Node::is_element_node))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::data::fragment::ShadowRootMode;
    use crate::node::SVG_NAMESPACE;

    struct Host {
        doc: DocumentImpl,
        host: NodeId,
        shadow: NodeId,
    }

    fn shadow_host(init: ShadowRootInit) -> Host {
        let mut doc = DocumentImpl::default();
        let host = doc.create_element("div").unwrap();
        doc.append_child(NodeId::root(), host).unwrap();
        let shadow = doc.attach_shadow(host, init).unwrap();
        doc.take_slot_change_signals();
        Host { doc, host, shadow }
    }

    fn slot(doc: &mut DocumentImpl, parent: NodeId, name: Option<&str>) -> NodeId {
        let slot = doc.create_element("slot").unwrap();
        if let Some(name) = name {
            doc.set_attribute(slot, "name", name).unwrap();
        }
        doc.append_child(parent, slot).unwrap();
        slot
    }

    #[test]
    fn attach_shadow_rules() {
        let mut doc = DocumentImpl::default();
        let div = doc.create_element("div").unwrap();
        let custom = doc.create_element("my-widget").unwrap();
        let img = doc.create_element("img").unwrap();
        let rect = doc.create_element_ns(Some(SVG_NAMESPACE), "rect").unwrap();
        let text = doc.create_text_node("x");

        let root = doc.attach_shadow(div, ShadowRootInit::default()).unwrap();
        assert_eq!(doc.shadow_root(div), Some(root));
        assert_eq!(doc.parent(root), None);
        assert!(doc.children(div).is_empty());
        assert!(doc.attach_shadow(custom, ShadowRootInit::default()).is_ok());

        for node in [div, img, rect, text] {
            let err = doc.attach_shadow(node, ShadowRootInit::default()).unwrap_err();
            assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NotSupported(_))));
        }
    }

    #[test]
    fn named_assignment() {
        let Host { mut doc, host, shadow } = shadow_host(ShadowRootInit::default());
        let default_slot = slot(&mut doc, shadow, None);
        let named_slot = slot(&mut doc, shadow, Some("title"));

        let a = doc.create_element("span").unwrap();
        let b = doc.create_element("h1").unwrap();
        doc.set_attribute(b, "slot", "title").unwrap();
        let text = doc.create_text_node("loose text");
        let comment = doc.create_comment("never slotted");

        for node in [a, b, text, comment] {
            doc.append_child(host, node).unwrap();
        }

        assert_eq!(doc.assigned_nodes(default_slot, false), [a, text]);
        assert_eq!(doc.assigned_nodes(named_slot, false), [b]);
        assert_eq!(doc.assigned_elements(default_slot, false), [a]);
        assert_eq!(doc.assigned_slot(b), Some(named_slot));
        assert_eq!(doc.assigned_slot(comment), None);

        // renaming the slottable moves it
        doc.set_attribute(b, "slot", "").unwrap();
        assert_eq!(doc.assigned_nodes(default_slot, false), [a, b, text]);
        assert!(doc.assigned_nodes(named_slot, false).is_empty());

        // renaming the slot picks up matching slottables
        doc.set_attribute(a, "slot", "footer").unwrap();
        doc.set_attribute(named_slot, "name", "footer").unwrap();
        assert_eq!(doc.assigned_nodes(named_slot, false), [a]);
        assert_eq!(doc.assigned_slot(a), Some(named_slot));

        // removal clears the assignment
        doc.remove(a).unwrap();
        assert!(doc.assigned_nodes(named_slot, false).is_empty());
        assert_eq!(doc.assigned_slot(a), None);
    }

    #[test]
    fn first_slot_in_tree_order_wins() {
        let Host { mut doc, host, shadow } = shadow_host(ShadowRootInit::default());
        let wrapper = doc.create_element("div").unwrap();
        doc.append_child(shadow, wrapper).unwrap();
        let late = slot(&mut doc, shadow, None);
        let early = doc.create_element("slot").unwrap();
        doc.append_child(wrapper, early).unwrap();

        let child = doc.create_element("span").unwrap();
        doc.append_child(host, child).unwrap();

        assert_eq!(doc.find_slot(child, false), Some(early));
        assert_eq!(doc.assigned_nodes(early, false), [child]);
        assert!(doc.assigned_nodes(late, false).is_empty());

        // removing the early slot hands the child to the remaining one
        doc.remove(early).unwrap();
        assert_eq!(doc.assigned_nodes(late, false), [child]);
        assert!(doc.assigned_nodes(early, false).is_empty());
    }

    #[test]
    fn closed_roots_hide_their_slots() {
        let Host { mut doc, host, shadow } = shadow_host(ShadowRootInit {
            mode: ShadowRootMode::Closed,
            ..ShadowRootInit::default()
        });
        let default_slot = slot(&mut doc, shadow, None);
        let child = doc.create_element("span").unwrap();
        doc.append_child(host, child).unwrap();

        assert_eq!(doc.find_slot(child, false), Some(default_slot));
        assert_eq!(doc.assigned_slot(child), None);
        assert_eq!(doc.assigned_nodes(default_slot, false), [child]);
    }

    #[test]
    fn manual_assignment() {
        let Host { mut doc, host, shadow } = shadow_host(ShadowRootInit {
            slot_assignment: SlotAssignmentMode::Manual,
            ..ShadowRootInit::default()
        });
        let first = slot(&mut doc, shadow, None);
        let second = slot(&mut doc, shadow, None);

        let a = doc.create_element("span").unwrap();
        let b = doc.create_element("span").unwrap();
        let outsider = doc.create_element("span").unwrap();
        doc.append_child(host, a).unwrap();
        doc.append_child(host, b).unwrap();

        // nothing is assigned by name in manual mode
        assert!(doc.assigned_nodes(first, false).is_empty());

        doc.assign_slot_nodes(first, &[b, a, outsider]).unwrap();
        assert_eq!(doc.assigned_nodes(first, false), [b, a]);

        // assigning to another slot takes the node away from the first
        doc.assign_slot_nodes(second, &[a]).unwrap();
        assert_eq!(doc.assigned_nodes(first, false), [b]);
        assert_eq!(doc.assigned_nodes(second, false), [a]);

        // a node that becomes a child of the host later is picked up
        doc.append_child(host, outsider).unwrap();
        doc.assign_slot_nodes(first, &[outsider]).unwrap();
        assert_eq!(doc.assigned_nodes(first, false), [outsider]);

        let comment = doc.create_comment("c");
        assert!(doc.assign_slot_nodes(first, &[comment]).is_err());
        assert!(doc.assign_slot_nodes(a, &[b]).is_err());
    }

    #[test]
    fn slot_change_signals() {
        let Host { mut doc, host, shadow } = shadow_host(ShadowRootInit::default());
        let default_slot = slot(&mut doc, shadow, None);
        let named_slot = slot(&mut doc, shadow, Some("x"));
        assert!(doc.take_slot_change_signals().is_empty());

        let a = doc.create_element("span").unwrap();
        doc.append_child(host, a).unwrap();
        assert_eq!(doc.take_slot_change_signals(), [default_slot]);

        // no change, no signal
        doc.set_attribute(a, "title", "t").unwrap();
        assert!(doc.take_slot_change_signals().is_empty());

        doc.set_attribute(a, "slot", "x").unwrap();
        assert_eq!(doc.take_slot_change_signals(), [default_slot, named_slot]);

        // the queue holds every slot once
        let b = doc.create_element("span").unwrap();
        let c = doc.create_element("span").unwrap();
        doc.append_child(host, b).unwrap();
        doc.remove(b).unwrap();
        doc.append_child(host, c).unwrap();
        assert_eq!(doc.take_slot_change_signals(), [default_slot]);
    }

    #[test]
    fn flattened_slottables() {
        // outer host > [a, b]; outer shadow: inner host > [outer slot]; inner shadow: inner slot
        let Host { mut doc, host, shadow } = shadow_host(ShadowRootInit::default());
        let inner_host = doc.create_element("div").unwrap();
        doc.append_child(shadow, inner_host).unwrap();
        let outer_slot = slot(&mut doc, inner_host, None);
        let inner_shadow = doc.attach_shadow(inner_host, ShadowRootInit::default()).unwrap();
        let inner_slot = slot(&mut doc, inner_shadow, None);

        let a = doc.create_element("span").unwrap();
        let b = doc.create_text_node("b");
        doc.append_child(host, a).unwrap();
        doc.append_child(host, b).unwrap();

        assert_eq!(doc.assigned_nodes(inner_slot, false), [outer_slot]);
        assert_eq!(doc.assigned_nodes(inner_slot, true), [a, b]);
        assert_eq!(doc.assigned_elements(inner_slot, true), [a]);

        // an empty slot falls back to its children when flattened
        doc.remove(a).unwrap();
        doc.remove(b).unwrap();
        let fallback = doc.create_text_node("fallback");
        doc.append_child(outer_slot, fallback).unwrap();
        assert_eq!(doc.assigned_nodes(inner_slot, true), [fallback]);
    }
}
