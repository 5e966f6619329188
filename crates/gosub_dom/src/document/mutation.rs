//! Insertion and removal of nodes.
//!
//! See: https://dom.spec.whatwg.org/#mutation-algorithms

use crate::document::document_impl::DocumentImpl;
use crate::errors::Error;
use crate::node::node_impl::{NodeDataTypeInternal, NodeImpl};
use gosub_config::config;
use gosub_shared::node::NodeId;
use gosub_shared::traits::document::Document;
use gosub_shared::traits::node::{Node, NodeType};
use gosub_shared::types::Result;
use log::debug;

fn hierarchy_error<T>(message: &str) -> Result<T> {
    Err(Error::HierarchyRequest(message.to_owned()).into())
}

impl DocumentImpl {
    /// Appends the node as the last child of `parent`. Returns the appended node.
    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> Result<NodeId> {
        self.pre_insert(node, parent, None)
    }

    /// Inserts the node before `child`, or at the end when `child` is `None`
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        child: Option<NodeId>,
    ) -> Result<NodeId> {
        self.pre_insert(node, parent, child)
    }

    /// Removes `child` from `parent`. Returns the removed child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId> {
        self.existing(parent)?;
        if self.parent(child) != Some(parent) {
            return Err(Error::NotFound(format!("node {child} is not a child of {parent}")).into());
        }

        self.remove_node(child);
        Ok(child)
    }

    /// Removes the node from its parent. Nodes without a parent are left alone.
    pub fn remove(&mut self, node: NodeId) -> Result<()> {
        self.existing(node)?;
        if self.parent(node).is_some() {
            self.remove_node(node);
        }
        Ok(())
    }

    /// Replaces `child` with `node` in `parent`. Returns the replaced child.
    pub fn replace_child(&mut self, parent: NodeId, node: NodeId, child: NodeId) -> Result<NodeId> {
        self.validate_parent_and_node(parent, node)?;
        if self.parent(child) != Some(parent) {
            return Err(Error::NotFound(format!("node {child} is not a child of {parent}")).into());
        }
        self.validate_node_type(parent, node)?;

        if self.is_document_node(parent) {
            self.validate_document_replace(parent, node, child)?;
        }

        let mut reference = self.next_sibling(child);
        if reference == Some(node) {
            reference = self.next_sibling(node);
        }

        if self.parent(node).is_some() {
            self.remove_node(node);
        }
        if self.parent(child).is_some() {
            self.remove_node(child);
        }

        self.insert(node, parent, reference);
        Ok(child)
    }

    /// See: https://dom.spec.whatwg.org/#concept-node-pre-insert
    fn pre_insert(&mut self, node: NodeId, parent: NodeId, child: Option<NodeId>) -> Result<NodeId> {
        self.ensure_pre_insertion_validity(node, parent, child)?;

        let mut reference = child;
        if reference == Some(node) {
            reference = self.next_sibling(node);
        }

        if self.parent(node).is_some() {
            self.remove_node(node);
        }

        self.insert(node, parent, reference);
        Ok(node)
    }

    /// See: https://dom.spec.whatwg.org/#concept-node-ensure-pre-insertion-validity
    fn ensure_pre_insertion_validity(
        &self,
        node: NodeId,
        parent: NodeId,
        child: Option<NodeId>,
    ) -> Result<()> {
        self.validate_parent_and_node(parent, node)?;

        if let Some(child) = child {
            if self.parent(child) != Some(parent) {
                return Err(
                    Error::NotFound(format!("node {child} is not a child of {parent}")).into(),
                );
            }
        }

        self.validate_node_type(parent, node)?;

        if self.is_document_node(parent) {
            self.validate_document_insert(parent, node, child)?;
        }

        Ok(())
    }

    fn validate_parent_and_node(&self, parent: NodeId, node: NodeId) -> Result<()> {
        let parent_node = self.existing(parent)?;
        self.existing(node)?;

        if !matches!(
            parent_node.type_of(),
            NodeType::DocumentNode | NodeType::DocumentFragmentNode | NodeType::ElementNode
        ) {
            return hierarchy_error("parent cannot have children");
        }

        if self.is_host_including_inclusive_ancestor_of(node, parent) {
            return hierarchy_error("node is an inclusive ancestor of the parent");
        }

        Ok(())
    }

    fn validate_node_type(&self, parent: NodeId, node: NodeId) -> Result<()> {
        let node = self.existing(node)?;

        match &node.data {
            NodeDataTypeInternal::Document(_) | NodeDataTypeInternal::ShadowRoot(_) => {
                hierarchy_error("node cannot be inserted")
            }
            NodeDataTypeInternal::Text(_) if self.is_document_node(parent) => {
                hierarchy_error("text cannot be a child of a document")
            }
            NodeDataTypeInternal::DocType(_) if !self.is_document_node(parent) => {
                hierarchy_error("a doctype can only be a child of a document")
            }
            _ => Ok(()),
        }
    }

    fn validate_document_insert(
        &self,
        parent: NodeId,
        node: NodeId,
        child: Option<NodeId>,
    ) -> Result<()> {
        let child_is_doctype = child.is_some_and(|id| self.is_type(id, NodeType::DocTypeNode));
        let doctype_follows_child = child.is_some_and(|id| {
            self.following_nodes(id)
                .any(|n| self.is_child_of(n, parent) && self.is_type(n, NodeType::DocTypeNode))
        });
        let has_element_child = self.has_child_of_type(parent, NodeType::ElementNode, None);

        match self.type_of_id(node) {
            Some(NodeType::DocumentFragmentNode) => {
                let elements = self.count_children_of_type(node, NodeType::ElementNode);
                if elements > 1 || self.has_child_of_type(node, NodeType::TextNode, None) {
                    return hierarchy_error("a document can only have one element child");
                }
                if elements == 1 && (has_element_child || child_is_doctype || doctype_follows_child)
                {
                    return hierarchy_error("the element would not be the only one after the doctype");
                }
            }
            Some(NodeType::ElementNode) => {
                if has_element_child || child_is_doctype || doctype_follows_child {
                    return hierarchy_error("the element would not be the only one after the doctype");
                }
            }
            Some(NodeType::DocTypeNode) => {
                let element_precedes_child = child.is_some_and(|id| {
                    self.preceding_nodes(id)
                        .any(|n| self.is_child_of(n, parent) && self.is_type(n, NodeType::ElementNode))
                });
                if self.has_child_of_type(parent, NodeType::DocTypeNode, None)
                    || element_precedes_child
                    || (child.is_none() && has_element_child)
                {
                    return hierarchy_error("the doctype would not be the only one before the element");
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn validate_document_replace(&self, parent: NodeId, node: NodeId, child: NodeId) -> Result<()> {
        let doctype_follows_child = self
            .following_nodes(child)
            .any(|n| self.is_child_of(n, parent) && self.is_type(n, NodeType::DocTypeNode));
        let other_element = self.has_child_of_type(parent, NodeType::ElementNode, Some(child));

        match self.type_of_id(node) {
            Some(NodeType::DocumentFragmentNode) => {
                let elements = self.count_children_of_type(node, NodeType::ElementNode);
                if elements > 1 || self.has_child_of_type(node, NodeType::TextNode, None) {
                    return hierarchy_error("a document can only have one element child");
                }
                if elements == 1 && (other_element || doctype_follows_child) {
                    return hierarchy_error("the element would not be the only one after the doctype");
                }
            }
            Some(NodeType::ElementNode) => {
                if other_element || doctype_follows_child {
                    return hierarchy_error("the element would not be the only one after the doctype");
                }
            }
            Some(NodeType::DocTypeNode) => {
                let element_precedes_child = self
                    .preceding_nodes(child)
                    .any(|n| self.is_child_of(n, parent) && self.is_type(n, NodeType::ElementNode));
                if self.has_child_of_type(parent, NodeType::DocTypeNode, Some(child))
                    || element_precedes_child
                {
                    return hierarchy_error("the doctype would not be the only one before the element");
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// See: https://dom.spec.whatwg.org/#concept-node-insert
    pub(crate) fn insert(&mut self, node: NodeId, parent: NodeId, child: Option<NodeId>) {
        let is_fragment = self.type_of_id(node) == Some(NodeType::DocumentFragmentNode);
        let nodes: Vec<NodeId> = if is_fragment {
            self.children(node).to_vec()
        } else {
            vec![node]
        };

        if is_fragment {
            for fragment_child in &nodes {
                self.remove_node(*fragment_child);
            }
        }

        for n in nodes {
            let index = child
                .and_then(|c| self.children(parent).iter().position(|id| *id == c))
                .unwrap_or(self.children(parent).len());

            if let Some(parent_node) = self.node_mut(parent) {
                parent_node.children.insert(index, n);
            }
            if let Some(inserted) = self.node_mut(n) {
                inserted.parent = Some(parent);
            }

            let named_shadow_host = self
                .shadow_root(parent)
                .and_then(|root| self.node_by_id(root))
                .and_then(NodeImpl::get_shadow_root_data)
                .is_some_and(|data| data.is_named());
            if named_shadow_host && self.is_slottable_id(n) {
                self.assign_a_slot(n);
            }

            if self.containing_shadow_root(parent).is_some()
                && self.is_slot_id(parent)
                && self.assigned_nodes(parent, false).is_empty()
            {
                self.signal_a_slot_change(parent);
            }

            self.assign_slottables_for_tree(self.root(n));
        }
    }

    /// See: https://dom.spec.whatwg.org/#concept-node-remove
    pub(crate) fn remove_node(&mut self, node: NodeId) {
        let Some(parent) = self.parent(node) else {
            return;
        };

        self.run_node_iterator_pre_removing_steps(node);

        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.remove(&node);
        }
        if let Some(removed) = self.node_mut(node) {
            removed.parent = None;
        }

        if let Some(slot) = self.node_by_id(node).and_then(|n| n.internals.assigned_slot) {
            self.assign_slottables(slot);
        }

        if self.containing_shadow_root(parent).is_some()
            && self.is_slot_id(parent)
            && self.assigned_nodes(parent, false).is_empty()
        {
            self.signal_a_slot_change(parent);
        }

        if self.inclusive_descendants(node).any(|id| self.is_slot_id(id)) {
            self.assign_slottables_for_tree(self.root(parent));
            self.assign_slottables_for_tree(node);
        }
    }

    /// Moves the cursor of every live node iterator out of the subtree that is about to be removed.
    /// See: https://dom.spec.whatwg.org/#nodeiterator-pre-removing-steps
    fn run_node_iterator_pre_removing_steps(&mut self, to_be_removed: NodeId) {
        let log_adjustments = config!(bool "dom.traversal.log_adjustments");
        self.sweep_node_iterators();
        let ids: Vec<_> = self.node_iterators.keys().copied().collect();

        for id in ids {
            let Some(mut state) = self.node_iterators.get(&id).map(|entry| entry.state) else {
                continue;
            };

            // Removing the root or one of its ancestors takes the whole iterated subtree along
            if !self.is_inclusive_ancestor_of(to_be_removed, state.reference)
                || self.is_inclusive_ancestor_of(to_be_removed, state.root)
            {
                continue;
            }

            let old = state;
            let mut adjusted = false;
            if state.pointer_before_reference {
                if let Some(next) = self.first_following_outside(to_be_removed, state.root) {
                    state.reference = next;
                    adjusted = true;
                } else {
                    state.pointer_before_reference = false;
                }
            }

            if !adjusted {
                state.reference = match self.previous_sibling(to_be_removed) {
                    Some(sibling) => self.last_inclusive_descendant(sibling),
                    None => self.parent(to_be_removed).unwrap_or(state.root),
                };
            }

            if log_adjustments {
                debug!(
                    "node iterator {id:?}: removal of {to_be_removed} moved reference {} -> {} (before: {} -> {})",
                    old.reference,
                    state.reference,
                    old.pointer_before_reference,
                    state.pointer_before_reference
                );
            }

            if let Some(entry) = self.node_iterators.get_mut(&id) {
                entry.state = state;
            }
        }
    }

    /// First node following the subtree of `node` in tree order that is still inside `root`
    fn first_following_outside(&self, node: NodeId, root: NodeId) -> Option<NodeId> {
        let mut current = node;
        loop {
            if current == root {
                return None;
            }
            if let Some(sibling) = self.next_sibling(current) {
                return self
                    .is_inclusive_ancestor_of(root, sibling)
                    .then_some(sibling);
            }
            current = self.parent(current)?;
        }
    }

    fn type_of_id(&self, node_id: NodeId) -> Option<NodeType> {
        self.node_by_id(node_id).map(Node::type_of)
    }

    fn is_type(&self, node_id: NodeId, node_type: NodeType) -> bool {
        self.type_of_id(node_id) == Some(node_type)
    }

    fn is_document_node(&self, node_id: NodeId) -> bool {
        self.is_type(node_id, NodeType::DocumentNode)
    }

    pub(crate) fn is_slot_id(&self, node_id: NodeId) -> bool {
        self.node_by_id(node_id).is_some_and(NodeImpl::is_slot)
    }

    pub(crate) fn is_slottable_id(&self, node_id: NodeId) -> bool {
        self.node_by_id(node_id).is_some_and(NodeImpl::is_slottable)
    }

    fn count_children_of_type(&self, parent: NodeId, node_type: NodeType) -> usize {
        self.children(parent)
            .iter()
            .filter(|id| self.is_type(**id, node_type))
            .count()
    }

    fn has_child_of_type(&self, parent: NodeId, node_type: NodeType, except: Option<NodeId>) -> bool {
        self.children(parent)
            .iter()
            .any(|id| Some(*id) != except && self.is_type(*id, node_type))
    }
}
