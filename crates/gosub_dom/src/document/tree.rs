//! Navigation, tree-order iteration and relationship predicates.
//!
//! Nothing here fails: a missing node or a step past the edge of the tree yields `None`, an empty
//! slice or `false`. All iterators read the live tree at every step.

use crate::document::document_impl::DocumentImpl;
use gosub_shared::node::NodeId;
use gosub_shared::traits::document::Document;
use gosub_shared::traits::node::Node;
use std::cmp::Ordering;

impl DocumentImpl {
    pub fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.node_by_id(node_id).and_then(|node| node.parent)
    }

    /// Live child list of the node
    pub fn children(&self, node_id: NodeId) -> &[NodeId] {
        self.node_by_id(node_id)
            .map_or(&[], |node| node.children.as_slice())
    }

    pub fn first_child(&self, node_id: NodeId) -> Option<NodeId> {
        self.children(node_id).first().copied()
    }

    pub fn last_child(&self, node_id: NodeId) -> Option<NodeId> {
        self.children(node_id).last().copied()
    }

    pub fn previous_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let parent = self.parent(node_id)?;
        let index = self.index(node_id);
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    pub fn next_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let parent = self.parent(node_id)?;
        self.children(parent).get(self.index(node_id) + 1).copied()
    }

    /// Position of the node among its siblings, 0 for nodes without a parent
    pub fn index(&self, node_id: NodeId) -> usize {
        self.parent(node_id)
            .and_then(|parent| self.children(parent).iter().position(|id| *id == node_id))
            .unwrap_or(0)
    }

    /// Topmost inclusive ancestor. Shadow roots and fragments are roots of their own trees.
    pub fn root(&self, node_id: NodeId) -> NodeId {
        let mut current = node_id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Last node of the subtree in tree order
    pub fn last_inclusive_descendant(&self, node_id: NodeId) -> NodeId {
        let mut current = node_id;
        while let Some(child) = self.last_child(current) {
            current = child;
        }
        current
    }

    /// Next node in tree order, within the tree of the node
    pub fn following(&self, node_id: NodeId) -> Option<NodeId> {
        self.following_within(node_id, self.root(node_id))
    }

    /// Next node in tree order that is still an inclusive descendant of `root`
    pub fn following_within(&self, node_id: NodeId, root: NodeId) -> Option<NodeId> {
        if let Some(child) = self.first_child(node_id) {
            return Some(child);
        }

        let mut current = node_id;
        loop {
            if current == root {
                return None;
            }
            if let Some(sibling) = self.next_sibling(current) {
                return Some(sibling);
            }
            current = self.parent(current)?;
        }
    }

    /// Previous node in tree order
    pub fn preceding(&self, node_id: NodeId) -> Option<NodeId> {
        match self.previous_sibling(node_id) {
            Some(sibling) => Some(self.last_inclusive_descendant(sibling)),
            None => self.parent(node_id),
        }
    }

    /// Previous node in tree order that is still an inclusive descendant of `root`
    pub fn preceding_within(&self, node_id: NodeId, root: NodeId) -> Option<NodeId> {
        if node_id == root {
            return None;
        }
        self.preceding(node_id)
    }

    /// Ancestors, nearest first
    pub fn ancestors(&self, node_id: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, self.parent(node_id), Step::Parent)
    }

    pub fn inclusive_ancestors(&self, node_id: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, self.existing_id(node_id), Step::Parent)
    }

    /// Descendants in pre-order
    pub fn descendants(&self, node_id: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, self.first_child(node_id), Step::FollowingWithin(node_id))
    }

    pub fn inclusive_descendants(&self, node_id: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, self.existing_id(node_id), Step::FollowingWithin(node_id))
    }

    /// Every node after the node in tree order, nearest first
    pub fn following_nodes(&self, node_id: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, self.following(node_id), Step::Following)
    }

    /// Every node before the node in tree order, nearest first
    pub fn preceding_nodes(&self, node_id: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, self.preceding(node_id), Step::Preceding)
    }

    fn existing_id(&self, node_id: NodeId) -> Option<NodeId> {
        self.node_by_id(node_id).map(|_| node_id)
    }

    pub fn is_child_of(&self, node_id: NodeId, parent: NodeId) -> bool {
        self.parent(node_id) == Some(parent)
    }

    pub fn is_descendant_of(&self, node_id: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(node_id).any(|id| id == ancestor)
    }

    pub fn is_inclusive_descendant_of(&self, node_id: NodeId, ancestor: NodeId) -> bool {
        node_id == ancestor || self.is_descendant_of(node_id, ancestor)
    }

    pub fn is_ancestor_of(&self, node_id: NodeId, descendant: NodeId) -> bool {
        self.is_descendant_of(descendant, node_id)
    }

    pub fn is_inclusive_ancestor_of(&self, node_id: NodeId, descendant: NodeId) -> bool {
        self.is_inclusive_descendant_of(descendant, node_id)
    }

    /// Nodes sharing a parent. A node is not its own sibling.
    pub fn is_sibling_of(&self, node_id: NodeId, other: NodeId) -> bool {
        node_id != other
            && self
                .parent(node_id)
                .is_some_and(|parent| self.parent(other) == Some(parent))
    }

    pub fn is_inclusive_sibling_of(&self, node_id: NodeId, other: NodeId) -> bool {
        node_id == other || self.is_sibling_of(node_id, other)
    }

    /// True when `node_id` comes strictly before `other` in the same tree
    pub fn is_preceding(&self, node_id: NodeId, other: NodeId) -> bool {
        self.tree_order(node_id, other) == Some(Ordering::Less)
    }

    /// True when `node_id` comes strictly after `other` in the same tree
    pub fn is_following(&self, node_id: NodeId, other: NodeId) -> bool {
        self.tree_order(node_id, other) == Some(Ordering::Greater)
    }

    /// Compares the position of two nodes in tree order, `None` when they live in different trees
    pub fn tree_order(&self, a: NodeId, b: NodeId) -> Option<Ordering> {
        if self.node_by_id(a).is_none() || self.node_by_id(b).is_none() {
            return None;
        }
        if a == b {
            return Some(Ordering::Equal);
        }

        let (path_a, root_a) = self.index_path(a);
        let (path_b, root_b) = self.index_path(b);
        if root_a != root_b {
            return None;
        }

        // An ancestor's path is a prefix of its descendant's, which compares as less
        Some(path_a.cmp(&path_b))
    }

    /// Child indexes from the root down to the node
    fn index_path(&self, node_id: NodeId) -> (Vec<usize>, NodeId) {
        let mut path = Vec::new();
        let mut current = node_id;
        while let Some(parent) = self.parent(current) {
            path.push(self.index(current));
            current = parent;
        }
        path.reverse();

        (path, current)
    }

    /// The root of the node, or of its host when that root is a shadow root, repeated until a
    /// root that is not a shadow root is found
    pub fn shadow_including_root(&self, node_id: NodeId) -> NodeId {
        let mut root = self.root(node_id);
        while let Some(host) = self.shadow_host_of_root(root) {
            root = self.root(host);
        }
        root
    }

    /// Shadow root that contains the node, if the node lives in a shadow tree
    pub fn containing_shadow_root(&self, node_id: NodeId) -> Option<NodeId> {
        let root = self.root(node_id);
        self.node_by_id(root)
            .is_some_and(|node| node.is_shadow_root())
            .then_some(root)
    }

    fn shadow_host_of_root(&self, root: NodeId) -> Option<NodeId> {
        self.node_by_id(root)
            .and_then(|node| node.get_shadow_root_data())
            .map(|data| data.host)
    }

    pub fn is_shadow_including_descendant_of(&self, node_id: NodeId, ancestor: NodeId) -> bool {
        if self.is_descendant_of(node_id, ancestor) {
            return true;
        }

        let root = self.root(node_id);
        self.shadow_host_of_root(root)
            .is_some_and(|host| self.is_shadow_including_inclusive_descendant_of(host, ancestor))
    }

    pub fn is_shadow_including_inclusive_descendant_of(
        &self,
        node_id: NodeId,
        ancestor: NodeId,
    ) -> bool {
        node_id == ancestor || self.is_shadow_including_descendant_of(node_id, ancestor)
    }

    pub fn is_shadow_including_ancestor_of(&self, node_id: NodeId, descendant: NodeId) -> bool {
        self.is_shadow_including_descendant_of(descendant, node_id)
    }

    pub fn is_shadow_including_inclusive_ancestor_of(
        &self,
        node_id: NodeId,
        descendant: NodeId,
    ) -> bool {
        self.is_shadow_including_inclusive_descendant_of(descendant, node_id)
    }

    /// Like inclusive ancestry, but crossing from shadow roots and template contents to their host
    pub fn is_host_including_inclusive_ancestor_of(
        &self,
        node_id: NodeId,
        descendant: NodeId,
    ) -> bool {
        if self.is_inclusive_ancestor_of(node_id, descendant) {
            return true;
        }

        let root = self.root(descendant);
        self.node_by_id(root)
            .and_then(|node| node.fragment_host())
            .is_some_and(|host| self.is_host_including_inclusive_ancestor_of(node_id, host))
    }

    /// Nodes of the tree and of every nested shadow tree in shadow-including pre-order: a host's
    /// shadow root is visited before the host's children
    pub fn shadow_including_inclusive_descendants(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![node_id];

        while let Some(current) = stack.pop() {
            let Some(node) = self.node_by_id(current) else {
                continue;
            };
            result.push(current);

            stack.extend(node.children.iter().rev());
            if let Some(shadow_root) = node.get_element_data().and_then(|data| data.shadow_root) {
                stack.push(shadow_root);
            }
        }

        result
    }

    /// A node is connected when its shadow-including root is the document
    pub fn is_connected(&self, node_id: NodeId) -> bool {
        self.shadow_including_root(node_id) == NodeId::root()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    Parent,
    FollowingWithin(NodeId),
    Following,
    Preceding,
}

/// Lazy walk over the tree, one step per item
#[derive(Debug, Clone)]
pub struct TreeIterator<'doc> {
    document: &'doc DocumentImpl,
    next: Option<NodeId>,
    step: Step,
}

impl<'doc> TreeIterator<'doc> {
    fn new(document: &'doc DocumentImpl, start: Option<NodeId>, step: Step) -> Self {
        Self {
            document,
            next: start,
            step,
        }
    }
}

impl Iterator for TreeIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;

        self.next = match self.step {
            Step::Parent => self.document.parent(current),
            Step::FollowingWithin(root) => self.document.following_within(current, root),
            Step::Following => self.document.following(current),
            Step::Preceding => self.document.preceding(current),
        };

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use crate::document::document_impl::DocumentImpl;
    use crate::node::data::fragment::ShadowRootInit;
    use gosub_shared::node::NodeId;
    use std::cmp::Ordering;

    /// document
    /// └─ html
    ///    ├─ head
    ///    │  └─ title
    ///    └─ body
    ///       ├─ p
    ///       │  └─ "text"
    ///       └─ div
    struct Fixture {
        doc: DocumentImpl,
        html: NodeId,
        head: NodeId,
        title: NodeId,
        body: NodeId,
        p: NodeId,
        text: NodeId,
        div: NodeId,
    }

    fn fixture() -> Fixture {
        let mut doc = DocumentImpl::default();
        let html = doc.create_element("html").unwrap();
        let head = doc.create_element("head").unwrap();
        let title = doc.create_element("title").unwrap();
        let body = doc.create_element("body").unwrap();
        let p = doc.create_element("p").unwrap();
        let text = doc.create_text_node("text");
        let div = doc.create_element("div").unwrap();

        doc.append_child(NodeId::root(), html).unwrap();
        doc.append_child(html, head).unwrap();
        doc.append_child(head, title).unwrap();
        doc.append_child(html, body).unwrap();
        doc.append_child(body, p).unwrap();
        doc.append_child(p, text).unwrap();
        doc.append_child(body, div).unwrap();

        Fixture { doc, html, head, title, body, p, text, div }
    }

    #[test]
    fn navigation() {
        let f = fixture();
        let doc = &f.doc;

        assert_eq!(doc.parent(f.head), Some(f.html));
        assert_eq!(doc.parent(NodeId::root()), None);
        assert_eq!(doc.first_child(f.html), Some(f.head));
        assert_eq!(doc.last_child(f.html), Some(f.body));
        assert_eq!(doc.next_sibling(f.head), Some(f.body));
        assert_eq!(doc.next_sibling(f.body), None);
        assert_eq!(doc.previous_sibling(f.body), Some(f.head));
        assert_eq!(doc.previous_sibling(f.head), None);
        assert_eq!(doc.index(f.div), 1);
        assert_eq!(doc.root(f.text), NodeId::root());
        assert_eq!(doc.first_child(f.text), None);
        assert!(doc.children(NodeId::from(999_usize)).is_empty());
    }

    #[test]
    fn iterators_follow_tree_order() {
        let f = fixture();
        let doc = &f.doc;

        let all: Vec<_> = doc.inclusive_descendants(NodeId::root()).collect();
        assert_eq!(
            all,
            [NodeId::root(), f.html, f.head, f.title, f.body, f.p, f.text, f.div]
        );

        let body: Vec<_> = doc.descendants(f.body).collect();
        assert_eq!(body, [f.p, f.text, f.div]);
        assert_eq!(doc.descendants(f.div).count(), 0);

        let ancestors: Vec<_> = doc.ancestors(f.text).collect();
        assert_eq!(ancestors, [f.p, f.body, f.html, NodeId::root()]);
        assert_eq!(doc.inclusive_ancestors(f.text).next(), Some(f.text));

        let following: Vec<_> = doc.following_nodes(f.title).collect();
        assert_eq!(following, [f.body, f.p, f.text, f.div]);

        let preceding: Vec<_> = doc.preceding_nodes(f.p).collect();
        assert_eq!(preceding, [f.body, f.title, f.head, f.html, NodeId::root()]);
        assert_eq!(doc.preceding_nodes(NodeId::root()).count(), 0);
    }

    #[test]
    fn order_is_consistent() {
        let f = fixture();
        let doc = &f.doc;
        let nodes: Vec<_> = doc.inclusive_descendants(NodeId::root()).collect();

        for (i, a) in nodes.iter().enumerate() {
            for (j, b) in nodes.iter().enumerate() {
                assert_eq!(doc.tree_order(*a, *b), Some(i.cmp(&j)));
                assert_eq!(doc.is_preceding(*a, *b), i < j);
                assert_eq!(doc.is_following(*a, *b), i > j);
                assert!(!(doc.is_preceding(*a, *b) && doc.is_following(*a, *b)));
            }
        }
    }

    #[test]
    fn relationships() {
        let f = fixture();
        let doc = &f.doc;

        assert!(doc.is_child_of(f.p, f.body));
        assert!(!doc.is_child_of(f.text, f.body));
        assert!(doc.is_descendant_of(f.text, f.html));
        assert!(!doc.is_descendant_of(f.html, f.html));
        assert!(doc.is_inclusive_descendant_of(f.html, f.html));
        assert!(doc.is_ancestor_of(f.body, f.text));
        assert!(doc.is_inclusive_ancestor_of(f.text, f.text));
        assert!(doc.is_sibling_of(f.p, f.div));
        assert!(!doc.is_sibling_of(f.p, f.p));
        assert!(doc.is_inclusive_sibling_of(f.p, f.p));
        assert!(!doc.is_sibling_of(NodeId::root(), NodeId::root()));
    }

    #[test]
    fn detached_nodes_are_their_own_tree() {
        let mut f = fixture();
        let lone = f.doc.create_element("span").unwrap();

        assert_eq!(f.doc.root(lone), lone);
        assert_eq!(f.doc.tree_order(lone, f.div), None);
        assert!(!f.doc.is_preceding(lone, f.div));
        assert!(!f.doc.is_following(lone, f.div));
        assert!(!f.doc.is_connected(lone));
        assert!(f.doc.is_connected(f.div));
        assert_eq!(f.doc.tree_order(f.div, f.div), Some(Ordering::Equal));
    }

    #[test]
    fn bounded_steps() {
        let f = fixture();
        let doc = &f.doc;

        assert_eq!(doc.following_within(f.text, f.p), None);
        assert_eq!(doc.following(f.text), Some(f.div));
        assert_eq!(doc.preceding_within(f.p, f.p), None);
        assert_eq!(doc.preceding(f.body), Some(f.title));
        assert_eq!(doc.last_inclusive_descendant(f.html), f.div);
    }

    #[test]
    fn shadow_including_relations() {
        let mut f = fixture();
        let shadow = f
            .doc
            .attach_shadow(f.div, ShadowRootInit::default())
            .unwrap();
        let inner = f.doc.create_element("span").unwrap();
        f.doc.append_child(shadow, inner).unwrap();
        let light = f.doc.create_element("b").unwrap();
        f.doc.append_child(f.div, light).unwrap();

        let doc = &f.doc;
        assert_eq!(doc.root(inner), shadow);
        assert_eq!(doc.shadow_including_root(inner), NodeId::root());
        assert_eq!(doc.containing_shadow_root(inner), Some(shadow));
        assert_eq!(doc.containing_shadow_root(light), None);
        assert!(doc.is_connected(inner));
        assert!(!doc.is_descendant_of(inner, f.div));
        assert!(doc.is_shadow_including_descendant_of(inner, f.div));
        assert!(doc.is_shadow_including_inclusive_ancestor_of(f.html, inner));
        assert!(doc.is_host_including_inclusive_ancestor_of(f.body, inner));

        let all = doc.shadow_including_inclusive_descendants(f.div);
        assert_eq!(all, [f.div, shadow, inner, light]);
    }
}
