use crate::errors::Error;
use crate::traversal::{FilterResult, NodeFilter, Traverser};
use crate::DocumentHandle;
use gosub_shared::node::NodeId;
use gosub_shared::types::Result;
use std::fmt::{Debug, Formatter};
use std::rc::{Rc, Weak};

/// Key of a live node iterator in the table of its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIteratorId(usize);

impl From<usize> for NodeIteratorId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

/// Cursor of a node iterator. It lives in the document so node removals can move it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct NodeIteratorState {
    pub root: NodeId,
    pub reference: NodeId,
    pub pointer_before_reference: bool,
}

/// Entry in the iterator table of a document. Entries whose iterator is gone are swept before
/// node removals run.
pub(crate) struct RegisteredIterator {
    pub state: NodeIteratorState,
    owner: Weak<()>,
}

impl RegisteredIterator {
    pub fn is_live(&self) -> bool {
        self.owner.strong_count() > 0
    }
}

struct Inner {
    id: NodeIteratorId,
    traverser: Traverser,
    _alive: Rc<()>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Ok(mut doc) = self.traverser.handle.try_get_mut() {
            doc.node_iterators.remove(&self.id);
        }
    }
}

/// Iterates the inclusive descendants of a root in tree order. The iterator stays valid while the
/// tree changes: removing the node under the cursor moves the cursor out of the removed subtree.
/// Cloning yields another handle to the same iterator.
#[derive(Clone)]
pub struct NodeIterator {
    inner: Rc<Inner>,
}

#[derive(Clone, Copy, PartialEq)]
enum Direction {
    Next,
    Previous,
}

impl NodeIterator {
    pub fn new(
        handle: &DocumentHandle,
        root: NodeId,
        what_to_show: u32,
        filter: Option<Rc<dyn NodeFilter>>,
    ) -> Result<Self> {
        let alive = Rc::new(());
        let id = {
            let mut doc = handle.try_get_mut().map_err(|_| {
                Error::InvalidState("document is borrowed while creating a node iterator".into())
            })?;
            doc.existing(root)?;
            doc.sweep_node_iterators();

            let id = doc.next_iterator_id();
            doc.node_iterators.insert(
                id,
                RegisteredIterator {
                    state: NodeIteratorState {
                        root,
                        reference: root,
                        pointer_before_reference: true,
                    },
                    owner: Rc::downgrade(&alive),
                },
            );
            id
        };

        Ok(Self {
            inner: Rc::new(Inner {
                id,
                traverser: Traverser::new(handle.clone(), root, what_to_show, filter),
                _alive: alive,
            }),
        })
    }

    pub fn root(&self) -> NodeId {
        self.inner.traverser.root
    }

    pub fn what_to_show(&self) -> u32 {
        self.inner.traverser.what_to_show
    }

    pub fn filter(&self) -> Option<Rc<dyn NodeFilter>> {
        self.inner.traverser.filter.clone()
    }

    fn state(&self) -> Result<NodeIteratorState> {
        let id = self.inner.id;
        let root = self.root();
        self.inner.traverser.read(|doc| {
            doc.node_iterators.get(&id).map(|entry| entry.state).unwrap_or(NodeIteratorState {
                root,
                reference: root,
                pointer_before_reference: true,
            })
        })
    }

    pub fn reference_node(&self) -> Result<NodeId> {
        Ok(self.state()?.reference)
    }

    pub fn pointer_before_reference(&self) -> Result<bool> {
        Ok(self.state()?.pointer_before_reference)
    }

    pub fn next_node(&self) -> Result<Option<NodeId>> {
        self.traverse(Direction::Next)
    }

    pub fn previous_node(&self) -> Result<Option<NodeId>> {
        self.traverse(Direction::Previous)
    }

    /// Does nothing, iterators are released when the last handle is dropped
    pub fn detach(&self) {}

    /// See: https://dom.spec.whatwg.org/#concept-nodeiterator-traverse
    fn traverse(&self, direction: Direction) -> Result<Option<NodeId>> {
        let traverser = &self.inner.traverser;
        let state = self.state()?;
        let root = state.root;
        let mut node = state.reference;
        let mut before_node = state.pointer_before_reference;

        loop {
            match direction {
                Direction::Next => {
                    if before_node {
                        before_node = false;
                    } else {
                        match traverser.read(|doc| doc.following_within(node, root))? {
                            Some(following) => node = following,
                            None => return Ok(None),
                        }
                    }
                }
                Direction::Previous => {
                    if before_node {
                        match traverser.read(|doc| doc.preceding_within(node, root))? {
                            Some(preceding) => node = preceding,
                            None => return Ok(None),
                        }
                    } else {
                        before_node = true;
                    }
                }
            }

            if traverser.filter(node)? == FilterResult::Accept {
                break;
            }
        }

        let mut doc = traverser.handle.try_get_mut().map_err(|_| {
            Error::InvalidState("document is borrowed while moving a node iterator".into())
        })?;
        if let Some(entry) = doc.node_iterators.get_mut(&self.inner.id) {
            entry.state = NodeIteratorState {
                root,
                reference: node,
                pointer_before_reference: before_node,
            };
        }

        Ok(Some(node))
    }
}

impl Debug for NodeIterator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("NodeIterator");
        debug.field("id", &self.inner.id);
        debug.field("root", &self.root());
        debug.field("what_to_show", &self.what_to_show());
        debug.finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::builder::DocumentBuilderImpl;
    use crate::traversal::WhatToShow;
    use gosub_shared::traits::document::Document;
    use gosub_shared::traits::node::{ElementDataType, Node};
    use std::cell::{Cell, RefCell};

    /// div > [a > [a1, a2], b, c > [c1]]
    fn tree(handle: &DocumentHandle) -> Vec<NodeId> {
        let mut doc = handle.get_mut();
        let names = ["div", "a", "a1", "a2", "b", "c", "c1"];
        let ids: Vec<_> = names
            .iter()
            .map(|name| doc.create_element(name).unwrap())
            .collect();

        doc.append_child(NodeId::root(), ids[0]).unwrap();
        for (parent, child) in [(0, 1), (1, 2), (1, 3), (0, 4), (0, 5), (5, 6)] {
            doc.append_child(ids[parent], ids[child]).unwrap();
        }
        ids
    }

    fn collect(iterator: &NodeIterator) -> Vec<NodeId> {
        std::iter::from_fn(|| iterator.next_node().unwrap()).collect()
    }

    fn name_of(handle: &DocumentHandle, node_id: NodeId) -> String {
        handle
            .get()
            .node_by_id(node_id)
            .and_then(|node| node.get_element_data())
            .map(|data| data.name().to_string())
            .unwrap_or_default()
    }

    #[test]
    fn walks_inclusive_descendants() {
        let handle = DocumentBuilderImpl::new_document();
        let ids = tree(&handle);
        let iterator = NodeIterator::new(&handle, ids[0], WhatToShow::ALL, None).unwrap();

        assert_eq!(collect(&iterator), ids);
        assert_eq!(iterator.reference_node().unwrap(), ids[6]);
        assert!(!iterator.pointer_before_reference().unwrap());

        // walking back returns the same nodes, starting with the last one returned
        let back: Vec<_> = std::iter::from_fn(|| iterator.previous_node().unwrap()).collect();
        let mut expected = ids.clone();
        expected.reverse();
        assert_eq!(back, expected);
        assert_eq!(iterator.previous_node().unwrap(), None);
    }

    #[test]
    fn skip_and_reject_are_the_same() {
        let handle = DocumentBuilderImpl::new_document();
        let ids = tree(&handle);
        let a = ids[1];
        let filter: Rc<dyn NodeFilter> =
            Rc::new(move |_: &DocumentHandle, node_id: NodeId| -> Result<FilterResult> {
                Ok(if node_id == a {
                    FilterResult::Reject
                } else {
                    FilterResult::Accept
                })
            });

        let iterator = NodeIterator::new(&handle, ids[0], WhatToShow::ALL, Some(filter)).unwrap();
        let names: Vec<_> = collect(&iterator)
            .into_iter()
            .map(|id| name_of(&handle, id))
            .collect();
        assert_eq!(names, ["div", "a1", "a2", "b", "c", "c1"]);
    }

    #[test]
    fn what_to_show_elements_only() {
        let handle = DocumentBuilderImpl::new_document();
        let ids = tree(&handle);
        let text = handle.get_mut().create_text_node("t");
        handle.get_mut().append_child(ids[4], text).unwrap();

        let all = NodeIterator::new(&handle, ids[0], WhatToShow::ALL, None).unwrap();
        assert!(collect(&all).contains(&text));

        let elements = NodeIterator::new(&handle, ids[0], WhatToShow::SHOW_ELEMENT, None).unwrap();
        assert_eq!(collect(&elements), ids);
    }

    #[test]
    fn removal_moves_the_reference_backwards() {
        let handle = DocumentBuilderImpl::new_document();
        let ids = tree(&handle);
        let iterator = NodeIterator::new(&handle, ids[0], WhatToShow::ALL, None).unwrap();

        // div, a, a1
        for _ in 0..3 {
            iterator.next_node().unwrap();
        }
        assert_eq!(iterator.reference_node().unwrap(), ids[2]);

        // remove a, which contains the reference
        handle.get_mut().remove(ids[1]).unwrap();
        assert_eq!(iterator.reference_node().unwrap(), ids[0]);
        assert!(!iterator.pointer_before_reference().unwrap());

        assert_eq!(iterator.next_node().unwrap(), Some(ids[4]));
    }

    #[test]
    fn removal_moves_a_before_pointer_forward() {
        let handle = DocumentBuilderImpl::new_document();
        let ids = tree(&handle);
        let iterator = NodeIterator::new(&handle, ids[0], WhatToShow::ALL, None).unwrap();

        // div, a, a1, a2 and back: the cursor is before a2
        for _ in 0..4 {
            iterator.next_node().unwrap();
        }
        assert_eq!(iterator.previous_node().unwrap(), Some(ids[3]));
        assert!(iterator.pointer_before_reference().unwrap());

        handle.get_mut().remove(ids[1]).unwrap();
        assert_eq!(iterator.reference_node().unwrap(), ids[4]);
        assert!(iterator.pointer_before_reference().unwrap());
        assert_eq!(iterator.next_node().unwrap(), Some(ids[4]));
    }

    #[test]
    fn before_pointer_without_following_node() {
        let handle = DocumentBuilderImpl::new_document();
        let ids = tree(&handle);
        let iterator = NodeIterator::new(&handle, ids[0], WhatToShow::ALL, None).unwrap();

        while iterator.next_node().unwrap().is_some() {}
        assert_eq!(iterator.previous_node().unwrap(), Some(ids[6]));
        assert!(iterator.pointer_before_reference().unwrap());

        // c is the last subtree of the root, nothing follows it
        handle.get_mut().remove(ids[5]).unwrap();
        assert_eq!(iterator.reference_node().unwrap(), ids[4]);
        assert!(!iterator.pointer_before_reference().unwrap());
        assert_eq!(iterator.next_node().unwrap(), None);
        assert_eq!(iterator.previous_node().unwrap(), Some(ids[4]));
    }

    #[test]
    fn removing_unrelated_nodes_and_the_root() {
        let handle = DocumentBuilderImpl::new_document();
        let ids = tree(&handle);
        let iterator = NodeIterator::new(&handle, ids[1], WhatToShow::ALL, None).unwrap();
        iterator.next_node().unwrap();
        iterator.next_node().unwrap();

        handle.get_mut().remove(ids[5]).unwrap();
        assert_eq!(iterator.reference_node().unwrap(), ids[2]);

        // the root may be removed, the iterator keeps walking its subtree
        handle.get_mut().remove(ids[1]).unwrap();
        assert_eq!(iterator.reference_node().unwrap(), ids[2]);
        assert_eq!(iterator.next_node().unwrap(), Some(ids[3]));
    }

    #[test]
    fn removing_an_ancestor_of_the_root_keeps_the_cursor_inside() {
        let handle = DocumentBuilderImpl::new_document();
        let ids = tree(&handle);
        let a1 = ids[2];
        let iterator = NodeIterator::new(&handle, a1, WhatToShow::ALL, None).unwrap();
        assert_eq!(iterator.next_node().unwrap(), Some(a1));
        assert_eq!(iterator.previous_node().unwrap(), Some(a1));
        assert!(iterator.pointer_before_reference().unwrap());

        // `a` has a following sibling `b`, which lies outside the iterated subtree
        handle.get_mut().remove(ids[1]).unwrap();

        assert_eq!(iterator.reference_node().unwrap(), a1);
        assert!(iterator.pointer_before_reference().unwrap());
        assert_eq!(iterator.next_node().unwrap(), Some(a1));
        assert_eq!(iterator.next_node().unwrap(), None);
    }

    #[test]
    fn iterators_dropped_during_a_borrow_are_swept() {
        let handle = DocumentBuilderImpl::new_document();
        let ids = tree(&handle);

        let iterator = NodeIterator::new(&handle, ids[0], WhatToShow::ALL, None).unwrap();
        {
            let _doc = handle.get();
            drop(iterator);
        }
        assert_eq!(handle.get().node_iterators.len(), 1);

        handle.get_mut().remove(ids[4]).unwrap();
        assert!(handle.get().node_iterators.is_empty());
    }

    #[test]
    fn dropping_unregisters() {
        let handle = DocumentBuilderImpl::new_document();
        let ids = tree(&handle);

        let iterator = NodeIterator::new(&handle, ids[0], WhatToShow::ALL, None).unwrap();
        let clone = iterator.clone();
        assert_eq!(handle.get().node_iterators.len(), 1);

        drop(iterator);
        assert_eq!(handle.get().node_iterators.len(), 1);
        clone.detach();
        drop(clone);
        assert!(handle.get().node_iterators.is_empty());
    }

    #[test]
    fn re_entrant_filter_is_rejected() {
        let handle = DocumentBuilderImpl::new_document();
        let ids = tree(&handle);

        let slot: Rc<RefCell<Option<NodeIterator>>> = Rc::new(RefCell::new(None));
        let calls = Rc::new(Cell::new(0));

        let inner = Rc::clone(&slot);
        let counter = Rc::clone(&calls);
        let filter: Rc<dyn NodeFilter> =
            Rc::new(move |_: &DocumentHandle, _: NodeId| -> Result<FilterResult> {
                counter.set(counter.get() + 1);
                if counter.get() == 1 {
                    if let Some(iterator) = inner.borrow().as_ref() {
                        iterator.next_node()?;
                    }
                }
                Ok(FilterResult::Accept)
            });

        let iterator = NodeIterator::new(&handle, ids[0], WhatToShow::ALL, Some(filter)).unwrap();
        *slot.borrow_mut() = Some(iterator.clone());

        let err = iterator.next_node().unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidState(_))));

        // the flag is cleared again and the cursor did not move
        assert_eq!(iterator.reference_node().unwrap(), ids[0]);
        assert_eq!(iterator.next_node().unwrap(), Some(ids[0]));
        assert_eq!(iterator.next_node().unwrap(), Some(ids[1]));

        slot.borrow_mut().take();
    }

    #[test]
    fn filters_may_mutate_the_tree() {
        let handle = DocumentBuilderImpl::new_document();
        let ids = tree(&handle);
        let b = ids[4];

        let filter: Rc<dyn NodeFilter> =
            Rc::new(move |handle: &DocumentHandle, node_id: NodeId| -> Result<FilterResult> {
                if node_id == b {
                    handle.get_mut().set_attribute(node_id, "seen", "")?;
                }
                Ok(FilterResult::Accept)
            });

        let iterator = NodeIterator::new(&handle, ids[0], WhatToShow::ALL, Some(filter)).unwrap();
        assert_eq!(collect(&iterator).len(), ids.len());
        assert!(handle.get().has_attribute(b, "seen"));
    }
}
