use crate::document::DocumentImpl;
use crate::traversal::{FilterResult, NodeFilter, Traverser};
use crate::DocumentHandle;
use gosub_shared::node::NodeId;
use gosub_shared::types::Result;
use std::cell::Cell;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// Walks the subtree of a root with a freely movable cursor. A rejected node hides its whole
/// subtree, a skipped node only itself.
pub struct TreeWalker {
    traverser: Traverser,
    current: Cell<NodeId>,
}

#[derive(Clone, Copy, PartialEq)]
enum Side {
    First,
    Last,
}

#[derive(Clone, Copy, PartialEq)]
enum Direction {
    Next,
    Previous,
}

impl TreeWalker {
    pub fn new(
        handle: &DocumentHandle,
        root: NodeId,
        what_to_show: u32,
        filter: Option<Rc<dyn NodeFilter>>,
    ) -> Result<Self> {
        let walker = Self {
            traverser: Traverser::new(handle.clone(), root, what_to_show, filter),
            current: Cell::new(root),
        };
        walker.read(|doc| doc.existing(root).map(|_| ()))??;

        Ok(walker)
    }

    pub fn root(&self) -> NodeId {
        self.traverser.root
    }

    pub fn what_to_show(&self) -> u32 {
        self.traverser.what_to_show
    }

    pub fn filter(&self) -> Option<Rc<dyn NodeFilter>> {
        self.traverser.filter.clone()
    }

    pub fn current_node(&self) -> NodeId {
        self.current.get()
    }

    /// Moves the cursor to any node, also outside the root
    pub fn set_current_node(&self, node_id: NodeId) -> Result<()> {
        self.read(|doc| doc.existing(node_id).map(|_| ()))??;
        self.current.set(node_id);
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&DocumentImpl) -> T) -> Result<T> {
        self.traverser.read(f)
    }

    fn accept(&self, node_id: NodeId) -> Option<NodeId> {
        self.current.set(node_id);
        Some(node_id)
    }

    pub fn parent_node(&self) -> Result<Option<NodeId>> {
        let root = self.root();
        let mut node = self.current.get();

        while node != root {
            match self.read(|doc| doc.parent(node))? {
                Some(parent) => node = parent,
                None => return Ok(None),
            }
            if self.traverser.filter(node)? == FilterResult::Accept {
                return Ok(self.accept(node));
            }
        }

        Ok(None)
    }

    pub fn first_child(&self) -> Result<Option<NodeId>> {
        self.traverse_children(Side::First)
    }

    pub fn last_child(&self) -> Result<Option<NodeId>> {
        self.traverse_children(Side::Last)
    }

    pub fn next_sibling(&self) -> Result<Option<NodeId>> {
        self.traverse_siblings(Direction::Next)
    }

    pub fn previous_sibling(&self) -> Result<Option<NodeId>> {
        self.traverse_siblings(Direction::Previous)
    }

    /// See: https://dom.spec.whatwg.org/#concept-traverse-children
    fn traverse_children(&self, side: Side) -> Result<Option<NodeId>> {
        let root = self.root();
        let current = self.current.get();
        let child_of = |doc: &DocumentImpl, n: NodeId| match side {
            Side::First => doc.first_child(n),
            Side::Last => doc.last_child(n),
        };
        let sibling_of = |doc: &DocumentImpl, n: NodeId| match side {
            Side::First => doc.next_sibling(n),
            Side::Last => doc.previous_sibling(n),
        };

        let mut node = self.read(|doc| child_of(doc, current))?;
        'outer: while let Some(mut n) = node {
            let result = self.traverser.filter(n)?;
            if result == FilterResult::Accept {
                return Ok(self.accept(n));
            }
            if result == FilterResult::Skip {
                if let Some(child) = self.read(|doc| child_of(doc, n))? {
                    node = Some(child);
                    continue;
                }
            }

            loop {
                if let Some(sibling) = self.read(|doc| sibling_of(doc, n))? {
                    node = Some(sibling);
                    continue 'outer;
                }
                match self.read(|doc| doc.parent(n))? {
                    Some(parent) if parent != root && parent != current => n = parent,
                    _ => return Ok(None),
                }
            }
        }

        Ok(None)
    }

    /// See: https://dom.spec.whatwg.org/#concept-traverse-siblings
    fn traverse_siblings(&self, direction: Direction) -> Result<Option<NodeId>> {
        let root = self.root();
        let mut node = self.current.get();
        if node == root {
            return Ok(None);
        }

        let sibling_of = |doc: &DocumentImpl, n: NodeId| match direction {
            Direction::Next => doc.next_sibling(n),
            Direction::Previous => doc.previous_sibling(n),
        };
        let child_of = |doc: &DocumentImpl, n: NodeId| match direction {
            Direction::Next => doc.first_child(n),
            Direction::Previous => doc.last_child(n),
        };

        loop {
            let mut sibling = self.read(|doc| sibling_of(doc, node))?;
            while let Some(s) = sibling {
                node = s;
                let result = self.traverser.filter(node)?;
                if result == FilterResult::Accept {
                    return Ok(self.accept(node));
                }

                sibling = self.read(|doc| child_of(doc, node))?;
                if result == FilterResult::Reject || sibling.is_none() {
                    sibling = self.read(|doc| sibling_of(doc, node))?;
                }
            }

            match self.read(|doc| doc.parent(node))? {
                Some(parent) if parent != root => node = parent,
                _ => return Ok(None),
            }
            if self.traverser.filter(node)? == FilterResult::Accept {
                return Ok(None);
            }
        }
    }

    /// See: https://dom.spec.whatwg.org/#dom-treewalker-previousnode
    pub fn previous_node(&self) -> Result<Option<NodeId>> {
        let root = self.root();
        let mut node = self.current.get();

        while node != root {
            let mut sibling = self.read(|doc| doc.previous_sibling(node))?;
            while let Some(s) = sibling {
                node = s;
                let mut result = self.traverser.filter(node)?;
                while result != FilterResult::Reject {
                    let Some(child) = self.read(|doc| doc.last_child(node))? else {
                        break;
                    };
                    node = child;
                    result = self.traverser.filter(node)?;
                }
                if result == FilterResult::Accept {
                    return Ok(self.accept(node));
                }
                sibling = self.read(|doc| doc.previous_sibling(node))?;
            }

            if node == root {
                return Ok(None);
            }
            match self.read(|doc| doc.parent(node))? {
                Some(parent) => node = parent,
                None => return Ok(None),
            }
            if self.traverser.filter(node)? == FilterResult::Accept {
                return Ok(self.accept(node));
            }
        }

        Ok(None)
    }

    /// See: https://dom.spec.whatwg.org/#dom-treewalker-nextnode
    pub fn next_node(&self) -> Result<Option<NodeId>> {
        let root = self.root();
        let mut node = self.current.get();
        let mut result = FilterResult::Accept;

        loop {
            while result != FilterResult::Reject {
                let Some(child) = self.read(|doc| doc.first_child(node))? else {
                    break;
                };
                node = child;
                result = self.traverser.filter(node)?;
                if result == FilterResult::Accept {
                    return Ok(self.accept(node));
                }
            }

            let mut temporary = node;
            let sibling = loop {
                if temporary == root {
                    return Ok(None);
                }
                if let Some(sibling) = self.read(|doc| doc.next_sibling(temporary))? {
                    break sibling;
                }
                match self.read(|doc| doc.parent(temporary))? {
                    Some(parent) => temporary = parent,
                    None => return Ok(None),
                }
            };

            node = sibling;
            result = self.traverser.filter(node)?;
            if result == FilterResult::Accept {
                return Ok(self.accept(node));
            }
        }
    }
}

impl Debug for TreeWalker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("TreeWalker");
        debug.field("root", &self.root());
        debug.field("current", &self.current_node());
        debug.field("what_to_show", &self.what_to_show());
        debug.finish_non_exhaustive()
    }
}
