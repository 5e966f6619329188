//! NodeIterator and TreeWalker.
//!
//! Both walk a live tree through a [`DocumentHandle`] and consult an optional [`NodeFilter`] for
//! every candidate node. The document is never borrowed while a filter runs, so filters are free to
//! read and change the tree.
//!
//! See: https://dom.spec.whatwg.org/#traversal

use crate::errors::Error;
use crate::DocumentHandle;
use gosub_shared::node::NodeId;
use gosub_shared::traits::document::Document;
use gosub_shared::traits::node::Node;
use gosub_shared::types::Result;
use std::cell::Cell;
use std::rc::Rc;

pub mod node_iterator;
pub mod tree_walker;

pub use node_iterator::NodeIterator;
pub use tree_walker::TreeWalker;

/// Outcome of filtering a single node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum FilterResult {
    Accept = 1,
    /// Excludes the node and, for tree walkers, its whole subtree
    Reject = 2,
    /// Excludes the node but not its children
    Skip = 3,
}

impl FilterResult {
    /// Coerces a numeric filter result. Unknown codes are treated as `Skip`.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => FilterResult::Accept,
            2 => FilterResult::Reject,
            _ => FilterResult::Skip,
        }
    }
}

/// Bitmask of node types an iterator or walker will show
pub struct WhatToShow;

impl WhatToShow {
    pub const ALL: u32 = 0xFFFF_FFFF;
    pub const SHOW_ELEMENT: u32 = 0x1;
    pub const SHOW_ATTRIBUTE: u32 = 0x2;
    pub const SHOW_TEXT: u32 = 0x4;
    pub const SHOW_CDATA_SECTION: u32 = 0x8;
    pub const SHOW_PROCESSING_INSTRUCTION: u32 = 0x40;
    pub const SHOW_COMMENT: u32 = 0x80;
    pub const SHOW_DOCUMENT: u32 = 0x100;
    pub const SHOW_DOCUMENT_TYPE: u32 = 0x200;
    pub const SHOW_DOCUMENT_FRAGMENT: u32 = 0x400;
}

/// User supplied filter. Errors are handed back to the caller of the traversal method unchanged.
pub trait NodeFilter {
    fn accept_node(&self, handle: &DocumentHandle, node_id: NodeId) -> Result<FilterResult>;
}

impl<F> NodeFilter for F
where
    F: Fn(&DocumentHandle, NodeId) -> Result<FilterResult>,
{
    fn accept_node(&self, handle: &DocumentHandle, node_id: NodeId) -> Result<FilterResult> {
        self(handle, node_id)
    }
}

/// Clears the active flag when the filter call ends, however it ends
struct ActiveGuard<'a>(&'a Cell<bool>);

impl<'a> ActiveGuard<'a> {
    fn set(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// State shared by node iterators and tree walkers for filtering
pub(crate) struct Traverser {
    pub handle: DocumentHandle,
    pub root: NodeId,
    pub what_to_show: u32,
    pub filter: Option<Rc<dyn NodeFilter>>,
    active: Cell<bool>,
}

impl Traverser {
    pub fn new(
        handle: DocumentHandle,
        root: NodeId,
        what_to_show: u32,
        filter: Option<Rc<dyn NodeFilter>>,
    ) -> Self {
        Self {
            handle,
            root,
            what_to_show,
            filter,
            active: Cell::new(false),
        }
    }

    /// Reads from the document, failing instead of panicking when it is mutably borrowed
    pub fn read<T>(&self, f: impl FnOnce(&crate::document::DocumentImpl) -> T) -> Result<T> {
        let doc = self.handle.try_get().map_err(|_| {
            Error::InvalidState("document is borrowed mutably during traversal".into())
        })?;
        Ok(f(&doc))
    }

    /// See: https://dom.spec.whatwg.org/#concept-node-filter
    pub fn filter(&self, node_id: NodeId) -> Result<FilterResult> {
        if self.active.get() {
            return Err(Error::InvalidState("a node filter is already running".into()).into());
        }

        let code = self.read(|doc| doc.node_by_id(node_id).map(|node| node.type_of().code()))?;
        let Some(code) = code else {
            return Err(Error::NotFound(format!("node {node_id} does not exist")).into());
        };

        let bit = 1_u32 << (code - 1);
        if self.what_to_show & bit == 0 {
            return Ok(FilterResult::Skip);
        }

        let Some(filter) = &self.filter else {
            return Ok(FilterResult::Accept);
        };

        let _guard = ActiveGuard::set(&self.active);
        filter.accept_node(&self.handle, node_id)
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}
