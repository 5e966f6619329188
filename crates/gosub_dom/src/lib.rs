//! DOM tree for the Gosub engine
//!
//! Nodes live in an arena owned by [`document::DocumentImpl`] and are addressed by
//! [`gosub_shared::node::NodeId`]. On top of the tree this crate implements the DOM mutation
//! algorithms, NodeIterator/TreeWalker traversal, shadow roots with slot assignment, attribute
//! reflection and selector queries.

pub mod document;
pub mod errors;
pub mod html_element;
pub mod node;
pub mod reflect;
pub mod slots;
pub mod traversal;

use crate::document::DocumentImpl;

/// Shared handle to a document, used by everything that outlives a single borrow such as node
/// iterators and element wrappers
pub type DocumentHandle = gosub_shared::document::DocumentHandle<DocumentImpl>;
