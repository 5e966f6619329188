pub use gosub_dom::document::attributes::{AttributeChange, AttributeObserver};
pub use gosub_dom::document::builder::DocumentBuilderImpl;
pub use gosub_dom::document::query::DocumentQuery;
pub use gosub_dom::document::DocumentImpl;
pub use gosub_dom::errors::Error as DomError;
pub use gosub_dom::html_element::{HtmlElement, HtmlSlotElement};
pub use gosub_dom::node::data::fragment::{ShadowRootInit, ShadowRootMode, SlotAssignmentMode};
pub use gosub_dom::reflect::{reflect_get, reflect_set, ReflectKind, ReflectValue};
pub use gosub_dom::traversal::{FilterResult, NodeFilter, NodeIterator, TreeWalker, WhatToShow};
pub use gosub_dom::DocumentHandle;

pub use gosub_shared::node::NodeId;
pub use gosub_shared::ordered::{OrderedList, OrderedSet};
pub use gosub_shared::traits::document::Document;
pub use gosub_shared::traits::node::Node;
pub use gosub_shared::types::Result;
