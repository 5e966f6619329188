//! Gosub DOM core
//!
//! Re-exports the DOM workspace: the node tree and its mutation algorithms, NodeIterator and
//! TreeWalker, shadow roots with slot assignment, attribute reflection and CSS selector queries.
//! Most users only need the [`prelude`].

pub mod prelude;

pub use gosub_config as config;
pub use gosub_css3 as css3;
pub use gosub_dom as dom;
pub use gosub_shared as shared;

pub use gosub_dom::document::builder::DocumentBuilderImpl;
pub use gosub_dom::document::query::DocumentQuery;
pub use gosub_dom::document::DocumentImpl;
pub use gosub_dom::DocumentHandle;
pub use gosub_shared::node::NodeId;
pub use gosub_shared::ordered::{OrderedList, OrderedSet};
