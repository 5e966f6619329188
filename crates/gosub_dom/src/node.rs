pub use gosub_shared::traits::node::{
    HTML_NAMESPACE, MATHML_NAMESPACE, SVG_NAMESPACE, XLINK_NAMESPACE, XMLNS_NAMESPACE,
    XML_NAMESPACE,
};

pub mod arena;
pub mod data;
pub mod elements;
pub(crate) mod internals;
pub mod node_impl;
