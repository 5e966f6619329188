//! Reflection of content attributes as typed properties.
//!
//! Every element property that mirrors an attribute goes through [`reflect_get`] and
//! [`reflect_set`], so the conversion rules live in one place.
//!
//! See: https://html.spec.whatwg.org/multipage/common-dom-interfaces.html#reflecting-content-attributes-in-idl-attributes

use crate::document::DocumentImpl;
use crate::errors::Error;
use gosub_config::config;
use gosub_shared::node::NodeId;
use gosub_shared::traits::document::Document;
use gosub_shared::traits::node::Node;
use gosub_shared::types::Result;
use log::warn;

/// How an attribute is exposed as a property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflectKind {
    /// Presence of the attribute
    Boolean,
    /// Value of the attribute, empty when absent
    DomString,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflectValue {
    Boolean(bool),
    DomString(String),
}

impl ReflectValue {
    pub fn kind(&self) -> ReflectKind {
        match self {
            ReflectValue::Boolean(_) => ReflectKind::Boolean,
            ReflectValue::DomString(_) => ReflectKind::DomString,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ReflectValue::Boolean(value) => Some(*value),
            ReflectValue::DomString(_) => None,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            ReflectValue::DomString(value) => Some(value),
            ReflectValue::Boolean(_) => None,
        }
    }
}

fn ensure_element(doc: &DocumentImpl, node_id: NodeId, name: &str) -> Result<()> {
    if doc.node_by_id(node_id).is_some_and(|node| node.is_element_node()) {
        return Ok(());
    }

    if config!(bool "dom.reflection.warn_on_non_element") {
        warn!("reflect: cannot reflect attribute {name} on node {node_id}, not an element");
    }
    Err(Error::InvalidNodeType(format!("node {node_id} is not an element")).into())
}

/// Reads the attribute `name` of the element as a property of the given kind
pub fn reflect_get(
    doc: &DocumentImpl,
    kind: ReflectKind,
    node_id: NodeId,
    name: &str,
) -> Result<ReflectValue> {
    ensure_element(doc, node_id, name)?;

    let value = doc.get_attribute(node_id, name);
    Ok(match kind {
        ReflectKind::Boolean => ReflectValue::Boolean(value.is_some()),
        ReflectKind::DomString => ReflectValue::DomString(value.unwrap_or_default().to_owned()),
    })
}

/// Writes a property back to the attribute `name`. A `false` boolean removes the attribute.
pub fn reflect_set(
    doc: &mut DocumentImpl,
    node_id: NodeId,
    name: &str,
    value: ReflectValue,
) -> Result<()> {
    ensure_element(doc, node_id, name)?;

    match value {
        ReflectValue::Boolean(true) => doc.set_attribute(node_id, name, ""),
        ReflectValue::Boolean(false) => doc.remove_attribute(node_id, name),
        ReflectValue::DomString(value) => doc.set_attribute(node_id, name, &value),
    }
}
