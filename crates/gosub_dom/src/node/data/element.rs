use crate::node::elements::ElementInterface;
use crate::node::HTML_NAMESPACE;
use core::fmt::{Debug, Formatter};
use gosub_shared::node::NodeId;
use gosub_shared::ordered::{OrderedList, OrderedSet};
use gosub_shared::traits::node::{ClassList, ElementDataType};
use std::fmt;

/// Class names of an element, in the order of the `class` attribute. This is a read-only view
/// that is rebuilt whenever the attribute changes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassListImpl {
    classes: OrderedSet<String>,
}

impl ClassListImpl {
    /// Initialise a new (empty) ClassList
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }
}

impl ClassList for ClassListImpl {
    fn contains(&self, name: &str) -> bool {
        self.classes.iter().any(|class| class == name)
    }

    fn len(&self) -> usize {
        self.classes.len()
    }

    fn as_vec(&self) -> Vec<String> {
        self.classes.as_slice().to_vec()
    }
}

/// Initialize a class list from a space-delimited class string. Duplicates are dropped.
impl From<&str> for ClassListImpl {
    fn from(class_string: &str) -> Self {
        Self {
            classes: class_string
                .split_ascii_whitespace()
                .map(str::to_owned)
                .collect(),
        }
    }
}

/// A content attribute. Attributes are owned by their element and never part of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Attr {
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub local_name: String,
    pub value: String,
    /// Element the attribute belongs to
    pub owner: Option<NodeId>,
}

impl Attr {
    #[must_use]
    pub fn new(local_name: &str, value: &str) -> Self {
        Self {
            namespace: None,
            prefix: None,
            local_name: local_name.to_owned(),
            value: value.to_owned(),
            owner: None,
        }
    }

    /// `prefix:local_name`, or the local name when there is no prefix
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local_name),
            None => self.local_name.clone(),
        }
    }

    fn has_qualified_name(&self, name: &str) -> bool {
        match &self.prefix {
            Some(prefix) => name
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix(':'))
                .is_some_and(|local| local == self.local_name),
            None => self.local_name == name,
        }
    }

    fn has_key(&self, namespace: Option<&str>, local_name: &str) -> bool {
        self.namespace.as_deref() == namespace && self.local_name == local_name
    }
}

/// Attributes of an element in insertion order, unique per (namespace, local name)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttrList {
    attrs: OrderedList<Attr>,
}

impl AttrList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attr> {
        self.attrs.iter()
    }

    /// Attribute at the given position, in insertion order
    pub fn item(&self, index: usize) -> Option<&Attr> {
        self.attrs.get(index)
    }

    /// First attribute whose qualified name equals `name`
    pub fn get(&self, name: &str) -> Option<&Attr> {
        self.attrs.iter().find(|attr| attr.has_qualified_name(name))
    }

    pub fn get_ns(&self, namespace: Option<&str>, local_name: &str) -> Option<&Attr> {
        self.attrs
            .iter()
            .find(|attr| attr.has_key(namespace, local_name))
    }

    /// Stores the attribute, replacing the one with the same namespace and local name in place.
    /// Returns the previous value.
    pub(crate) fn set(&mut self, attr: Attr) -> Option<String> {
        let old = self
            .get_ns(attr.namespace.as_deref(), &attr.local_name)
            .map(|existing| existing.value.clone());

        match old {
            Some(_) => {
                let (namespace, local_name) = (attr.namespace.clone(), attr.local_name.clone());
                self.attrs
                    .replace_where(|a| a.has_key(namespace.as_deref(), &local_name), attr);
            }
            None => self.attrs.append(attr),
        }

        old
    }

    /// Removes the first attribute with the given qualified name
    pub(crate) fn remove(&mut self, name: &str) -> Option<Attr> {
        let attr = self.get(name)?.clone();
        self.remove_ns(attr.namespace.as_deref(), &attr.local_name)
    }

    pub(crate) fn remove_ns(&mut self, namespace: Option<&str>, local_name: &str) -> Option<Attr> {
        self.attrs
            .remove_where(|attr| attr.has_key(namespace, local_name))
            .into_iter()
            .next()
            .map(|(_, attr)| attr)
    }
}

/// Data structure for element nodes
#[derive(PartialEq, Clone)]
pub struct ElementData {
    /// Local name of the element (e.g., div)
    pub name: String,
    /// Namespace of the element, `None` is the HTML namespace
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    /// Element's attributes. Changes must go through the document so ids, classes and slots stay
    /// in sync.
    pub(crate) attributes: AttrList,
    /// CSS list of classes
    pub(crate) class_list: ClassListImpl,
    /// Shadow root attached to this element
    pub shadow_root: Option<NodeId>,
    /// Contents of a `<template>` element
    pub template_contents: Option<NodeId>,
    /// Interface that governs this element
    pub interface: ElementInterface,
}

impl Debug for ElementData {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("ElementData");
        debug.field("name", &self.name);
        debug.field("attributes", &self.attributes);
        debug.field("classes", &self.class_list);
        debug.finish_non_exhaustive()
    }
}

impl ElementDataType for ElementData {
    type ClassList = ClassListImpl;

    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or(HTML_NAMESPACE)
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|attr| attr.value.as_str())
    }

    fn classlist(&self) -> &ClassListImpl {
        &self.class_list
    }
}

impl ElementData {
    pub(crate) fn new(name: &str, namespace: Option<&str>, prefix: Option<&str>) -> Self {
        let namespace = namespace.filter(|ns| *ns != HTML_NAMESPACE);

        Self {
            name: name.into(),
            namespace: namespace.map(str::to_owned),
            prefix: prefix.map(str::to_owned),
            attributes: AttrList::new(),
            class_list: ClassListImpl::new(),
            shadow_root: None,
            template_contents: None,
            interface: ElementInterface::resolve(namespace, name),
        }
    }

    pub fn attributes(&self) -> &AttrList {
        &self.attributes
    }

    /// Element name as shown to authors: uppercased for HTML elements
    pub fn tag_name(&self) -> String {
        let qualified = match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.name),
            None => self.name.clone(),
        };

        if self.namespace.is_none() {
            qualified.to_ascii_uppercase()
        } else {
            qualified
        }
    }

    pub fn is_html(&self) -> bool {
        self.namespace.is_none()
    }

    /// `<slot>` in the HTML namespace
    pub fn is_slot(&self) -> bool {
        self.interface == ElementInterface::HtmlSlotElement
    }
}
