use crate::document::attributes::AttributeObserver;
use crate::errors::Error;
use crate::node::arena::NodeArena;
use crate::node::data::character::CharacterData;
use crate::node::data::doctype::DocTypeData;
use crate::node::data::element::ElementData;
use crate::node::data::fragment::DocumentFragmentData;
use crate::node::node_impl::{NodeDataTypeInternal, NodeImpl};
use crate::node::{HTML_NAMESPACE, XMLNS_NAMESPACE, XML_NAMESPACE};
use crate::traversal::node_iterator::{NodeIteratorId, RegisteredIterator};
use cow_utils::CowUtils;
use gosub_shared::node::NodeId;
use gosub_shared::ordered::OrderedSet;
use gosub_shared::traits::document::Document;
use gosub_shared::traits::node::Node;
use gosub_shared::types::Result;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

/// Defines a document. The document owns every node created for it, attached or not.
pub struct DocumentImpl {
    /// Holds and owns all nodes in the document
    pub(crate) arena: NodeArena,
    /// Elements per value of their `id` attribute
    pub(crate) named_id_elements: HashMap<String, OrderedSet<NodeId>>,
    /// Cursor state of the live node iterators created for this document
    pub(crate) node_iterators: BTreeMap<NodeIteratorId, RegisteredIterator>,
    next_iterator_id: usize,
    /// Slots waiting for a slotchange notification
    pub(crate) slot_change_signals: OrderedSet<NodeId>,
    pub(crate) attribute_observers: Vec<Rc<dyn AttributeObserver>>,
}

impl Debug for DocumentImpl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("DocumentImpl");
        debug.field("nodes", &self.arena.node_count());
        debug.field("node_iterators", &self.node_iterators.len());
        debug.field("slot_change_signals", &self.slot_change_signals);
        debug.finish_non_exhaustive()
    }
}

impl Document for DocumentImpl {
    type Node = NodeImpl;

    /// Fetches a node by id or returns None when no node with this ID is found
    fn node_by_id(&self, node_id: NodeId) -> Option<&NodeImpl> {
        self.arena.node_ref(node_id)
    }
}

impl Default for DocumentImpl {
    fn default() -> Self {
        Self::new("text/html")
    }
}

impl DocumentImpl {
    /// Creates a new document with only the document node
    #[must_use]
    pub fn new(content_type: &str) -> Self {
        let mut doc = Self {
            arena: NodeArena::new(),
            named_id_elements: HashMap::new(),
            node_iterators: BTreeMap::new(),
            next_iterator_id: 0,
            slot_change_signals: OrderedSet::new(),
            attribute_observers: Vec::new(),
        };
        doc.arena.register_node(NodeImpl::new_document(content_type));

        doc
    }

    /// HTML documents lowercase element and attribute names
    pub fn is_html(&self) -> bool {
        match self.node_by_id(NodeId::root()).map(|node| &node.data) {
            Some(NodeDataTypeInternal::Document(data)) => data.is_html(),
            _ => false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.arena.node_count()
    }

    pub(crate) fn node_mut(&mut self, node_id: NodeId) -> Option<&mut NodeImpl> {
        self.arena.node_mut(node_id)
    }

    /// Fetches a node, or returns a not-found error
    pub(crate) fn existing(&self, node_id: NodeId) -> Result<&NodeImpl> {
        self.node_by_id(node_id)
            .ok_or_else(|| Error::NotFound(format!("node {node_id} does not exist")).into())
    }

    pub(crate) fn element_data(&self, node_id: NodeId) -> Option<&ElementData> {
        self.node_by_id(node_id)
            .and_then(|node| match &node.data {
                NodeDataTypeInternal::Element(data) => Some(data),
                _ => None,
            })
    }

    pub(crate) fn next_iterator_id(&mut self) -> NodeIteratorId {
        let id = NodeIteratorId::from(self.next_iterator_id);
        self.next_iterator_id += 1;
        id
    }

    /// Forgets iterators that were dropped while the document was borrowed
    pub(crate) fn sweep_node_iterators(&mut self) {
        self.node_iterators.retain(|_, entry| entry.is_live());
    }

    /// Creates an element in the HTML namespace. In HTML documents the name is lowercased.
    pub fn create_element(&mut self, local_name: &str) -> Result<NodeId> {
        validate_name(local_name)?;

        let local_name = if self.is_html() {
            local_name.cow_to_ascii_lowercase().into_owned()
        } else {
            local_name.to_owned()
        };

        Ok(self.register_element(ElementData::new(&local_name, None, None)))
    }

    /// Creates an element in the given namespace from a qualified name like `svg:rect`
    pub fn create_element_ns(
        &mut self,
        namespace: Option<&str>,
        qualified_name: &str,
    ) -> Result<NodeId> {
        let (namespace, prefix, local_name) = validate_and_extract(namespace, qualified_name)?;
        let namespace = namespace.or(Some(""));

        let data = match namespace {
            Some(HTML_NAMESPACE) => ElementData::new(local_name, None, prefix),
            Some(ns) => ElementData::new(local_name, Some(ns), prefix),
            None => ElementData::new(local_name, None, prefix),
        };

        Ok(self.register_element(data))
    }

    fn register_element(&mut self, data: ElementData) -> NodeId {
        let is_template = data.interface == crate::node::elements::ElementInterface::HtmlTemplateElement;
        let node_id = self
            .arena
            .register_node(NodeImpl::new(NodeDataTypeInternal::Element(data)));

        if is_template {
            let contents = self.arena.register_node(NodeImpl::new(
                NodeDataTypeInternal::DocumentFragment(DocumentFragmentData {
                    host: Some(node_id),
                }),
            ));
            if let Some(data) = self.node_mut(node_id).and_then(NodeImpl::get_element_data_mut) {
                data.template_contents = Some(contents);
            }
        }

        node_id
    }

    pub fn create_text_node(&mut self, value: &str) -> NodeId {
        self.arena.register_node(NodeImpl::new_text(value))
    }

    pub fn create_comment(&mut self, value: &str) -> NodeId {
        self.arena.register_node(NodeImpl::new_comment(value))
    }

    pub fn create_document_fragment(&mut self) -> NodeId {
        self.arena.register_node(NodeImpl::new(NodeDataTypeInternal::DocumentFragment(
            DocumentFragmentData::default(),
        )))
    }

    pub fn create_document_type(
        &mut self,
        name: &str,
        public_id: &str,
        system_id: &str,
    ) -> Result<NodeId> {
        validate_name(name)?;

        Ok(self
            .arena
            .register_node(NodeImpl::new(NodeDataTypeInternal::DocType(
                DocTypeData::new(name, public_id, system_id),
            ))))
    }

    /// Text of a text or comment node, or the concatenated text of all descendant text nodes of
    /// an element or fragment. Documents and doctypes have none.
    pub fn text_content(&self, node_id: NodeId) -> Option<String> {
        let node = self.node_by_id(node_id)?;

        match &node.data {
            NodeDataTypeInternal::Text(CharacterData { value }) => Some(value.clone()),
            NodeDataTypeInternal::Comment(CharacterData { value }) => Some(value.clone()),
            NodeDataTypeInternal::Element(_)
            | NodeDataTypeInternal::DocumentFragment(_)
            | NodeDataTypeInternal::ShadowRoot(_) => Some(
                self.descendants(node_id)
                    .filter_map(|id| match self.node_by_id(id).map(|n| &n.data) {
                        Some(NodeDataTypeInternal::Text(CharacterData { value })) => Some(value.as_str()),
                        _ => None,
                    })
                    .collect(),
            ),
            NodeDataTypeInternal::Document(_) | NodeDataTypeInternal::DocType(_) => None,
        }
    }

    /// Changes the data of a text or comment node
    pub fn set_character_data(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        match self.node_mut(node_id).map(|node| &mut node.data) {
            Some(NodeDataTypeInternal::Text(data)) => data.value = value.to_owned(),
            Some(NodeDataTypeInternal::Comment(data)) => data.value = value.to_owned(),
            _ => {
                return Err(
                    Error::InvalidNodeType(format!("node {node_id} has no character data")).into(),
                )
            }
        }

        Ok(())
    }

    /// First element in tree order with the given id
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.named_id_elements
            .get(id)?
            .iter()
            .copied()
            .filter(|node_id| self.root(*node_id) == NodeId::root())
            .min_by(|a, b| self.tree_order(*a, *b).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Print a node and all its children in a tree-like structure
    pub fn print_tree(&self, node: &NodeImpl, prefix: String, last: bool, f: &mut Formatter) {
        let mut buffer = prefix.clone();
        if last {
            buffer.push_str("└─ ");
        } else {
            buffer.push_str("├─ ");
        }

        match &node.data {
            NodeDataTypeInternal::Document(_) => {
                _ = writeln!(f, "{buffer}Document");
            }
            NodeDataTypeInternal::DocType(DocTypeData {
                name,
                public_id,
                system_id,
            }) => {
                _ = writeln!(
                    f,
                    r#"{buffer}<!DOCTYPE {name} "{public_id}" "{system_id}">"#,
                );
            }
            NodeDataTypeInternal::Text(CharacterData { value, .. }) => {
                _ = writeln!(f, r#"{buffer}"{value}""#);
            }
            NodeDataTypeInternal::Comment(CharacterData { value, .. }) => {
                _ = writeln!(f, "{buffer}<!-- {value} -->");
            }
            NodeDataTypeInternal::Element(element) => {
                _ = write!(f, "{}<{}", buffer, element.name);
                for attr in element.attributes.iter() {
                    _ = write!(f, " {}={}", attr.qualified_name(), attr.value);
                }
                _ = writeln!(f, ">");
            }
            NodeDataTypeInternal::DocumentFragment(_) => {
                _ = writeln!(f, "{buffer}#document-fragment");
            }
            NodeDataTypeInternal::ShadowRoot(shadow) => {
                _ = writeln!(f, "{buffer}#shadow-root ({})", shadow.mode);
            }
        }

        if prefix.len() > 40 {
            _ = writeln!(f, "...");
            return;
        }

        let mut buffer = prefix;
        if last {
            buffer.push_str("   ");
        } else {
            buffer.push_str("│  ");
        }

        // The shadow root of a host is printed before its light children
        let shadow_root = node.get_element_data().and_then(|data| data.shadow_root);
        let children: Vec<NodeId> = shadow_root.into_iter().chain(node.children.iter().copied()).collect();

        let len = children.len();
        for (i, child_id) in children.iter().enumerate() {
            if let Some(child_node) = self.node_by_id(*child_id) {
                self.print_tree(child_node, buffer.clone(), i == len - 1, f);
            }
        }
    }
}

impl Display for DocumentImpl {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if let Some(root) = self.get_root() {
            self.print_tree(root, String::new(), true, f);
        }
        Ok(())
    }
}

/// Names may not be empty or contain whitespace or markup characters
pub(crate) fn validate_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name.chars().any(|c| {
            c.is_ascii_whitespace() || matches!(c, '<' | '>' | '/' | '=' | '"' | '\'' | '\0')
        });

    if invalid {
        return Err(Error::InvalidCharacter(format!("'{name}' is not a valid name")).into());
    }
    Ok(())
}

/// Splits a qualified name into prefix and local name and checks the namespace rules.
/// See: https://dom.spec.whatwg.org/#validate-and-extract
pub(crate) fn validate_and_extract<'a>(
    namespace: Option<&'a str>,
    qualified_name: &'a str,
) -> Result<(Option<&'a str>, Option<&'a str>, &'a str)> {
    let namespace = namespace.filter(|ns| !ns.is_empty());
    validate_name(qualified_name)?;

    let (prefix, local_name) = match qualified_name.split_once(':') {
        Some((prefix, local)) => {
            if prefix.is_empty() || local.is_empty() || local.contains(':') {
                return Err(Error::InvalidCharacter(format!(
                    "'{qualified_name}' is not a valid qualified name"
                ))
                .into());
            }
            (Some(prefix), local)
        }
        None => (None, qualified_name),
    };

    let namespace_error = |msg: &str| -> Result<(Option<&'a str>, Option<&'a str>, &'a str)> {
        Err(Error::InvalidCharacter(format!("namespace error: {msg}")).into())
    };

    if prefix.is_some() && namespace.is_none() {
        return namespace_error("a prefix needs a namespace");
    }
    if prefix == Some("xml") && namespace != Some(XML_NAMESPACE) {
        return namespace_error("the xml prefix is bound to the XML namespace");
    }
    if (qualified_name == "xmlns" || prefix == Some("xmlns")) && namespace != Some(XMLNS_NAMESPACE)
    {
        return namespace_error("xmlns is bound to the XMLNS namespace");
    }
    if namespace == Some(XMLNS_NAMESPACE) && qualified_name != "xmlns" && prefix != Some("xmlns") {
        return namespace_error("the XMLNS namespace needs the xmlns prefix");
    }

    Ok((namespace, prefix, local_name))
}
