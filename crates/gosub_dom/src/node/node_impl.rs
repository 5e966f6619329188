use crate::node::data::character::CharacterData;
use crate::node::data::doctype::DocTypeData;
use crate::node::data::document::DocumentData;
use crate::node::data::element::ElementData;
use crate::node::data::fragment::{DocumentFragmentData, ShadowRootData};
use crate::node::internals::NodeInternals;
use core::fmt::Debug;
use gosub_shared::node::NodeId;
use gosub_shared::ordered::OrderedSet;
use gosub_shared::traits::node::{Node, NodeType};

/// Kind specific data of a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeDataTypeInternal {
    /// Represents a document
    Document(DocumentData),
    // Represents a doctype
    DocType(DocTypeData),
    /// Represents a text
    Text(CharacterData),
    /// Represents a comment
    Comment(CharacterData),
    /// Represents an element
    Element(ElementData),
    /// Represents a document fragment
    DocumentFragment(DocumentFragmentData),
    /// Represents a shadow root, a document fragment attached to a host
    ShadowRoot(ShadowRootData),
}

/// Node structure that resembles a DOM node
#[derive(Clone, PartialEq)]
pub struct NodeImpl {
    /// ID of the node, 0 is always the root / document node
    pub id: NodeId,
    /// parent of the node, if any
    pub parent: Option<NodeId>,
    /// any children of the node
    pub(crate) children: OrderedSet<NodeId>,
    /// actual data of the node
    pub data: NodeDataTypeInternal,
    pub(crate) internals: NodeInternals,
}

impl Node for NodeImpl {
    type ElementData = ElementData;

    fn id(&self) -> NodeId {
        self.id
    }

    fn parent_id(&self) -> Option<NodeId> {
        self.parent
    }

    fn children(&self) -> &[NodeId] {
        self.children.as_slice()
    }

    fn type_of(&self) -> NodeType {
        match self.data {
            NodeDataTypeInternal::Document(_) => NodeType::DocumentNode,
            NodeDataTypeInternal::DocType(_) => NodeType::DocTypeNode,
            NodeDataTypeInternal::Text(_) => NodeType::TextNode,
            NodeDataTypeInternal::Comment(_) => NodeType::CommentNode,
            NodeDataTypeInternal::Element(_) => NodeType::ElementNode,
            NodeDataTypeInternal::DocumentFragment(_) | NodeDataTypeInternal::ShadowRoot(_) => {
                NodeType::DocumentFragmentNode
            }
        }
    }

    fn get_element_data(&self) -> Option<&ElementData> {
        if let NodeDataTypeInternal::Element(data) = &self.data {
            return Some(data);
        }
        None
    }

    fn get_text_value(&self) -> Option<&str> {
        match &self.data {
            NodeDataTypeInternal::Text(data) => Some(data.value()),
            NodeDataTypeInternal::Comment(data) => Some(data.value()),
            _ => None,
        }
    }
}

impl Debug for NodeImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("Node");
        debug.field("id", &self.id);
        debug.field("parent", &self.parent);
        debug.field("children", &self.children.as_slice());
        debug.field("data", &self.data);
        debug.finish_non_exhaustive()
    }
}

impl NodeImpl {
    /// create a new, unregistered `Node`
    #[must_use]
    pub fn new(data: NodeDataTypeInternal) -> Self {
        Self {
            id: NodeId::default(),
            parent: None,
            children: OrderedSet::new(),
            data,
            internals: NodeInternals::default(),
        }
    }

    /// Create a new document node
    #[must_use]
    pub fn new_document(content_type: &str) -> Self {
        Self::new(NodeDataTypeInternal::Document(DocumentData::new(
            content_type,
        )))
    }

    /// Creates a new text node
    #[must_use]
    pub fn new_text(value: &str) -> Self {
        Self::new(NodeDataTypeInternal::Text(CharacterData::new(value)))
    }

    /// Creates a new comment node
    #[must_use]
    pub fn new_comment(value: &str) -> Self {
        Self::new(NodeDataTypeInternal::Comment(CharacterData::new(value)))
    }

    pub fn get_element_data_mut(&mut self) -> Option<&mut ElementData> {
        if let NodeDataTypeInternal::Element(data) = &mut self.data {
            return Some(data);
        }
        None
    }

    pub fn get_shadow_root_data(&self) -> Option<&ShadowRootData> {
        if let NodeDataTypeInternal::ShadowRoot(data) = &self.data {
            return Some(data);
        }
        None
    }

    pub fn is_shadow_root(&self) -> bool {
        matches!(self.data, NodeDataTypeInternal::ShadowRoot(_))
    }

    pub fn is_document(&self) -> bool {
        matches!(self.data, NodeDataTypeInternal::Document(_))
    }

    /// Document fragments and shadow roots
    pub fn is_document_fragment(&self) -> bool {
        self.type_of() == NodeType::DocumentFragmentNode
    }

    /// `<slot>` in the HTML namespace
    pub fn is_slot(&self) -> bool {
        self.get_element_data().is_some_and(ElementData::is_slot)
    }

    /// Elements and text nodes can be assigned to slots
    pub fn is_slottable(&self) -> bool {
        matches!(
            self.data,
            NodeDataTypeInternal::Element(_) | NodeDataTypeInternal::Text(_)
        )
    }

    /// Host of a shadow root or of the contents of a template
    pub fn fragment_host(&self) -> Option<NodeId> {
        match &self.data {
            NodeDataTypeInternal::ShadowRoot(data) => Some(data.host),
            NodeDataTypeInternal::DocumentFragment(data) => data.host,
            _ => None,
        }
    }

    /// Name used for slot matching: the `slot` attribute of elements, empty for text
    pub fn slottable_name(&self) -> &str {
        self.get_element_data()
            .and_then(|data| data.attributes.get("slot"))
            .map_or("", |attr| attr.value.as_str())
    }

    /// Value of the `name` attribute of a slot, empty when absent
    pub fn slot_name(&self) -> &str {
        self.get_element_data()
            .and_then(|data| data.attributes.get("name"))
            .map_or("", |attr| attr.value.as_str())
    }
}
