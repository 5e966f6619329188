use crate::node::NodeId;

/// Kind of a node. The discriminants are the DOM `nodeType` numbers.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[repr(u16)]
pub enum NodeType {
    ElementNode = 1,
    AttributeNode = 2,
    TextNode = 3,
    CommentNode = 8,
    DocumentNode = 9,
    DocTypeNode = 10,
    DocumentFragmentNode = 11,
}

impl NodeType {
    /// The DOM `nodeType` number
    #[must_use]
    pub fn code(self) -> u16 {
        self as u16
    }
}

pub trait ClassList {
    /// Returns true when the class name is present
    fn contains(&self, class_name: &str) -> bool;
    /// Number of class names
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Class names in the order they appear in the `class` attribute
    fn as_vec(&self) -> Vec<String>;
}

pub trait ElementDataType {
    type ClassList: ClassList;

    /// Local name of the element
    fn name(&self) -> &str;
    /// Namespace of the element
    fn namespace(&self) -> &str;
    /// Returns true when the element lives in the given namespace
    fn is_namespace(&self, namespace: &str) -> bool {
        self.namespace() == namespace
    }
    /// Value of the attribute with the given (qualified) name
    fn attribute(&self, name: &str) -> Option<&str>;
    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }
    fn classlist(&self) -> &Self::ClassList;
}

pub trait Node {
    type ElementData: ElementDataType;

    /// Id of the node in its arena
    fn id(&self) -> NodeId;
    /// Id of the parent node, if any
    fn parent_id(&self) -> Option<NodeId>;
    /// Child ids in tree order
    fn children(&self) -> &[NodeId];
    fn type_of(&self) -> NodeType;

    fn is_element_node(&self) -> bool {
        self.type_of() == NodeType::ElementNode
    }
    fn get_element_data(&self) -> Option<&Self::ElementData>;

    fn is_text_node(&self) -> bool {
        self.type_of() == NodeType::TextNode
    }
    /// Character data of text and comment nodes
    fn get_text_value(&self) -> Option<&str>;
}

pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";
