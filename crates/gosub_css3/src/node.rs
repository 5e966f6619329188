use core::fmt::{Display, Formatter};
use gosub_shared::types::Location;
use std::ops::Deref;

/// Selector syntax tree as produced by the parser
#[derive(Debug, PartialEq, Clone)]
pub enum NodeType {
    SelectorList {
        selectors: Vec<Node>,
    },
    /// Two selectors joined by a combinator. Chains nest to the left: `a > b c` is
    /// `(a > b) c`. The right side is always a compound selector.
    ComplexSelector {
        left: Node,
        combinator: String,
        right: Node,
    },
    CompoundSelector {
        children: Vec<Node>,
    },
    TypeSelector {
        namespace: Option<String>,
        value: String,
    },
    Universal {
        namespace: Option<String>,
    },
    IdSelector {
        value: String,
    },
    ClassSelector {
        value: String,
    },
    AttributeSelector {
        name: String,
        matcher: Option<String>,
        value: Option<String>,
        flags: Option<String>,
    },
    PseudoClassSelector {
        name: String,
        argument: Option<String>,
        /// Parsed argument of selector-taking pseudo-classes like `:not()`
        selectors: Option<Node>,
    },
    PseudoElementSelector {
        value: String,
    },
}

/// A node is a single element in the AST
#[derive(Debug, PartialEq, Clone)]
pub struct Node {
    pub node_type: Box<NodeType>,
    pub location: Location,
}

impl Node {
    pub(crate) fn new(node_type: NodeType, location: Location) -> Self {
        Self {
            node_type: Box::new(node_type),
            location,
        }
    }

    pub fn is_selector_list(&self) -> bool {
        matches!(&*self.node_type, NodeType::SelectorList { .. })
    }

    pub fn as_selector_list(&self) -> Option<&Vec<Node>> {
        match self.node_type.deref() {
            NodeType::SelectorList { selectors } => Some(selectors),
            _ => None,
        }
    }

    pub fn is_complex_selector(&self) -> bool {
        matches!(&*self.node_type, NodeType::ComplexSelector { .. })
    }

    pub fn as_complex_selector(&self) -> Option<(&Node, &str, &Node)> {
        match self.node_type.deref() {
            NodeType::ComplexSelector {
                left,
                combinator,
                right,
            } => Some((left, combinator, right)),
            _ => None,
        }
    }

    pub fn is_compound_selector(&self) -> bool {
        matches!(&*self.node_type, NodeType::CompoundSelector { .. })
    }

    pub fn as_compound_selector(&self) -> Option<&Vec<Node>> {
        match self.node_type.deref() {
            NodeType::CompoundSelector { children } => Some(children),
            _ => None,
        }
    }

    pub fn is_pseudo_class(&self) -> bool {
        matches!(&*self.node_type, NodeType::PseudoClassSelector { .. })
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.node_type.deref() {
            NodeType::SelectorList { selectors } => {
                for (idx, selector) in selectors.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{selector}")?;
                }
                Ok(())
            }
            NodeType::ComplexSelector {
                left,
                combinator,
                right,
            } => {
                if combinator == " " {
                    write!(f, "{left} {right}")
                } else {
                    write!(f, "{left} {combinator} {right}")
                }
            }
            NodeType::CompoundSelector { children } => {
                children.iter().try_for_each(|child| write!(f, "{child}"))
            }
            NodeType::TypeSelector { namespace, value } => match namespace {
                Some(ns) => write!(f, "{ns}|{value}"),
                None => write!(f, "{value}"),
            },
            NodeType::Universal { namespace } => match namespace {
                Some(ns) => write!(f, "{ns}|*"),
                None => write!(f, "*"),
            },
            NodeType::IdSelector { value } => write!(f, "#{value}"),
            NodeType::ClassSelector { value } => write!(f, ".{value}"),
            NodeType::AttributeSelector {
                name,
                matcher,
                value,
                flags,
            } => {
                write!(f, "[{name}")?;
                if let (Some(matcher), Some(value)) = (matcher, value) {
                    write!(f, "{matcher}\"{value}\"")?;
                }
                if let Some(flags) = flags {
                    write!(f, " {flags}")?;
                }
                write!(f, "]")
            }
            NodeType::PseudoClassSelector { name, argument, .. } => match argument {
                Some(arg) => write!(f, ":{name}({arg})"),
                None => write!(f, ":{name}"),
            },
            NodeType::PseudoElementSelector { value } => write!(f, "::{value}"),
        }
    }
}
