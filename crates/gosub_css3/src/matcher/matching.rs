use crate::parser::anplusb::nth_matches;
use crate::selector::{
    AttributeOperator, AttributeSelector, CaseSensitivity, ChainLink, Combinator, ComplexSelector,
    CompoundSelector, PseudoClassSelector, SelectorList, SimpleSelector,
};
use cow_utils::CowUtils;
use gosub_config::config;
use gosub_shared::errors::{CssError, CssResult};
use gosub_shared::node::NodeId;
use gosub_shared::traits::document::Document;
use gosub_shared::traits::node::{ClassList, ElementDataType, Node, NodeType, HTML_NAMESPACE};
use itertools::Itertools;
use std::borrow::Cow;

type ElementData<D> = <<D as Document>::Node as Node>::ElementData;

/// Returns the node and its element data when `node_id` is an element
fn element<D: Document>(doc: &D, node_id: NodeId) -> Option<(&D::Node, &ElementData<D>)> {
    let node = doc.node_by_id(node_id)?;
    let data = node.get_element_data()?;
    Some((node, data))
}

/// Parent of the node, when that parent is an element
fn parent_element<D: Document>(doc: &D, node_id: NodeId) -> Option<NodeId> {
    let parent_id = doc.node_by_id(node_id)?.parent_id()?;
    element(doc, parent_id).map(|_| parent_id)
}

/// Element children of the node's parent in tree order. A parentless node is its own only sibling.
fn element_siblings<D: Document>(doc: &D, node_id: NodeId) -> Vec<NodeId> {
    let Some(parent) = doc
        .node_by_id(node_id)
        .and_then(|node| node.parent_id())
        .and_then(|parent_id| doc.node_by_id(parent_id))
    else {
        return vec![node_id];
    };

    parent
        .children()
        .iter()
        .copied()
        .filter(|child| element(doc, *child).is_some())
        .collect()
}

/// Returns true when any selector in the list matches the node
pub fn match_selector_list<D: Document>(
    doc: &D,
    node_id: NodeId,
    list: &SelectorList,
) -> CssResult<bool> {
    for selector in list.iter() {
        if match_complex_selector(doc, node_id, selector)? {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Matches right to left: the subject against the node, then every link of the chain against the
/// candidates its combinator allows. Candidates are tried in turn until the rest of the chain
/// matches as well.
pub fn match_complex_selector<D: Document>(
    doc: &D,
    node_id: NodeId,
    selector: &ComplexSelector,
) -> CssResult<bool> {
    if !match_compound_selector(doc, node_id, &selector.subject)? {
        return Ok(false);
    }

    match_chain(doc, node_id, &selector.chain)
}

fn match_chain<D: Document>(doc: &D, node_id: NodeId, chain: &[ChainLink]) -> CssResult<bool> {
    let Some((link, rest)) = chain.split_last() else {
        return Ok(true);
    };

    match link.combinator {
        Combinator::Child => {
            let Some(parent_id) = parent_element(doc, node_id) else {
                return Ok(false);
            };
            Ok(match_compound_selector(doc, parent_id, &link.unit)?
                && match_chain(doc, parent_id, rest)?)
        }
        Combinator::Descendant => {
            let mut current = parent_element(doc, node_id);
            while let Some(ancestor_id) = current {
                if match_compound_selector(doc, ancestor_id, &link.unit)?
                    && match_chain(doc, ancestor_id, rest)?
                {
                    return Ok(true);
                }
                current = parent_element(doc, ancestor_id);
            }
            Ok(false)
        }
        Combinator::AdjacentSibling => {
            let siblings = element_siblings(doc, node_id);
            let Some((pos, _)) = siblings.iter().find_position(|id| **id == node_id) else {
                return Ok(false);
            };
            let Some(previous_id) = pos.checked_sub(1).map(|idx| siblings[idx]) else {
                return Ok(false);
            };
            Ok(match_compound_selector(doc, previous_id, &link.unit)?
                && match_chain(doc, previous_id, rest)?)
        }
        Combinator::GeneralSibling => {
            let siblings = element_siblings(doc, node_id);
            let Some((pos, _)) = siblings.iter().find_position(|id| **id == node_id) else {
                return Ok(false);
            };
            for previous_id in siblings[..pos].iter().rev() {
                if match_compound_selector(doc, *previous_id, &link.unit)?
                    && match_chain(doc, *previous_id, rest)?
                {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

/// Returns true when every simple selector of the compound matches
pub fn match_compound_selector<D: Document>(
    doc: &D,
    node_id: NodeId,
    compound: &CompoundSelector,
) -> CssResult<bool> {
    for simple in &compound.0 {
        if !match_simple_selector(doc, node_id, simple)? {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Matches a single simple selector. Nodes that are not elements never match.
pub fn match_simple_selector<D: Document>(
    doc: &D,
    node_id: NodeId,
    selector: &SimpleSelector,
) -> CssResult<bool> {
    let Some((node, data)) = element(doc, node_id) else {
        return Ok(false);
    };

    match selector {
        SimpleSelector::Universal => Ok(true),
        SimpleSelector::Type(name) => {
            // HTML element names are compared ASCII case-insensitively
            if data.is_namespace(HTML_NAMESPACE) {
                Ok(data.name().eq_ignore_ascii_case(name))
            } else {
                Ok(data.name() == name)
            }
        }
        SimpleSelector::Id(id) => Ok(data.attribute("id") == Some(id.as_str())),
        SimpleSelector::Class(class) => Ok(data.classlist().contains(class)),
        SimpleSelector::Attribute(attr) => match_attribute(data, attr),
        SimpleSelector::PseudoClass(pseudo) => match_pseudo_class(doc, node, data, pseudo),
        // Pseudo-elements are never elements of the tree
        SimpleSelector::PseudoElement(_) => Ok(false),
    }
}

fn match_attribute<E: ElementDataType>(data: &E, attr: &AttributeSelector) -> CssResult<bool> {
    if attr.operator == AttributeOperator::Unknown {
        return Err(CssError::new(&format!(
            "unknown operator in attribute selector [{}]",
            attr.name
        )));
    }

    // HTML attribute names are stored lowercased
    let name = if data.is_namespace(HTML_NAMESPACE) {
        attr.name.cow_to_ascii_lowercase()
    } else {
        Cow::Borrowed(attr.name.as_str())
    };
    let Some(actual) = data.attribute(&name) else {
        return Ok(false);
    };
    let Some(wanted) = attr.value.as_deref() else {
        // presence only
        return Ok(true);
    };

    let (actual, wanted) = match attr.case {
        CaseSensitivity::Insensitive => (
            actual.cow_to_ascii_lowercase(),
            wanted.cow_to_ascii_lowercase(),
        ),
        CaseSensitivity::Unset | CaseSensitivity::Sensitive => {
            (Cow::Borrowed(actual), Cow::Borrowed(wanted))
        }
    };
    let (actual, wanted) = (actual.as_ref(), wanted.as_ref());

    let matched = match attr.operator {
        AttributeOperator::ExactEq => actual == wanted,
        AttributeOperator::OneOf => {
            !wanted.is_empty()
                && !wanted.contains(|c: char| c.is_ascii_whitespace())
                && actual.split_ascii_whitespace().any(|token| token == wanted)
        }
        AttributeOperator::HyphenOf => {
            actual == wanted
                || actual
                    .strip_prefix(wanted)
                    .is_some_and(|rest| rest.starts_with('-'))
        }
        AttributeOperator::StartWith => !wanted.is_empty() && actual.starts_with(wanted),
        AttributeOperator::EndWith => !wanted.is_empty() && actual.ends_with(wanted),
        AttributeOperator::PartOf => !wanted.is_empty() && actual.contains(wanted),
        AttributeOperator::Unknown => false,
    };

    Ok(matched)
}

fn match_pseudo_class<D: Document>(
    doc: &D,
    node: &D::Node,
    data: &ElementData<D>,
    pseudo: &PseudoClassSelector,
) -> CssResult<bool> {
    let node_id = node.id();

    match pseudo.name.as_str() {
        "not" => {
            for compound in pseudo.selectors.iter().flatten() {
                if match_compound_selector(doc, node_id, compound)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        "is" | "where" => {
            for compound in pseudo.selectors.iter().flatten() {
                if match_compound_selector(doc, node_id, compound)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        "root" => Ok(node
            .parent_id()
            .and_then(|parent_id| doc.node_by_id(parent_id))
            .is_some_and(|parent| parent.type_of() == NodeType::DocumentNode)),
        "empty" => Ok(node.children().iter().all(|child_id| {
            match doc.node_by_id(*child_id) {
                Some(child) if child.is_element_node() => false,
                Some(child) if child.is_text_node() => {
                    child.get_text_value().map_or(true, str::is_empty)
                }
                _ => true,
            }
        })),
        "first-child" | "last-child" | "only-child" | "nth-child" | "nth-last-child" => {
            let siblings = element_siblings(doc, node_id);
            Ok(match_position(&siblings, node_id, pseudo))
        }
        "first-of-type" | "last-of-type" | "only-of-type" | "nth-of-type"
        | "nth-last-of-type" => {
            let siblings: Vec<NodeId> = element_siblings(doc, node_id)
                .into_iter()
                .filter(|sibling_id| {
                    element(doc, *sibling_id).is_some_and(|(_, sibling)| {
                        sibling.name() == data.name() && sibling.namespace() == data.namespace()
                    })
                })
                .collect();
            Ok(match_position(&siblings, node_id, pseudo))
        }
        // No custom element registry: autonomous custom elements are never defined
        "defined" => Ok(!(data.is_namespace(HTML_NAMESPACE) && data.name().contains('-'))),
        name => {
            if config!(bool "css3.selectors.unknown_pseudo_class_is_error") {
                return Err(CssError::new(&format!("unsupported pseudo-class :{name}")));
            }
            log::debug!("unsupported pseudo-class :{name} never matches");
            Ok(false)
        }
    }
}

/// Structural position of `node_id` in `siblings` for the child and of-type pseudo-classes
fn match_position(siblings: &[NodeId], node_id: NodeId, pseudo: &PseudoClassSelector) -> bool {
    let Some((pos, _)) = siblings.iter().find_position(|id| **id == node_id) else {
        return false;
    };
    let from_start = i32::try_from(pos + 1).unwrap_or(i32::MAX);
    let from_end = i32::try_from(siblings.len() - pos).unwrap_or(i32::MAX);

    let name = pseudo.name.as_str();
    if name.starts_with("first-") {
        return from_start == 1;
    }
    if name.starts_with("last-") {
        return from_end == 1;
    }
    if name.starts_with("only-") {
        return siblings.len() == 1;
    }

    let Some((a, b)) = pseudo.nth else {
        return false;
    };
    if name.starts_with("nth-last-") {
        nth_matches(a, b, from_end)
    } else {
        nth_matches(a, b, from_start)
    }
}
