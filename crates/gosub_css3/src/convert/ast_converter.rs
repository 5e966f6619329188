use crate::node::{Node as CssNode, NodeType};
use crate::parser::anplusb::parse_anplusb;
use crate::selector::{
    AttributeOperator, AttributeSelector, CaseSensitivity, ChainLink, Combinator, ComplexSelector,
    CompoundSelector, PseudoClassSelector, SelectorList, SimpleSelector,
};
use cow_utils::CowUtils;
use gosub_config::config;
use gosub_shared::errors::{CssError, CssResult};
use log::trace;

/*

The parser produces a left-nested tree for complex selectors:

    a > b c

        SelectorList
            ComplexSelector ' '
                ComplexSelector '>'
                    CompoundSelector a
                    CompoundSelector b
                CompoundSelector c

The converter flattens this into a chain read from left to right, with the rightmost compound as
the subject:

    ComplexSelector
        chain: [ (a, Child), (b, Descendant) ]
        subject: c

Arguments of :not(), :is() and :where() are restricted to compound selectors.

*/

/// Pseudo-classes that take An+B as argument
const NTH_PSEUDO_CLASSES: [&str; 4] = [
    "nth-child",
    "nth-last-child",
    "nth-of-type",
    "nth-last-of-type",
];

/// Pseudo-classes that take a compound selector list as argument
const SELECTOR_PSEUDO_CLASSES: [&str; 3] = ["not", "is", "where"];

/// Converts a parsed selector list into the form used by the matcher
pub fn convert_ast_to_selector_list(node: &CssNode) -> CssResult<SelectorList> {
    convert_selector_list(node, 0)
}

fn convert_selector_list(node: &CssNode, depth: usize) -> CssResult<SelectorList> {
    let Some(selectors) = node.as_selector_list() else {
        return Err(CssError::with_location(
            "expected a selector list",
            node.location,
        ));
    };

    let selectors = selectors
        .iter()
        .map(|selector| convert_complex_selector(selector, depth))
        .collect::<CssResult<Vec<_>>>()?;

    Ok(SelectorList(selectors))
}

fn convert_complex_selector(node: &CssNode, depth: usize) -> CssResult<ComplexSelector> {
    let mut units = Vec::new();
    flatten_complex(node, &mut units)?;

    let mut chain = Vec::with_capacity(units.len());
    let mut pending: Option<CompoundSelector> = None;
    for (combinator, compound) in units {
        let compound = convert_compound_selector(compound, depth)?;
        if let (Some(unit), Some(combinator)) = (pending.take(), combinator) {
            chain.push(ChainLink { unit, combinator });
        }
        pending = Some(compound);
    }

    let Some(subject) = pending else {
        return Err(CssError::with_location("empty selector", node.location));
    };

    trace!("converted complex selector with {} links", chain.len());
    Ok(ComplexSelector { chain, subject })
}

/// Collects the compounds of a complex selector from left to right, each with the combinator
/// that joins it to the compound before it
fn flatten_complex<'a>(
    node: &'a CssNode,
    units: &mut Vec<(Option<Combinator>, &'a CssNode)>,
) -> CssResult<()> {
    if let Some((left, combinator, right)) = node.as_complex_selector() {
        flatten_complex(left, units)?;
        units.push((Some(convert_combinator(combinator, right)?), right));
        return Ok(());
    }

    if node.is_compound_selector() {
        units.push((None, node));
        return Ok(());
    }

    Err(CssError::with_location(
        "expected a compound selector",
        node.location,
    ))
}

fn convert_combinator(value: &str, node: &CssNode) -> CssResult<Combinator> {
    match value {
        " " => Ok(Combinator::Descendant),
        ">" => Ok(Combinator::Child),
        "+" => Ok(Combinator::AdjacentSibling),
        "~" => Ok(Combinator::GeneralSibling),
        _ => Err(CssError::with_location(
            &format!("unsupported combinator '{value}'"),
            node.location,
        )),
    }
}

fn convert_compound_selector(node: &CssNode, depth: usize) -> CssResult<CompoundSelector> {
    let Some(children) = node.as_compound_selector() else {
        return Err(CssError::with_location(
            "expected a compound selector",
            node.location,
        ));
    };

    let simple = children
        .iter()
        .map(|child| convert_simple_selector(child, depth))
        .collect::<CssResult<Vec<_>>>()?;

    Ok(CompoundSelector(simple))
}

fn convert_simple_selector(node: &CssNode, depth: usize) -> CssResult<SimpleSelector> {
    let simple = match node.node_type.as_ref() {
        NodeType::Universal { .. } => SimpleSelector::Universal,
        NodeType::TypeSelector { value, .. } => SimpleSelector::Type(value.clone()),
        NodeType::IdSelector { value } => SimpleSelector::Id(value.clone()),
        NodeType::ClassSelector { value } => SimpleSelector::Class(value.clone()),
        NodeType::AttributeSelector {
            name,
            matcher,
            value,
            flags,
        } => SimpleSelector::Attribute(AttributeSelector {
            name: name.clone(),
            operator: convert_attribute_operator(matcher.as_deref(), value.as_deref()),
            value: value.clone(),
            case: convert_case_flag(flags.as_deref(), node)?,
        }),
        NodeType::PseudoClassSelector {
            name,
            argument,
            selectors,
        } => SimpleSelector::PseudoClass(convert_pseudo_class(
            name,
            argument.as_deref(),
            selectors.as_ref(),
            node,
            depth,
        )?),
        NodeType::PseudoElementSelector { value } => {
            SimpleSelector::PseudoElement(value.cow_to_ascii_lowercase().into_owned())
        }
        _ => {
            return Err(CssError::with_location(
                "expected a simple selector",
                node.location,
            ))
        }
    };

    Ok(simple)
}

fn convert_attribute_operator(matcher: Option<&str>, value: Option<&str>) -> AttributeOperator {
    match (matcher, value) {
        (Some("="), _) => AttributeOperator::ExactEq,
        (Some("~="), _) => AttributeOperator::OneOf,
        (Some("|="), _) => AttributeOperator::HyphenOf,
        (Some("^="), _) => AttributeOperator::StartWith,
        (Some("$="), _) => AttributeOperator::EndWith,
        (Some("*="), _) => AttributeOperator::PartOf,
        // presence test, the operator is never consulted
        (None, None) => AttributeOperator::ExactEq,
        _ => AttributeOperator::Unknown,
    }
}

fn convert_case_flag(flags: Option<&str>, node: &CssNode) -> CssResult<CaseSensitivity> {
    match flags {
        None => Ok(CaseSensitivity::Unset),
        Some(flag) if flag.eq_ignore_ascii_case("i") => Ok(CaseSensitivity::Insensitive),
        Some(flag) if flag.eq_ignore_ascii_case("s") => Ok(CaseSensitivity::Sensitive),
        Some(flag) => Err(CssError::with_location(
            &format!("unknown attribute selector flag '{flag}'"),
            node.location,
        )),
    }
}

fn convert_pseudo_class(
    name: &str,
    argument: Option<&str>,
    selectors: Option<&CssNode>,
    node: &CssNode,
    depth: usize,
) -> CssResult<PseudoClassSelector> {
    let name = name.cow_to_ascii_lowercase().into_owned();

    let selectors = match selectors {
        Some(list) => Some(convert_compound_argument(&name, list, depth + 1)?),
        None if SELECTOR_PSEUDO_CLASSES.contains(&name.as_str()) => {
            return Err(CssError::with_location(
                &format!(":{name}() requires a selector argument"),
                node.location,
            ))
        }
        None => None,
    };

    let nth = if NTH_PSEUDO_CLASSES.contains(&name.as_str()) {
        let parsed = argument.and_then(parse_anplusb);
        if parsed.is_none() {
            return Err(CssError::with_location(
                &format!("invalid argument for :{name}()"),
                node.location,
            ));
        }
        parsed
    } else {
        None
    };

    Ok(PseudoClassSelector {
        name,
        argument: argument.map(str::to_string),
        selectors,
        nth,
    })
}

/// `:not(a, b)` takes a list of compound selectors, a combinator in the argument is an error
fn convert_compound_argument(
    name: &str,
    list: &CssNode,
    depth: usize,
) -> CssResult<Vec<CompoundSelector>> {
    let max_depth = config!(uint "css3.selectors.max_nesting");
    if depth > max_depth {
        return Err(CssError::with_location(
            &format!(":{name}() nested deeper than {max_depth} levels"),
            list.location,
        ));
    }

    let Some(selectors) = list.as_selector_list() else {
        return Err(CssError::with_location(
            &format!("expected a selector list in :{name}()"),
            list.location,
        ));
    };

    selectors
        .iter()
        .map(|selector| {
            if selector.is_complex_selector() {
                return Err(CssError::with_location(
                    &format!(":{name}() only accepts compound selectors"),
                    selector.location,
                ));
            }
            convert_compound_selector(selector, depth)
        })
        .collect()
}
