use crate::node::{Node, NodeType};
use crate::parser::{location_of, Span};
use gosub_config::config;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while1};
use nom::character::complete::{char, multispace0, multispace1, one_of};
use nom::combinator::{all_consuming, map, opt, recognize, verify};
use nom::error::{Error, ErrorKind};
use nom::multi::{many0, separated_list1};
use nom::sequence::{delimited, preceded, terminated};
use nom::{IResult, Input, Parser};

/// Pseudo-classes whose argument is itself a selector list
const SELECTOR_ARGUMENT_PSEUDO_CLASSES: [&str; 3] = ["not", "is", "where"];

/// Pseudo-elements that may still be written with a single colon
const LEGACY_PSEUDO_ELEMENTS: [&str; 4] = ["before", "after", "first-line", "first-letter"];

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

/// <ident-token>, without escapes
fn ident(input: Span) -> IResult<Span, String> {
    let (input, name) = verify(take_while1(is_name_char), |name: &Span| {
        let mut chars = name.fragment().chars();
        match (chars.next(), chars.next()) {
            (Some(c), _) if c.is_ascii_digit() => false,
            (Some('-'), Some(c)) => !c.is_ascii_digit(),
            (Some('-'), None) => false,
            _ => true,
        }
    })
    .parse(input)?;

    Ok((input, name.fragment().to_string()))
}

/// <string-token>
fn quoted_string(input: Span) -> IResult<Span, String> {
    let (input, value) = alt((
        delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
        delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
    ))
    .parse(input)?;

    Ok((input, value.fragment().to_string()))
}

/// <selector-list> = <complex-selector-list>
/// <complex-selector-list> = <complex-selector>#
pub(crate) fn parse_selector_list(input: Span) -> IResult<Span, Node> {
    nested_selector_list(input, 0)
}

/// Selector list found `depth` functional pseudo-classes deep
fn nested_selector_list(input: Span, depth: usize) -> IResult<Span, Node> {
    let location = location_of(&input);

    let (input, selectors) = delimited(
        multispace0,
        separated_list1(
            delimited(multispace0, char(','), multispace0),
            |i| parse_complex_selector(i, depth),
        ),
        multispace0,
    )
    .parse(input)?;

    Ok((input, Node::new(NodeType::SelectorList { selectors }, location)))
}

/// <complex-selector> = <compound-selector> [ <combinator>? <compound-selector> ]*
fn parse_complex_selector(input: Span, depth: usize) -> IResult<Span, Node> {
    let (input, first) = parse_compound_selector(input, depth)?;
    let (input, others) =
        many0((parse_combinator, |i| parse_compound_selector(i, depth))).parse(input)?;

    let node = others.into_iter().fold(first, |left, (combinator, right)| {
        let location = left.location;
        Node::new(
            NodeType::ComplexSelector {
                left,
                combinator,
                right,
            },
            location,
        )
    });

    Ok((input, node))
}

/// <combinator> = '>' | '+' | '~' | <whitespace>
fn parse_combinator(input: Span) -> IResult<Span, String> {
    alt((
        map(
            delimited(multispace0, one_of(">+~"), multispace0),
            |c: char| c.to_string(),
        ),
        map(multispace1, |_| " ".to_string()),
    ))
    .parse(input)
}

/// <compound-selector> = [ <type-selector>? <subclass-selector>* [ <pseudo-element-selector> <pseudo-class-selector>* ]* ]!
fn parse_compound_selector(input: Span, depth: usize) -> IResult<Span, Node> {
    let location = location_of(&input);

    let (input, type_selector) = opt(parse_type_selector).parse(input)?;
    let (input, subclass_selectors) =
        many0(|i| parse_subclass_selector(i, depth)).parse(input)?;

    if type_selector.is_none() && subclass_selectors.is_empty() {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::IsNot)));
    }

    let mut children = Vec::with_capacity(subclass_selectors.len() + 1);
    children.extend(type_selector);
    children.extend(subclass_selectors);

    Ok((input, Node::new(NodeType::CompoundSelector { children }, location)))
}

/// <type-selector> = <wq-name> | <ns-prefix>? '*'
fn parse_type_selector(input: Span) -> IResult<Span, Node> {
    let location = location_of(&input);

    let (input, namespace) = opt(ns_prefix).parse(input)?;
    let (input, name) = alt((map(char('*'), |_| None), map(ident, Some))).parse(input)?;

    let node_type = match name {
        Some(value) => NodeType::TypeSelector { namespace, value },
        None => NodeType::Universal { namespace },
    };

    Ok((input, Node::new(node_type, location)))
}

/// <ns-prefix> = [ <ident-token> | '*' ]? '|'
fn ns_prefix(input: Span) -> IResult<Span, String> {
    let (input, prefix) = terminated(
        opt(alt((ident, map(char('*'), |_| "*".to_string())))),
        terminated(char('|'), nom::combinator::not(char('='))),
    )
    .parse(input)?;

    Ok((input, prefix.unwrap_or_default()))
}

/// <subclass-selector> = <id-selector> | <class-selector> | <attribute-selector> | <pseudo-class-selector>
///
/// Pseudo-elements are accepted at the same position.
fn parse_subclass_selector(input: Span, depth: usize) -> IResult<Span, Node> {
    alt((
        parse_id_selector,
        parse_class_selector,
        parse_attribute_selector,
        parse_pseudo_element_selector,
        |i| parse_pseudo_class_selector(i, depth),
    ))
    .parse(input)
}

/// <id-selector> = <hash-token>
fn parse_id_selector(input: Span) -> IResult<Span, Node> {
    let location = location_of(&input);
    let (input, value) = preceded(char('#'), take_while1(is_name_char)).parse(input)?;

    let value = value.fragment().to_string();
    Ok((input, Node::new(NodeType::IdSelector { value }, location)))
}

/// <class-selector> = '.' <ident-token>
fn parse_class_selector(input: Span) -> IResult<Span, Node> {
    let location = location_of(&input);
    let (input, value) = preceded(char('.'), ident).parse(input)?;

    Ok((input, Node::new(NodeType::ClassSelector { value }, location)))
}

/// <attr-matcher> = [ '~' | '|' | '^' | '$' | '*' ]? '='
///
/// Any other single character before the `=` is kept as well so the matcher can reject it.
fn attr_matcher(input: Span) -> IResult<Span, String> {
    let (input, matcher) = recognize((opt(one_of("~|^$*!")), char('='))).parse(input)?;

    Ok((input, matcher.fragment().to_string()))
}

/// <attribute-selector> = '[' <wq-name> ']' |
///                        '[' <wq-name> <attr-matcher> [ <string-token> | <ident-token> ] <attr-modifier>? ']'
fn parse_attribute_selector(input: Span) -> IResult<Span, Node> {
    let location = location_of(&input);

    let (input, _) = (char('['), multispace0).parse(input)?;
    let (input, name) = ident(input)?;
    let (input, _) = multispace0(input)?;
    let (input, matched) = opt((
        terminated(attr_matcher, multispace0),
        terminated(alt((quoted_string, ident)), multispace0),
        opt(terminated(ident, multispace0)),
    ))
    .parse(input)?;
    let (input, _) = char(']').parse(input)?;

    let node_type = match matched {
        Some((matcher, value, flags)) => NodeType::AttributeSelector {
            name,
            matcher: Some(matcher),
            value: Some(value),
            flags,
        },
        None => NodeType::AttributeSelector {
            name,
            matcher: None,
            value: None,
            flags: None,
        },
    };

    Ok((input, Node::new(node_type, location)))
}

/// <pseudo-element-selector> = ':' <pseudo-class-selector>
fn parse_pseudo_element_selector(input: Span) -> IResult<Span, Node> {
    let location = location_of(&input);

    let (input, value) = alt((
        preceded(tag("::"), ident),
        preceded(
            char(':'),
            verify(ident, |name: &str| {
                LEGACY_PSEUDO_ELEMENTS.contains(&name.to_ascii_lowercase().as_str())
            }),
        ),
    ))
    .parse(input)?;

    Ok((input, Node::new(NodeType::PseudoElementSelector { value }, location)))
}

/// <pseudo-class-selector> = ':' <ident-token> | ':' <function-token> <any-value> ')'
///
/// Selector arguments nested deeper than `css3.selectors.max_nesting` fail with
/// [`ErrorKind::TooLarge`] before they are parsed.
fn parse_pseudo_class_selector(input: Span, depth: usize) -> IResult<Span, Node> {
    let location = location_of(&input);

    let (input, name) = preceded(char(':'), ident).parse(input)?;
    let (input, argument) = opt(delimited(char('('), balanced_argument, char(')'))).parse(input)?;

    let mut selectors = None;
    if let Some(argument) = argument {
        if SELECTOR_ARGUMENT_PSEUDO_CLASSES.contains(&name.to_ascii_lowercase().as_str()) {
            if depth + 1 > config!(uint "css3.selectors.max_nesting") {
                return Err(nom::Err::Failure(Error::new(argument, ErrorKind::TooLarge)));
            }

            // A broken selector argument fails the whole selector
            let (_, list) = all_consuming(|i| nested_selector_list(i, depth + 1))
                .parse(argument)
                .map_err(|err| match err {
                    nom::Err::Error(e) | nom::Err::Failure(e) => nom::Err::Failure(e),
                    incomplete => incomplete,
                })?;
            selectors = Some(list);
        }
    }

    let argument = argument.map(|arg| arg.fragment().trim().to_string());
    Ok((
        input,
        Node::new(
            NodeType::PseudoClassSelector {
                name,
                argument,
                selectors,
            },
            location,
        ),
    ))
}

/// Takes everything up to the `)` that closes the current function, skipping over nested
/// parentheses and quoted strings.
fn balanced_argument(input: Span) -> IResult<Span, Span> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (idx, ch) in input.fragment().char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') if depth == 0 => return Ok(input.take_split(idx)),
            (None, ')') => depth -= 1,
            _ => {}
        }
    }

    Err(nom::Err::Error(Error::new(input, ErrorKind::TakeUntil)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_selector;
    use test_case::test_case;

    fn parsed(source: &str) -> Node {
        parse_selector(source).unwrap()
    }

    #[test_case("div" ; "type")]
    #[test_case("*" ; "universal")]
    #[test_case("#main" ; "id")]
    #[test_case(".a.b" ; "classes")]
    #[test_case("div > span" ; "child")]
    #[test_case("a b" ; "descendant")]
    #[test_case("h1 + p ~ ul" ; "siblings")]
    #[test_case("[a|=\"b\"]" ; "dash match")]
    #[test_case("[lang^=\"en\" i]" ; "case flag")]
    #[test_case(":not(.a, #b)" ; "negation")]
    #[test_case("li:nth-child(2n + 1)" ; "nth")]
    #[test_case("p::before" ; "pseudo element")]
    #[test_case("svg|rect" ; "namespace")]
    #[test_case("div, span" ; "list")]
    fn roundtrips_through_display(source: &str) {
        assert_eq!(parsed(source).to_string(), source);
    }

    #[test]
    fn combinators_nest_to_the_left() {
        let node = parsed("a > b c");
        let list = node.as_selector_list().unwrap();
        assert_eq!(list.len(), 1);

        let (left, combinator, right) = list[0].as_complex_selector().unwrap();
        assert_eq!(combinator, " ");
        assert!(right.is_compound_selector());

        let (first, combinator, second) = left.as_complex_selector().unwrap();
        assert_eq!(combinator, ">");
        assert_eq!(first.to_string(), "a");
        assert_eq!(second.to_string(), "b");
    }

    #[test]
    fn whitespace_around_list_and_combinators() {
        let node = parsed("  a>b ,c  ");
        let list = node.as_selector_list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].to_string(), "a > b");
    }

    #[test]
    fn legacy_pseudo_element() {
        let node = parsed("p:after");
        assert_eq!(node.to_string(), "p::after");
    }

    #[test]
    fn unknown_attribute_operator_is_kept() {
        let node = parsed("[a!=b]");
        assert_eq!(node.to_string(), "[a!=\"b\"]");
    }

    #[test]
    fn not_argument_is_parsed() {
        let node = parsed(":not(div > p)");
        let list = node.as_selector_list().unwrap();
        let compound = list[0].as_compound_selector().unwrap();
        match compound[0].node_type.as_ref() {
            NodeType::PseudoClassSelector { selectors, .. } => {
                let inner = selectors.as_ref().unwrap().as_selector_list().unwrap();
                assert!(inner[0].is_complex_selector());
            }
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test_case("" ; "empty")]
    #[test_case("div >" ; "dangling combinator")]
    #[test_case("a,,b" ; "empty list entry")]
    #[test_case("[a=]" ; "missing value")]
    #[test_case(":not(>)" ; "broken negation")]
    #[test_case("1abc" ; "digit ident")]
    #[test_case(".a)" ; "trailing garbage")]
    fn rejects(source: &str) {
        assert!(parse_selector(source).is_err());
    }

    #[test]
    fn nesting_limit_stops_the_parser() {
        let nested = |levels: usize| format!("{}.a{}", ":not(".repeat(levels), ")".repeat(levels));

        assert!(parse_selector(&nested(3)).is_ok());

        let err = parse_selector(&nested(5000)).unwrap_err();
        assert!(err.message.contains("nested deeper"));
    }

    #[test]
    fn error_location() {
        let err = parse_selector("div {").unwrap_err();
        assert_eq!(err.location.map(|l| l.offset), Some(4));
    }
}
