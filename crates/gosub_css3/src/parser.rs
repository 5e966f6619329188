//! Selector parser.
//!
//! The grammar follows <https://www.w3.org/TR/selectors-4/#grammar>, restricted to what the
//! matcher understands. Parsing works directly on the source text with nom; every AST node keeps
//! the location it was found at.

use crate::node::Node;
use gosub_config::config;
use gosub_shared::errors::{CssError, CssResult};
use gosub_shared::types::Location;
use nom::combinator::all_consuming;
use nom::error::ErrorKind;
use nom::Parser;
use nom_locate::LocatedSpan;

pub(crate) mod anplusb;
pub(crate) mod selector;

/// Input type of all parser functions
pub type Span<'a> = LocatedSpan<&'a str>;

/// Location of the start of the given span
pub(crate) fn location_of(span: &Span) -> Location {
    Location::new(
        span.location_line() as usize,
        span.get_utf8_column(),
        span.location_offset(),
    )
}

/// Parses a complete selector list into its syntax tree
pub fn parse_selector(source: &str) -> CssResult<Node> {
    log::trace!("parse_selector: {source}");

    match all_consuming(selector::parse_selector_list).parse(Span::new(source)) {
        Ok((_, node)) => Ok(node),
        Err(nom::Err::Failure(err)) if err.code == ErrorKind::TooLarge => {
            Err(CssError::with_location(
                &format!(
                    "selector arguments nested deeper than {} levels",
                    config!(uint "css3.selectors.max_nesting")
                ),
                location_of(&err.input),
            ))
        }
        Err(nom::Err::Error(err) | nom::Err::Failure(err)) => Err(CssError::with_location(
            &format!("invalid selector '{source}'"),
            location_of(&err.input),
        )),
        Err(nom::Err::Incomplete(_)) => Err(CssError::new("incomplete selector")),
    }
}
