//! CSS selector parsing and matching.
//!
//! Selectors are parsed with [`parser::parse_selector`] into a syntax tree of [`node::Node`]s,
//! converted into a [`selector::SelectorList`] and evaluated against any tree that implements the
//! document traits from `gosub_shared`.

use crate::convert::convert_ast_to_selector_list;
use crate::selector::SelectorList;
use gosub_shared::errors::CssResult;
use gosub_shared::node::NodeId;
use gosub_shared::traits::document::Document;

pub mod convert;
pub mod matcher;
pub mod node;
pub mod parser;
pub mod selector;

pub struct Css3;

impl Css3 {
    /// Parses a selector list like `div > p.note, #main` into its matchable form
    pub fn parse_selector(source: &str) -> CssResult<SelectorList> {
        let ast = parser::parse_selector(source)?;
        convert_ast_to_selector_list(&ast)
    }

    /// Parses the selector and matches it against a single node
    pub fn matches<D: Document>(doc: &D, node_id: NodeId, source: &str) -> CssResult<bool> {
        let list = Self::parse_selector(source)?;
        matcher::match_selector_list(doc, node_id, &list)
    }
}
