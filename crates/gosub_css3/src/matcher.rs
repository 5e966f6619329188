//! Selector matching against any tree that implements the shared document traits.

pub mod matching;

pub use matching::{
    match_complex_selector, match_compound_selector, match_selector_list, match_simple_selector,
};
