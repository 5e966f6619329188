//! Conversion from the parsed syntax tree to the selector form used for matching.

pub mod ast_converter;

pub use ast_converter::convert_ast_to_selector_list;
