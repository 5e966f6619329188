//! Traits the selector engine is written against. The DOM implementation lives in `gosub_dom`.

pub mod document;
pub mod node;
