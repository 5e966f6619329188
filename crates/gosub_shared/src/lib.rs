//! Shared functionality
//!
//! This crate supplies the types that every gosub DOM crate agrees on: node identifiers, the shared
//! error and result types, the ordered set and list primitives and the traits the selector matcher
//! is written against.
//!

pub mod document;
pub mod errors;
pub mod node;
pub mod ordered;
pub mod traits;
pub mod types;
