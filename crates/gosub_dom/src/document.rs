pub mod attributes;
pub mod builder;
pub mod document_impl;
pub mod mutation;
pub mod query;
pub mod tree;

pub use document_impl::DocumentImpl;
