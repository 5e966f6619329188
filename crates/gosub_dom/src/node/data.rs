pub mod character;
pub mod doctype;
pub mod document;
pub mod element;
pub mod fragment;
