//! Error results that can be returned from the DOM
use gosub_shared::errors::CssError;
use thiserror::Error;

/// DOM exceptions and errors from the selector engine
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("hierarchy request: {0}")]
    HierarchyRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("not supported: {0}")]
    NotSupported(String),

    #[error("invalid node type: {0}")]
    InvalidNodeType(String),

    #[error("invalid character: {0}")]
    InvalidCharacter(String),

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("selector: {0}")]
    Selector(#[from] CssError),
}
