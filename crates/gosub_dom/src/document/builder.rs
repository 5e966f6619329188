use crate::document::document_impl::DocumentImpl;
use crate::DocumentHandle;

/// This struct will be used to create a fully initialized document
pub struct DocumentBuilderImpl {}

impl DocumentBuilderImpl {
    /// Creates a new HTML document with only a document node
    pub fn new_document() -> DocumentHandle {
        DocumentHandle::create(DocumentImpl::new("text/html"))
    }

    /// Creates a new document for the given content type. Only `text/html` documents fold element
    /// and attribute names to lowercase.
    pub fn new_document_with_content_type(content_type: &str) -> DocumentHandle {
        DocumentHandle::create(DocumentImpl::new(content_type))
    }
}
