/// Data structure for the document node
#[derive(Debug, PartialEq, Clone, Default)]
pub struct DocumentData {
    /// Content type the document was created for
    pub content_type: String,
}

impl DocumentData {
    #[must_use]
    pub(crate) fn new(content_type: &str) -> Self {
        Self {
            content_type: content_type.to_owned(),
        }
    }

    /// HTML documents lowercase element and attribute names on creation and lookup
    pub fn is_html(&self) -> bool {
        self.content_type == "text/html"
    }
}
