use crate::errors::Error;
use crate::DocumentHandle;
use gosub_css3::matcher::match_selector_list;
use gosub_css3::selector::SelectorList;
use gosub_css3::Css3;
use gosub_shared::node::NodeId;
use gosub_shared::traits::document::Document;
use gosub_shared::traits::node::Node;
use gosub_shared::types::Result;

/// Selector queries against a document
pub struct DocumentQuery {}

impl DocumentQuery {
    fn parse(selector: &str) -> Result<SelectorList> {
        Css3::parse_selector(selector).map_err(|err| Error::Selector(err).into())
    }

    /// First element in the subtree of `root` (excluding `root`) that matches the selector
    pub fn query_selector(
        doc_handle: &DocumentHandle,
        root: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>> {
        let list = Self::parse(selector)?;
        let doc = doc_handle.get();

        for node_id in doc.descendants(root) {
            if match_selector_list(&*doc, node_id, &list).map_err(Error::Selector)? {
                return Ok(Some(node_id));
            }
        }

        Ok(None)
    }

    /// All elements in the subtree of `root` (excluding `root`) that match the selector, in tree
    /// order
    pub fn query_selector_all(
        doc_handle: &DocumentHandle,
        root: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>> {
        let list = Self::parse(selector)?;
        let doc = doc_handle.get();

        let mut found_ids = Vec::new();
        for node_id in doc.descendants(root) {
            if match_selector_list(&*doc, node_id, &list).map_err(Error::Selector)? {
                found_ids.push(node_id);
            }
        }

        Ok(found_ids)
    }

    /// Returns true when the element matches the selector
    pub fn matches(doc_handle: &DocumentHandle, node_id: NodeId, selector: &str) -> Result<bool> {
        let list = Self::parse(selector)?;
        let doc = doc_handle.get();
        if !doc.node_by_id(node_id).is_some_and(|node| node.is_element_node()) {
            return Err(Error::InvalidNodeType(format!("node {node_id} is not an element")).into());
        }

        match_selector_list(&*doc, node_id, &list).map_err(|err| Error::Selector(err).into())
    }

    /// Nearest inclusive ancestor of the element that matches the selector
    pub fn closest(
        doc_handle: &DocumentHandle,
        node_id: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>> {
        let list = Self::parse(selector)?;
        let doc = doc_handle.get();

        for ancestor in doc.inclusive_ancestors(node_id) {
            if match_selector_list(&*doc, ancestor, &list).map_err(Error::Selector)? {
                return Ok(Some(ancestor));
            }
        }

        Ok(None)
    }
}
