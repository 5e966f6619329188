//! Element attributes and the bookkeeping that runs whenever one changes.

use crate::document::document_impl::{validate_and_extract, validate_name, DocumentImpl};
use crate::errors::Error;
use crate::node::data::element::{Attr, AttrList, ClassListImpl, ElementData};
use crate::node::node_impl::NodeImpl;
use cow_utils::CowUtils;
use gosub_shared::node::NodeId;
use gosub_shared::ordered::OrderedSet;
use gosub_shared::traits::document::Document;
use gosub_shared::traits::node::Node;
use gosub_shared::types::Result;
use std::borrow::Cow;
use std::rc::Rc;

/// A single attribute change, as seen by observers
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeChange<'a> {
    pub element: NodeId,
    pub namespace: Option<&'a str>,
    pub local_name: &'a str,
    /// `None` when the attribute was added
    pub old_value: Option<&'a str>,
    /// `None` when the attribute was removed
    pub new_value: Option<&'a str>,
}

/// Receives every attribute change of a document after the document has updated its own state.
/// Observers are called while the document is borrowed and must not access it.
pub trait AttributeObserver {
    fn attribute_changed(&self, change: &AttributeChange<'_>);
}

impl<F> AttributeObserver for F
where
    F: Fn(&AttributeChange<'_>),
{
    fn attribute_changed(&self, change: &AttributeChange<'_>) {
        self(change)
    }
}

impl DocumentImpl {
    pub fn add_attribute_observer(&mut self, observer: Rc<dyn AttributeObserver>) {
        self.attribute_observers.push(observer);
    }

    fn element_or_error(&self, node_id: NodeId) -> Result<&ElementData> {
        let node = self.existing(node_id)?;
        node.get_element_data().ok_or_else(|| {
            Error::InvalidNodeType(format!("node {node_id} is not an element")).into()
        })
    }

    fn element_mut(&mut self, node_id: NodeId) -> Option<&mut ElementData> {
        self.node_mut(node_id).and_then(NodeImpl::get_element_data_mut)
    }

    /// HTML elements in HTML documents match attribute names case-insensitively
    fn normalize_name<'a>(&self, element: &ElementData, name: &'a str) -> Cow<'a, str> {
        if element.is_html() && self.is_html() {
            name.cow_to_ascii_lowercase()
        } else {
            Cow::Borrowed(name)
        }
    }

    /// All attributes of the element, `None` for non-elements
    pub fn attributes(&self, node_id: NodeId) -> Option<&AttrList> {
        self.element_data(node_id).map(ElementData::attributes)
    }

    /// Value of the first attribute with the given qualified name
    pub fn get_attribute(&self, node_id: NodeId, name: &str) -> Option<&str> {
        let element = self.element_data(node_id)?;
        let name = self.normalize_name(element, name);
        element
            .attributes
            .get(&name)
            .map(|attr| attr.value.as_str())
    }

    pub fn get_attribute_ns(
        &self,
        node_id: NodeId,
        namespace: Option<&str>,
        local_name: &str,
    ) -> Option<&str> {
        let namespace = namespace.filter(|ns| !ns.is_empty());
        self.element_data(node_id)?
            .attributes
            .get_ns(namespace, local_name)
            .map(|attr| attr.value.as_str())
    }

    pub fn has_attribute(&self, node_id: NodeId, name: &str) -> bool {
        self.get_attribute(node_id, name).is_some()
    }

    /// Sets the attribute with the given qualified name, creating it in the null namespace when it
    /// does not exist yet
    pub fn set_attribute(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let element = self.element_or_error(node_id)?;
        validate_name(name)?;
        let name = self.normalize_name(element, name).into_owned();

        let attr = match element.attributes.get(&name) {
            Some(existing) => Attr {
                value: value.to_owned(),
                ..existing.clone()
            },
            None => Attr {
                owner: Some(node_id),
                ..Attr::new(&name, value)
            },
        };

        self.change_attribute(node_id, attr);
        Ok(())
    }

    pub fn set_attribute_ns(
        &mut self,
        node_id: NodeId,
        namespace: Option<&str>,
        qualified_name: &str,
        value: &str,
    ) -> Result<()> {
        self.element_or_error(node_id)?;
        let (namespace, prefix, local_name) = validate_and_extract(namespace, qualified_name)?;

        let attr = Attr {
            namespace: namespace.map(str::to_owned),
            prefix: prefix.map(str::to_owned),
            owner: Some(node_id),
            ..Attr::new(local_name, value)
        };

        self.change_attribute(node_id, attr);
        Ok(())
    }

    /// Removes the first attribute with the given qualified name. Missing attributes are ignored.
    pub fn remove_attribute(&mut self, node_id: NodeId, name: &str) -> Result<()> {
        let element = self.element_or_error(node_id)?;
        let name = self.normalize_name(element, name).into_owned();

        let removed = self
            .element_mut(node_id)
            .and_then(|element| element.attributes.remove(&name));
        if let Some(attr) = removed {
            self.handle_attribute_changes(
                node_id,
                attr.namespace.as_deref(),
                &attr.local_name,
                Some(attr.value.as_str()),
                None,
            );
        }

        Ok(())
    }

    pub fn remove_attribute_ns(
        &mut self,
        node_id: NodeId,
        namespace: Option<&str>,
        local_name: &str,
    ) -> Result<()> {
        self.element_or_error(node_id)?;
        let namespace = namespace.filter(|ns| !ns.is_empty());

        let removed = self
            .element_mut(node_id)
            .and_then(|element| element.attributes.remove_ns(namespace, local_name));
        if let Some(attr) = removed {
            self.handle_attribute_changes(
                node_id,
                attr.namespace.as_deref(),
                &attr.local_name,
                Some(attr.value.as_str()),
                None,
            );
        }

        Ok(())
    }

    /// Adds the attribute when it is missing and removes it when present. `force` only allows one
    /// of the two directions. Returns whether the attribute is present afterwards.
    pub fn toggle_attribute(
        &mut self,
        node_id: NodeId,
        name: &str,
        force: Option<bool>,
    ) -> Result<bool> {
        self.element_or_error(node_id)?;

        if self.has_attribute(node_id, name) {
            if force == Some(true) {
                return Ok(true);
            }
            self.remove_attribute(node_id, name)?;
            return Ok(false);
        }

        if force == Some(false) {
            return Ok(false);
        }
        self.set_attribute(node_id, name, "")?;
        Ok(true)
    }

    fn change_attribute(&mut self, node_id: NodeId, attr: Attr) {
        let namespace = attr.namespace.clone();
        let local_name = attr.local_name.clone();
        let value = attr.value.clone();

        let Some(element) = self.element_mut(node_id) else {
            return;
        };
        let old_value = element.attributes.set(attr);

        self.handle_attribute_changes(
            node_id,
            namespace.as_deref(),
            &local_name,
            old_value.as_deref(),
            Some(value.as_str()),
        );
    }

    /// Runs the attribute change steps: class list, id index and slot bookkeeping, then observers
    fn handle_attribute_changes(
        &mut self,
        node_id: NodeId,
        namespace: Option<&str>,
        local_name: &str,
        old_value: Option<&str>,
        new_value: Option<&str>,
    ) {
        if namespace.is_none() {
            match local_name {
                "class" => {
                    if let Some(element) = self.element_mut(node_id) {
                        element.class_list = ClassListImpl::from(new_value.unwrap_or_default());
                    }
                }
                "id" => self.update_id_index(node_id, old_value, new_value),
                "name" if self.is_slot_id(node_id) => {
                    if !same_slot_name(old_value, new_value) {
                        self.assign_slottables_for_tree(self.root(node_id));
                    }
                }
                "slot" => {
                    if !same_slot_name(old_value, new_value) {
                        let assigned = self
                            .node_by_id(node_id)
                            .and_then(|node| node.internals.assigned_slot);
                        if let Some(slot) = assigned {
                            self.assign_slottables(slot);
                        }
                        self.assign_a_slot(node_id);
                    }
                }
                _ => {}
            }
        }

        if self.attribute_observers.is_empty() {
            return;
        }

        let change = AttributeChange {
            element: node_id,
            namespace,
            local_name,
            old_value,
            new_value,
        };
        for observer in self.attribute_observers.clone() {
            observer.attribute_changed(&change);
        }
    }

    fn update_id_index(&mut self, node_id: NodeId, old: Option<&str>, new: Option<&str>) {
        if let Some(old) = old.filter(|id| !id.is_empty()) {
            if let Some(nodes) = self.named_id_elements.get_mut(old) {
                nodes.remove(&node_id);
                if nodes.is_empty() {
                    self.named_id_elements.remove(old);
                }
            }
        }

        if let Some(new) = new.filter(|id| !id.is_empty()) {
            self.named_id_elements
                .entry(new.to_owned())
                .or_insert_with(OrderedSet::new)
                .append(node_id);
        }
    }
}

/// A missing attribute and an empty one name the same (default) slot
fn same_slot_name(old: Option<&str>, new: Option<&str>) -> bool {
    old.unwrap_or_default() == new.unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SVG_NAMESPACE;
    use gosub_shared::traits::node::{ClassList, ElementDataType, Node};
    use std::cell::RefCell;

    #[test]
    fn set_get_remove() {
        let mut doc = DocumentImpl::default();
        let div = doc.create_element("div").unwrap();

        assert_eq!(doc.get_attribute(div, "title"), None);
        doc.set_attribute(div, "title", "hello").unwrap();
        assert_eq!(doc.get_attribute(div, "title"), Some("hello"));
        assert_eq!(doc.get_attribute(div, "TITLE"), Some("hello"));
        assert!(doc.has_attribute(div, "title"));

        doc.set_attribute(div, "Title", "again").unwrap();
        assert_eq!(doc.attributes(div).map(AttrList::len), Some(1));
        assert_eq!(doc.get_attribute(div, "title"), Some("again"));

        doc.remove_attribute(div, "title").unwrap();
        assert!(!doc.has_attribute(div, "title"));
        doc.remove_attribute(div, "title").unwrap();
    }

    #[test]
    fn attributes_keep_insertion_order() {
        let mut doc = DocumentImpl::default();
        let div = doc.create_element("div").unwrap();
        doc.set_attribute(div, "b", "1").unwrap();
        doc.set_attribute(div, "a", "2").unwrap();
        doc.set_attribute(div, "b", "3").unwrap();

        let names: Vec<_> = doc
            .attributes(div)
            .unwrap()
            .iter()
            .map(|attr| (attr.local_name.as_str(), attr.value.as_str(), attr.owner))
            .collect();
        assert_eq!(names, [("b", "3", Some(div)), ("a", "2", Some(div))]);
    }

    #[test]
    fn non_elements_are_rejected() {
        let mut doc = DocumentImpl::default();
        let text = doc.create_text_node("x");

        let err = doc.set_attribute(text, "a", "b").unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidNodeType(_))));
        assert!(doc.attributes(text).is_none());
        assert_eq!(doc.get_attribute(text, "a"), None);
    }

    #[test]
    fn invalid_names() {
        let mut doc = DocumentImpl::default();
        let div = doc.create_element("div").unwrap();
        let err = doc.set_attribute(div, "a b", "x").unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidCharacter(_))));
    }

    #[test]
    fn namespaced_attributes() {
        let mut doc = DocumentImpl::default();
        let svg = doc.create_element_ns(Some(SVG_NAMESPACE), "svg").unwrap();
        let xlink = crate::node::XLINK_NAMESPACE;

        doc.set_attribute_ns(svg, Some(xlink), "xlink:href", "#a").unwrap();
        doc.set_attribute(svg, "viewBox", "0 0 1 1").unwrap();

        assert_eq!(doc.get_attribute_ns(svg, Some(xlink), "href"), Some("#a"));
        assert_eq!(doc.get_attribute(svg, "xlink:href"), Some("#a"));
        assert_eq!(doc.get_attribute(svg, "href"), None);
        // names on foreign elements keep their case
        assert_eq!(doc.get_attribute(svg, "viewBox"), Some("0 0 1 1"));
        assert_eq!(doc.get_attribute(svg, "viewbox"), None);

        doc.remove_attribute_ns(svg, Some(xlink), "href").unwrap();
        assert_eq!(doc.attributes(svg).map(AttrList::len), Some(1));
        assert!(doc.set_attribute_ns(svg, None, "x:y", "z").is_err());
    }

    #[test]
    fn toggle() {
        let mut doc = DocumentImpl::default();
        let div = doc.create_element("div").unwrap();

        assert!(doc.toggle_attribute(div, "hidden", None).unwrap());
        assert_eq!(doc.get_attribute(div, "hidden"), Some(""));
        assert!(doc.toggle_attribute(div, "hidden", Some(true)).unwrap());
        assert!(!doc.toggle_attribute(div, "hidden", None).unwrap());
        assert!(!doc.toggle_attribute(div, "hidden", Some(false)).unwrap());
        assert!(!doc.has_attribute(div, "hidden"));
    }

    #[test]
    fn class_list_follows_attribute() {
        let mut doc = DocumentImpl::default();
        let div = doc.create_element("div").unwrap();
        doc.set_attribute(div, "class", "a b a").unwrap();

        let classes = doc.element_data(div).unwrap().classlist();
        assert_eq!(classes.as_vec(), vec!["a", "b"]);

        doc.remove_attribute(div, "class").unwrap();
        assert!(doc.element_data(div).unwrap().classlist().is_empty());
    }

    #[test]
    fn id_index() {
        let mut doc = DocumentImpl::default();
        let html = doc.create_element("html").unwrap();
        let first = doc.create_element("p").unwrap();
        let second = doc.create_element("p").unwrap();
        doc.append_child(NodeId::root(), html).unwrap();
        doc.append_child(html, second).unwrap();
        doc.insert_before(html, first, Some(second)).unwrap();

        doc.set_attribute(second, "id", "x").unwrap();
        assert_eq!(doc.element_by_id("x"), Some(second));

        // tree order wins over the order the ids were set in
        doc.set_attribute(first, "id", "x").unwrap();
        assert_eq!(doc.element_by_id("x"), Some(first));

        doc.set_attribute(first, "id", "y").unwrap();
        assert_eq!(doc.element_by_id("x"), Some(second));
        assert_eq!(doc.element_by_id("y"), Some(first));

        // disconnected elements are not found
        doc.remove(first).unwrap();
        assert_eq!(doc.element_by_id("y"), None);
        assert_eq!(doc.node_by_id(first).and_then(Node::parent_id), None);
    }

    #[test]
    fn observers_see_changes() {
        let mut doc = DocumentImpl::default();
        let div = doc.create_element("div").unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        doc.add_attribute_observer(Rc::new(move |change: &AttributeChange<'_>| {
            log.borrow_mut().push((
                change.local_name.to_string(),
                change.old_value.map(str::to_string),
                change.new_value.map(str::to_string),
            ));
        }));

        doc.set_attribute(div, "title", "a").unwrap();
        doc.set_attribute(div, "title", "b").unwrap();
        doc.remove_attribute(div, "title").unwrap();

        assert_eq!(
            *seen.borrow(),
            [
                ("title".to_string(), None, Some("a".to_string())),
                ("title".to_string(), Some("a".to_string()), Some("b".to_string())),
                ("title".to_string(), Some("b".to_string()), None),
            ]
        );
    }
}
