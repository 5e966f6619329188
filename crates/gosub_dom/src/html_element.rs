//! Element accessors for HTML elements.
//!
//! Properties that mirror a content attribute are generated by `reflect!` and go through
//! [`reflect_get`]/[`reflect_set`].

use crate::errors::Error;
use crate::node::data::fragment::{ShadowRootData, ShadowRootInit};
use crate::node::node_impl::NodeImpl;
use crate::reflect::{reflect_get, reflect_set, ReflectKind, ReflectValue};
use crate::DocumentHandle;
use gosub_shared::node::NodeId;
use gosub_shared::traits::document::Document;
use gosub_shared::types::Result;

macro_rules! reflect {
    ($(#[$meta:meta])* string $getter:ident / $setter:ident => $attr:literal) => {
        $(#[$meta])*
        pub fn $getter(&self) -> Result<String> {
            let value = reflect_get(&self.handle.get(), ReflectKind::DomString, self.node_id, $attr)?;
            Ok(value.into_string().unwrap_or_default())
        }

        pub fn $setter(&self, value: &str) -> Result<()> {
            reflect_set(
                &mut self.handle.get_mut(),
                self.node_id,
                $attr,
                ReflectValue::DomString(value.to_owned()),
            )
        }
    };
    ($(#[$meta:meta])* bool $getter:ident / $setter:ident => $attr:literal) => {
        $(#[$meta])*
        pub fn $getter(&self) -> Result<bool> {
            let value = reflect_get(&self.handle.get(), ReflectKind::Boolean, self.node_id, $attr)?;
            Ok(value.as_bool().unwrap_or_default())
        }

        pub fn $setter(&self, value: bool) -> Result<()> {
            reflect_set(
                &mut self.handle.get_mut(),
                self.node_id,
                $attr,
                ReflectValue::Boolean(value),
            )
        }
    };
}

/// An element in the HTML namespace
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlElement {
    handle: DocumentHandle,
    node_id: NodeId,
}

impl HtmlElement {
    pub fn new(handle: DocumentHandle, node_id: NodeId) -> Result<Self> {
        let is_html = handle
            .get()
            .element_data(node_id)
            .is_some_and(|data| data.interface.is_html());
        if !is_html {
            return Err(Error::InvalidNodeType(format!("node {node_id} is not an HTML element")).into());
        }

        Ok(Self { handle, node_id })
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn handle(&self) -> &DocumentHandle {
        &self.handle
    }

    pub fn tag_name(&self) -> String {
        self.handle
            .get()
            .element_data(self.node_id)
            .map(|data| data.tag_name())
            .unwrap_or_default()
    }

    reflect!(string id / set_id => "id");
    reflect!(
        /// Reflects the `class` attribute
        string class_name / set_class_name => "class"
    );
    reflect!(string title / set_title => "title");
    reflect!(string lang / set_lang => "lang");
    reflect!(string dir / set_dir => "dir");
    reflect!(
        /// Name of the slot this element is assigned to in its parent's shadow tree
        string slot / set_slot => "slot"
    );
    reflect!(string access_key / set_access_key => "accesskey");
    reflect!(bool hidden / set_hidden => "hidden");
    reflect!(bool inert / set_inert => "inert");
    reflect!(bool autofocus / set_autofocus => "autofocus");

    pub fn attach_shadow(&self, init: ShadowRootInit) -> Result<NodeId> {
        self.handle.get_mut().attach_shadow(self.node_id, init)
    }

    /// Open shadow root of the element
    pub fn shadow_root(&self) -> Option<NodeId> {
        let doc = self.handle.get();
        doc.shadow_root(self.node_id).filter(|shadow_root| {
            doc.node_by_id(*shadow_root)
                .and_then(NodeImpl::get_shadow_root_data)
                .is_some_and(ShadowRootData::is_open)
        })
    }

    pub fn assigned_slot(&self) -> Option<NodeId> {
        self.handle.get().assigned_slot(self.node_id)
    }

    pub fn inner_text(&self) -> Result<String> {
        Err(Error::NotImplemented("HTMLElement.innerText needs layout").into())
    }

    pub fn offset_width(&self) -> Result<i32> {
        Err(Error::NotImplemented("HTMLElement.offsetWidth needs layout").into())
    }

    pub fn click(&self) -> Result<()> {
        Err(Error::NotImplemented("HTMLElement.click needs event dispatch").into())
    }
}

/// A `<slot>` element
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlSlotElement {
    element: HtmlElement,
}

impl HtmlSlotElement {
    pub fn new(handle: DocumentHandle, node_id: NodeId) -> Result<Self> {
        let is_slot = handle
            .get()
            .element_data(node_id)
            .is_some_and(|data| data.is_slot());
        if !is_slot {
            return Err(Error::InvalidNodeType(format!("node {node_id} is not a slot")).into());
        }

        Ok(Self {
            element: HtmlElement { handle, node_id },
        })
    }

    pub fn element(&self) -> &HtmlElement {
        &self.element
    }

    pub fn name(&self) -> Result<String> {
        let value = reflect_get(
            &self.element.handle.get(),
            ReflectKind::DomString,
            self.element.node_id,
            "name",
        )?;
        Ok(value.into_string().unwrap_or_default())
    }

    pub fn set_name(&self, name: &str) -> Result<()> {
        reflect_set(
            &mut self.element.handle.get_mut(),
            self.element.node_id,
            "name",
            ReflectValue::DomString(name.to_owned()),
        )
    }

    /// Manually assigns the given slottables to this slot
    pub fn assign(&self, nodes: &[NodeId]) -> Result<()> {
        self.element
            .handle
            .get_mut()
            .assign_slot_nodes(self.element.node_id, nodes)
    }

    pub fn assigned_nodes(&self, flatten: bool) -> Vec<NodeId> {
        self.element
            .handle
            .get()
            .assigned_nodes(self.element.node_id, flatten)
    }

    pub fn assigned_elements(&self, flatten: bool) -> Vec<NodeId> {
        self.element
            .handle
            .get()
            .assigned_elements(self.element.node_id, flatten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::builder::DocumentBuilderImpl;
    use crate::node::data::fragment::{ShadowRootMode, SlotAssignmentMode};
    use crate::node::SVG_NAMESPACE;

    fn element(name: &str) -> HtmlElement {
        let handle = DocumentBuilderImpl::new_document();
        let node_id = handle.get_mut().create_element(name).unwrap();
        HtmlElement::new(handle, node_id).unwrap()
    }

    #[test]
    fn string_properties_reflect_attributes() {
        let div = element("div");

        assert_eq!(div.id().unwrap(), "");
        div.set_id("main").unwrap();
        div.set_class_name("a b").unwrap();
        div.set_access_key("k").unwrap();
        assert_eq!(div.id().unwrap(), "main");
        assert_eq!(div.class_name().unwrap(), "a b");

        let doc = div.handle().get();
        assert_eq!(doc.get_attribute(div.node_id(), "class"), Some("a b"));
        assert_eq!(doc.get_attribute(div.node_id(), "accesskey"), Some("k"));
        assert_eq!(doc.element_by_id("main"), None);
    }

    #[test]
    fn boolean_properties_reflect_presence() {
        let div = element("div");

        assert!(!div.hidden().unwrap());
        div.set_hidden(true).unwrap();
        assert!(div.hidden().unwrap());
        assert_eq!(div.handle().get().get_attribute(div.node_id(), "hidden"), Some(""));

        div.set_hidden(false).unwrap();
        assert!(!div.hidden().unwrap());
        assert!(!div.handle().get().has_attribute(div.node_id(), "hidden"));
    }

    #[test]
    fn only_html_elements_are_wrapped() {
        let handle = DocumentBuilderImpl::new_document();
        let rect = handle
            .get_mut()
            .create_element_ns(Some(SVG_NAMESPACE), "rect")
            .unwrap();
        let text = handle.get_mut().create_text_node("x");

        assert!(HtmlElement::new(handle.clone(), rect).is_err());
        assert!(HtmlElement::new(handle.clone(), text).is_err());
        assert!(HtmlElement::new(handle, NodeId::root()).is_err());
        assert_eq!(element("section").tag_name(), "SECTION");
    }

    #[test]
    fn layout_dependent_members_are_not_implemented() {
        let div = element("div");

        let err = div.inner_text().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::NotImplemented(_))
        ));
        assert!(div.offset_width().is_err());
        assert!(div.click().is_err());
    }

    #[test]
    fn slot_element() {
        let handle = DocumentBuilderImpl::new_document();
        let (host, child, slot) = {
            let mut doc = handle.get_mut();
            let host = doc.create_element("div").unwrap();
            let child = doc.create_element("span").unwrap();
            doc.append_child(NodeId::root(), host).unwrap();
            doc.append_child(host, child).unwrap();
            let shadow = doc
                .attach_shadow(
                    host,
                    ShadowRootInit {
                        slot_assignment: SlotAssignmentMode::Manual,
                        ..Default::default()
                    },
                )
                .unwrap();
            let slot = doc.create_element("slot").unwrap();
            doc.append_child(shadow, slot).unwrap();
            (host, child, slot)
        };

        assert!(HtmlSlotElement::new(handle.clone(), host).is_err());
        let slot = HtmlSlotElement::new(handle.clone(), slot).unwrap();

        slot.set_name("main").unwrap();
        assert_eq!(slot.name().unwrap(), "main");
        assert!(slot.assigned_nodes(false).is_empty());

        slot.assign(&[child]).unwrap();
        assert_eq!(slot.assigned_nodes(false), [child]);
        assert_eq!(slot.assigned_elements(false), [child]);

        let span = HtmlElement::new(handle, child).unwrap();
        assert_eq!(span.assigned_slot(), Some(slot.element().node_id()));
    }

    #[test]
    fn closed_shadow_roots_are_hidden() {
        let open = element("div");
        let shadow = open.attach_shadow(ShadowRootInit::default()).unwrap();
        assert_eq!(open.shadow_root(), Some(shadow));

        let closed = element("div");
        closed
            .attach_shadow(ShadowRootInit {
                mode: ShadowRootMode::Closed,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(closed.shadow_root(), None);
        assert!(closed.attach_shadow(ShadowRootInit::default()).is_err());
    }
}
