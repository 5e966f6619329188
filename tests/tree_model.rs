use gosub_webdom::prelude::*;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Builds `<html><head/><body><div><p/><p/></div><span/></body></html>` and returns the element
/// ids in creation order
fn page(doc: &mut DocumentImpl) -> Vec<NodeId> {
    let names = ["html", "head", "body", "div", "p", "p", "span"];
    let ids: Vec<_> = names
        .iter()
        .map(|name| doc.create_element(name).unwrap())
        .collect();

    doc.append_child(NodeId::root(), ids[0]).unwrap();
    for (parent, child) in [(0, 1), (0, 2), (2, 3), (3, 4), (3, 5), (2, 6)] {
        doc.append_child(ids[parent], ids[child]).unwrap();
    }
    ids
}

fn error_of<T: std::fmt::Debug>(result: Result<T>) -> DomError {
    result
        .unwrap_err()
        .downcast_ref::<DomError>()
        .cloned()
        .unwrap()
}

#[test]
fn tree_order_matches_descendant_iteration() {
    let mut doc = DocumentImpl::default();
    let ids = page(&mut doc);

    let order: Vec<_> = doc.descendants(NodeId::root()).collect();
    assert_eq!(order, ids);

    for (i, a) in order.iter().enumerate() {
        for (j, b) in order.iter().enumerate() {
            assert_eq!(doc.tree_order(*a, *b), Some(i.cmp(&j)));
            assert_eq!(doc.is_preceding(*a, *b), i < j);
            assert_eq!(doc.is_following(*a, *b), i > j);
        }
    }

    let detached = doc.create_element("div").unwrap();
    assert_eq!(doc.tree_order(ids[0], detached), None);
    assert_eq!(doc.tree_order(detached, detached), Some(Ordering::Equal));
}

#[test]
fn preceding_and_following_walk_the_whole_tree() {
    let mut doc = DocumentImpl::default();
    let ids = page(&mut doc);

    let forward: Vec<_> = doc.following_nodes(NodeId::root()).collect();
    assert_eq!(forward, ids);

    let mut backward: Vec<_> = doc.preceding_nodes(ids[6]).collect();
    backward.reverse();
    assert_eq!(backward[0], NodeId::root());
    assert_eq!(&backward[1..], &ids[..6]);
}

#[test]
fn insertion_never_creates_cycles() {
    let mut doc = DocumentImpl::default();
    let ids = page(&mut doc);

    assert!(matches!(
        error_of(doc.append_child(ids[3], ids[2])),
        DomError::HierarchyRequest(_)
    ));
    assert!(matches!(
        error_of(doc.append_child(ids[3], ids[3])),
        DomError::HierarchyRequest(_)
    ));
    assert_eq!(doc.parent(ids[2]), Some(ids[0]));

    for node in doc.descendants(NodeId::root()) {
        assert!(!doc.is_ancestor_of(node, node));
        let ancestors: HashSet<_> = doc.ancestors(node).collect();
        assert_eq!(ancestors.len(), doc.ancestors(node).count());
    }
}

#[test]
fn moving_a_node_detaches_it_first() {
    let mut doc = DocumentImpl::default();
    let ids = page(&mut doc);

    doc.append_child(ids[6], ids[4]).unwrap();
    assert_eq!(doc.children(ids[3]), &[ids[5]]);
    assert_eq!(doc.children(ids[6]), &[ids[4]]);
    assert_eq!(doc.parent(ids[4]), Some(ids[6]));

    doc.insert_before(ids[3], ids[4], Some(ids[5])).unwrap();
    assert_eq!(doc.children(ids[3]), &[ids[4], ids[5]]);
    assert!(doc.children(ids[6]).is_empty());
}

#[test]
fn document_children_are_validated() {
    let mut doc = DocumentImpl::default();
    let ids = page(&mut doc);

    let second_root = doc.create_element("html").unwrap();
    assert!(matches!(
        error_of(doc.append_child(NodeId::root(), second_root)),
        DomError::HierarchyRequest(_)
    ));

    let text = doc.create_text_node("loose");
    assert!(matches!(
        error_of(doc.append_child(NodeId::root(), text)),
        DomError::HierarchyRequest(_)
    ));

    let stranger = doc.create_element("div").unwrap();
    assert!(matches!(
        error_of(doc.insert_before(ids[2], stranger, Some(ids[4]))),
        DomError::NotFound(_)
    ));
}

#[test]
fn fragments_insert_their_children() {
    let mut doc = DocumentImpl::default();
    let ids = page(&mut doc);

    let fragment = doc.create_document_fragment();
    let a = doc.create_text_node("a");
    let b = doc.create_element("b").unwrap();
    doc.append_child(fragment, a).unwrap();
    doc.append_child(fragment, b).unwrap();

    doc.append_child(ids[6], fragment).unwrap();
    assert_eq!(doc.children(ids[6]), &[a, b]);
    assert!(doc.children(fragment).is_empty());
    assert_eq!(doc.text_content(ids[6]).as_deref(), Some("a"));
}

#[test]
fn replace_and_remove() {
    let mut doc = DocumentImpl::default();
    let ids = page(&mut doc);

    let replacement = doc.create_element("section").unwrap();
    doc.replace_child(ids[3], replacement, ids[4]).unwrap();
    assert_eq!(doc.children(ids[3]), &[replacement, ids[5]]);
    assert_eq!(doc.parent(ids[4]), None);

    doc.remove(ids[3]).unwrap();
    assert!(!doc.is_connected(ids[5]));
    assert_eq!(doc.root(ids[5]), ids[3]);
    doc.remove(ids[3]).unwrap();

    assert!(matches!(
        error_of(doc.remove_child(ids[2], ids[3])),
        DomError::NotFound(_)
    ));
}

#[test]
fn ids_are_indexed_for_connected_elements() {
    let handle = DocumentBuilderImpl::new_document();
    let mut doc = handle.get_mut();
    let ids = page(&mut doc);

    doc.set_attribute(ids[5], "id", "target").unwrap();
    assert_eq!(doc.element_by_id("target"), Some(ids[5]));

    doc.set_attribute(ids[4], "id", "target").unwrap();
    assert_eq!(doc.element_by_id("target"), Some(ids[4]));

    doc.remove(ids[4]).unwrap();
    assert_eq!(doc.element_by_id("target"), Some(ids[5]));

    doc.remove_attribute(ids[5], "id").unwrap();
    assert_eq!(doc.element_by_id("target"), None);
}
