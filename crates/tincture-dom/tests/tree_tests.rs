//! Integration tests for tree construction, traversal and the JSON view.

use tincture_dom::{DomTree, ElementData, NodeId, ROOT_ID, StyleMap};

fn element(tag: &str, classes: &[&str]) -> ElementData {
    ElementData {
        class_list: classes.iter().map(|c| (*c).to_string()).collect(),
        ..ElementData::new(tag)
    }
}

#[test]
fn test_new_tree_has_root_container() {
    let tree = DomTree::new();
    let root = tree.as_element(NodeId::ROOT).unwrap();
    assert_eq!(root.tag, "div");
    assert_eq!(root.id.as_deref(), Some(ROOT_ID));
    assert_eq!(tree.parent(NodeId::ROOT), None);
    assert_eq!(tree.element_by_id(ROOT_ID), Some(NodeId::ROOT));
}

#[test]
fn test_append_sets_parent_and_order() {
    let mut tree = DomTree::new();
    let ul = tree.append_element(NodeId::ROOT, element("ul", &[]));
    let a = tree.append_element(ul, element("li", &[]));
    let b = tree.append_element(ul, element("li", &[]));
    assert_eq!(tree.children(ul), &[a, b]);
    assert_eq!(tree.parent(b), Some(ul));
    assert_eq!(tree.ancestors(b).collect::<Vec<_>>(), vec![ul, NodeId::ROOT]);
}

#[test]
fn test_element_index_skips_text() {
    let mut tree = DomTree::new();
    let p = tree.append_element(NodeId::ROOT, element("p", &[]));
    let _ = tree.append_text(p, "lead ");
    let b = tree.append_element(p, element("b", &[]));
    let _ = tree.append_text(p, " tail");
    let i = tree.append_element(p, element("i", &[]));

    assert_eq!(tree.element_index(b), Some((0, 2)));
    assert_eq!(tree.element_index(i), Some((1, 2)));
    assert_eq!(tree.element_index(NodeId::ROOT), None);
}

#[test]
fn test_descendants_in_document_order() {
    let mut tree = DomTree::new();
    let a = tree.append_element(NodeId::ROOT, element("section", &[]));
    let b = tree.append_element(a, element("h1", &[]));
    let c = tree.append_text(b, "Title");
    let d = tree.append_element(NodeId::ROOT, element("footer", &[]));
    assert_eq!(tree.descendants(NodeId::ROOT), vec![a, b, c, d]);
    assert_eq!(tree.text_content(NodeId::ROOT), "Title");
}

#[test]
fn test_json_view_shape() {
    let mut tree = DomTree::new();
    let mut p = element("p", &["lead", "wide"]);
    p.inline_style = [("color", "red")].into_iter().collect::<StyleMap>();
    let _ = p.custom_attrs.insert("data-x".to_string(), "1".to_string());
    let p = tree.append_element(NodeId::ROOT, p);
    let _ = tree.append_text(p, "hi");

    let json = serde_json::to_value(tree.view(NodeId::ROOT)).unwrap();
    assert_eq!(json["element"], "div");
    assert_eq!(json["attributes"]["id"], "rootContainer");
    let child = &json["children"][0];
    assert_eq!(child["element"], "p");
    assert_eq!(child["attributes"]["classList"][1], "wide");
    assert_eq!(child["attributes"]["inlineStyle"]["color"], "red");
    assert_eq!(child["attributes"]["data-x"], "1");
    assert_eq!(child["children"][0]["element"], "text");
    assert_eq!(child["children"][0]["text"], "hi");
}
