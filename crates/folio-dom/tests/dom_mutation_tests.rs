//! Tests for DOM tree mutation methods: remove_child, insert_before/after,
//! move_children, cloning and text splitting.

use folio_dom::{DomError, DomTree, NodeId};

/// Helper to create an element node attached under `parent`.
fn element_under(tree: &mut DomTree, parent: NodeId, tag: &str) -> NodeId {
    let id = tree.create_element(tag);
    tree.append_child(parent, id);
    id
}

// ========== remove_child ==========

#[test]
fn test_remove_child_single_child() {
    let mut tree = DomTree::new();
    let parent = element_under(&mut tree, NodeId::ROOT, "div");
    let child = element_under(&mut tree, parent, "p");

    assert_eq!(tree.children(parent).len(), 1);

    tree.remove_child(parent, child).unwrap();

    assert_eq!(tree.children(parent).len(), 0);
    assert_eq!(tree.parent(child), None);
    assert_eq!(tree.prev_sibling(child), None);
    assert_eq!(tree.next_sibling(child), None);
}

#[test]
fn test_remove_child_middle_of_three() {
    let mut tree = DomTree::new();
    let parent = element_under(&mut tree, NodeId::ROOT, "div");
    let a = element_under(&mut tree, parent, "a");
    let b = element_under(&mut tree, parent, "b");
    let c = element_under(&mut tree, parent, "c");

    tree.remove_child(parent, b).unwrap();

    // a and c are siblings now
    assert_eq!(tree.children(parent), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(a));
}

#[test]
fn test_remove_child_rejects_stranger() {
    let mut tree = DomTree::new();
    let parent = element_under(&mut tree, NodeId::ROOT, "div");
    let other = element_under(&mut tree, NodeId::ROOT, "div");
    let child = element_under(&mut tree, other, "p");

    assert_eq!(
        tree.remove_child(parent, child),
        Err(DomError::NotAChild { parent, child })
    );
    // Nothing moved.
    assert_eq!(tree.parent(child), Some(other));
}

// ========== insert_before / insert_after / prepend ==========

#[test]
fn test_insert_before_first_child() {
    let mut tree = DomTree::new();
    let parent = element_under(&mut tree, NodeId::ROOT, "div");
    let existing = element_under(&mut tree, parent, "b");

    let new_child = tree.create_element("a");
    tree.insert_before(parent, new_child, existing).unwrap();

    assert_eq!(tree.children(parent), &[new_child, existing]);
    assert_eq!(tree.parent(new_child), Some(parent));
    assert_eq!(tree.next_sibling(new_child), Some(existing));
    assert_eq!(tree.prev_sibling(new_child), None);
    assert_eq!(tree.prev_sibling(existing), Some(new_child));
}

#[test]
fn test_insert_after_last_and_reorder_within_parent() {
    let mut tree = DomTree::new();
    let parent = element_under(&mut tree, NodeId::ROOT, "div");
    let a = element_under(&mut tree, parent, "a");
    let b = element_under(&mut tree, parent, "b");
    let c = element_under(&mut tree, parent, "c");

    // Moving `a` after `c` inside the same parent.
    tree.insert_after(parent, a, c).unwrap();
    assert_eq!(tree.children(parent), &[b, c, a]);
    assert_eq!(tree.next_sibling(a), None);
    assert_eq!(tree.prev_sibling(b), None);

    let d = tree.create_element("d");
    tree.prepend_child(parent, d);
    assert_eq!(tree.children(parent), &[d, b, c, a]);
}

#[test]
fn test_insert_before_missing_reference_fails() {
    let mut tree = DomTree::new();
    let parent = element_under(&mut tree, NodeId::ROOT, "div");
    let loose = tree.create_element("span");
    let new_child = tree.create_element("a");

    assert!(matches!(
        tree.insert_before(parent, new_child, loose),
        Err(DomError::NotAChild { .. })
    ));
    assert_eq!(tree.parent(new_child), None);
}

// ========== move_children ==========

#[test]
fn test_move_children_appends_to_existing() {
    let mut tree = DomTree::new();
    let from = element_under(&mut tree, NodeId::ROOT, "div");
    let to = element_under(&mut tree, NodeId::ROOT, "span");
    let existing = element_under(&mut tree, to, "x");
    let moved = element_under(&mut tree, from, "y");

    tree.move_children(from, to);

    assert_eq!(tree.children(from).len(), 0);
    assert_eq!(tree.children(to), &[existing, moved]);
    assert_eq!(tree.next_sibling(existing), Some(moved));
    assert_eq!(tree.prev_sibling(moved), Some(existing));
    assert_eq!(tree.parent(moved), Some(to));
}

// ========== cloning ==========

#[test]
fn test_clone_node_is_shallow_and_detached() {
    let mut tree = DomTree::new();
    let div = element_under(&mut tree, NodeId::ROOT, "div");
    tree.set_attribute(div, "class", "note").unwrap();
    let _child = element_under(&mut tree, div, "p");

    let copy = tree.clone_node(div);
    assert_eq!(tree.parent(copy), None);
    assert!(tree.children(copy).is_empty());
    assert_eq!(tree.get_attribute(copy, "class"), Some("note"));

    let deep = tree.deep_clone(div);
    assert_eq!(tree.children(deep).len(), 1);
    assert_ne!(tree.children(deep)[0], tree.children(div)[0]);
}

// ========== text ==========

#[test]
fn test_split_text_inserts_remainder_after() {
    let mut tree = DomTree::new();
    let p = element_under(&mut tree, NodeId::ROOT, "p");
    let text = tree.create_text("héllo world");
    tree.append_child(p, text);
    let tail_sibling = element_under(&mut tree, p, "b");

    let rest = tree.split_text(text, 6).unwrap();

    assert_eq!(tree.as_text(text), Some("héllo "));
    assert_eq!(tree.as_text(rest), Some("world"));
    assert_eq!(tree.children(p), &[text, rest, tail_sibling]);
}

#[test]
fn test_delete_and_set_text() {
    let mut tree = DomTree::new();
    let text = tree.create_text("abcdef");
    tree.delete_text(text, 1, 3).unwrap();
    assert_eq!(tree.as_text(text), Some("aef"));

    // Out-of-range counts clamp to the end.
    tree.delete_text(text, 2, 100).unwrap();
    assert_eq!(tree.as_text(text), Some("ae"));

    tree.set_text(text, "new").unwrap();
    assert_eq!(tree.as_text(text), Some("new"));

    let element = tree.create_element("p");
    assert_eq!(tree.set_text(element, "x"), Err(DomError::NotText(element)));
}

#[test]
fn test_document_element_and_body() {
    let mut tree = DomTree::new();
    let html = element_under(&mut tree, NodeId::ROOT, "HTML");
    let _head = element_under(&mut tree, html, "head");
    let body = element_under(&mut tree, html, "body");

    assert_eq!(tree.document_element(), Some(html));
    assert_eq!(tree.body(), Some(body));
    assert_eq!(tree.tag_name(html), Some("html"));
}
