use super::*;
use crate::config::constants::NO_PARENT;

fn ids(nodes: &[MessageNode]) -> Vec<&str> {
    nodes
        .iter()
        .map(|n| n.message().message_id().unwrap_or_default())
        .collect()
}

#[test]
fn test_build_tree_empty() {
    assert!(build_tree(&[]).is_empty());
}

#[test]
fn test_build_tree_linear() {
    let messages = vec![
        Message::new_user("u1", "Hello").with_parent(NO_PARENT),
        Message::new_assistant("a1", "Hi").with_parent("u1"),
        Message::new_user("u2", "How are you?").with_parent("a1"),
    ];

    let tree = build_tree(&messages);
    assert_eq!(ids(&tree), vec!["u1"]);
    assert_eq!(ids(tree[0].children()), vec!["a1"]);
    assert_eq!(ids(tree[0].children()[0].children()), vec!["u2"]);
    assert_eq!(tree[0].children()[0].children()[0].depth(), 2);
    assert_eq!(tree[0].count(), 3);
}

#[test]
fn test_build_tree_siblings_keep_insertion_order() {
    let messages = vec![
        Message::new_user("u1", "Hello"),
        Message::new_assistant("a1", "first").with_parent("u1"),
        Message::new_assistant("a2", "second").with_parent("u1"),
        Message::new_assistant("a3", "third").with_parent("u1"),
    ];

    let tree = build_tree(&messages);
    let children = tree[0].children();
    assert_eq!(ids(children), vec!["a1", "a2", "a3"]);
    let positions: Vec<_> = children.iter().map(MessageNode::sibling_index).collect();
    assert_eq!(positions, vec![0, 1, 2]);
}

#[test]
fn test_build_tree_parent_after_child() {
    let messages = vec![
        Message::new_assistant("a1", "Hi").with_parent("u1"),
        Message::new_user("u1", "Hello"),
    ];

    let tree = build_tree(&messages);
    assert_eq!(ids(&tree), vec!["u1"]);
    assert_eq!(ids(tree[0].children()), vec!["a1"]);
}

#[test]
fn test_build_tree_orphans_become_roots() {
    let messages = vec![
        Message::new_user("u1", "Hello"),
        Message::new_assistant("a1", "Hi").with_parent("missing"),
        Message::new_user("u2", "Edited").with_parent(""),
    ];

    let tree = build_tree(&messages);
    assert_eq!(ids(&tree), vec!["u1", "a1", "u2"]);
    assert_eq!(tree[1].sibling_index(), 1);
    assert!(tree.iter().all(|n| n.depth() == 0));
}

#[test]
fn test_build_tree_without_ids() {
    let messages = vec![
        Message::new_user("u1", "Hello"),
        Message::default().with_text("anonymous").with_parent("u1"),
    ];

    let tree = build_tree(&messages);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].children().len(), 1);
    assert_eq!(tree[0].children()[0].message().text(), "anonymous");
}

#[test]
fn test_build_tree_duplicate_ids_first_wins() {
    let messages = vec![
        Message::new_user("u1", "first"),
        Message::new_user("u1", "duplicate"),
        Message::new_assistant("a1", "Hi").with_parent("u1"),
    ];

    let tree = build_tree(&messages);
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].message().text(), "first");
    assert_eq!(ids(tree[0].children()), vec!["a1"]);
    assert!(tree[1].children().is_empty());
}

#[test]
fn test_build_tree_skips_parent_loops() {
    let messages = vec![
        Message::new_user("u1", "Hello"),
        Message::new_assistant("x", "loop").with_parent("y"),
        Message::new_assistant("y", "loop").with_parent("x"),
        Message::new_assistant("self", "self").with_parent("self"),
    ];

    let tree = build_tree(&messages);
    assert_eq!(ids(&tree), vec!["u1", "self"]);
}
