#[cfg(test)]
#[path = "assemble_test.rs"]
mod tests;

use std::collections::HashMap;

use crate::models::Message;

use super::MessageNode;

/// Groups a flat list of messages into reply trees.
///
/// A message is a root when it has no parent, carries the "no parent"
/// sentinel, or points at a message that is not in `messages`. Replies keep
/// the order they have in `messages`. Parents may come after their replies
/// in the input. When two messages share an id, only the first one can have
/// replies attached.
///
/// Messages whose parents form a loop never reach a root and are left out.
pub fn build_tree(messages: &[Message]) -> Vec<MessageNode> {
    let mut position: HashMap<&str, usize> = HashMap::with_capacity(messages.len());
    for (i, message) in messages.iter().enumerate() {
        if let Some(id) = message.message_id() {
            position.entry(id).or_insert(i);
        }
    }

    let mut replies: Vec<Vec<usize>> = vec![vec![]; messages.len()];
    let mut roots = vec![];
    for (i, message) in messages.iter().enumerate() {
        match message.parent_id().and_then(|id| position.get(id)) {
            Some(&parent) if parent != i => replies[parent].push(i),
            _ => roots.push(i),
        }
    }

    let nodes: Vec<MessageNode> = roots
        .iter()
        .enumerate()
        .map(|(sibling, &i)| attach(messages, &replies, i, 0, sibling))
        .collect();

    let placed: usize = nodes.iter().map(MessageNode::count).sum();
    if placed < messages.len() {
        log::warn!(
            "{} of {} messages are not reachable from a root message",
            messages.len() - placed,
            messages.len()
        );
    }
    nodes
}

fn attach(
    messages: &[Message],
    replies: &[Vec<usize>],
    i: usize,
    depth: usize,
    sibling_index: usize,
) -> MessageNode {
    let children = replies[i]
        .iter()
        .enumerate()
        .map(|(sibling, &child)| attach(messages, replies, child, depth + 1, sibling))
        .collect();

    MessageNode::new(messages[i].clone())
        .with_children(children)
        .with_depth(depth)
        .with_sibling_index(sibling_index)
}
