#[cfg(test)]
#[path = "show_test.rs"]
mod tests;

use std::collections::{HashMap, HashSet};

use crate::{
    models::{Conversation, Message},
    tree::{MessageNode, MessagePath, MessageTreeBuilder, SiblingIndexStore},
};

/// Renders the selected path one message per line. With `branches` every
/// message is shown as an indented outline and the selected ones are marked
/// with `*`. Messages that have alternatives show their position, e.g.
/// `(2/3)`.
pub fn render<S: SiblingIndexStore>(
    conversation: &Conversation,
    store: S,
    branches: bool,
) -> String {
    let roots = conversation.message_tree();
    let builder = MessageTreeBuilder::new(store);
    let key = crate::export::conversation_key(conversation);

    let counts = sibling_counts(&roots);
    let active: HashSet<String> = builder
        .active_path(key, &roots)
        .iter()
        .filter_map(|m| m.message_id().map(str::to_string))
        .collect();

    let nodes = match builder.build_path(key, None, &roots, branches, true) {
        MessagePath::Forest(nodes) => nodes,
        MessagePath::Tree(node) => vec![node],
        MessagePath::Flat(_) => vec![],
    };

    let mut out = format!("{} ({})\n", conversation.title(), conversation.id());
    if nodes.is_empty() {
        out.push_str("No messages found.\n");
        return out;
    }
    for node in &nodes {
        render_node(node, &counts, branches.then_some(&active), &mut out);
    }
    out
}

fn render_node(
    node: &MessageNode,
    counts: &HashMap<String, usize>,
    active: Option<&HashSet<String>>,
    out: &mut String,
) {
    let message = node.message();
    let indent = match active {
        Some(_) => "  ".repeat(node.depth()),
        None => String::new(),
    };
    let marker = match active {
        Some(active) if message.message_id().is_some_and(|id| active.contains(id)) => "* ",
        Some(_) => "- ",
        None => "",
    };

    out.push_str(&format!("{indent}{marker}{}", label(message)));
    if let Some(count) = message.message_id().and_then(|id| counts.get(id)) {
        out.push_str(&format!(" ({}/{})", node.sibling_index() + 1, count));
    }
    out.push_str(&format!(": {}\n", summary(message.text())));

    for child in node.children() {
        render_node(child, counts, active, out);
    }
}

fn label(message: &Message) -> String {
    let sender = match message.sender() {
        "" if message.is_created_by_user() => "User",
        "" => "Assistant",
        sender => sender,
    };
    match message.message_id() {
        Some(id) => format!("{sender} [{id}]"),
        None => sender.to_string(),
    }
}

fn summary(text: &str) -> String {
    let mut lines = text.lines();
    let first = lines.next().unwrap_or_default();
    if lines.next().is_some() {
        format!("{first} ...")
    } else {
        first.to_string()
    }
}

/// Number of alternatives for every message that has at least one sibling.
fn sibling_counts(roots: &[MessageNode]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    collect_counts(roots, &mut counts);
    counts
}

fn collect_counts(siblings: &[MessageNode], counts: &mut HashMap<String, usize>) {
    for node in siblings {
        if siblings.len() > 1 {
            if let Some(id) = node.message().message_id() {
                counts.insert(id.to_string(), siblings.len());
            }
        }
        collect_counts(node.children(), counts);
    }
}
