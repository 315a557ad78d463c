#[cfg(test)]
#[path = "builder_test.rs"]
mod tests;

use crate::models::Message;

use super::{MessageNode, MessagePath, SiblingIndexStore};

/// Turns reply trees into what the chat view or an export needs: the full
/// tree, or the one path the user has selected through it.
///
/// The builder only reads from its store. Give it a snapshot when the store
/// can change while a path is being built.
pub struct MessageTreeBuilder<S> {
    store: S,
}

impl<S: SiblingIndexStore> MessageTreeBuilder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Builds from `message` down through `messages`, its replies.
    ///
    /// `message_id` is the key used to look up which of `messages` is
    /// selected. For a top-level call with no current message this is
    /// usually the conversation id.
    ///
    /// With `branches`, every reply is followed. Otherwise only the selected
    /// reply is: the one `sibling_index` positions from the end, so 0 picks
    /// the newest. A single reply is taken without a lookup.
    ///
    /// With `recursive`, replies stay nested under their parent. Without it,
    /// the result is one flat list in reading order.
    pub fn build_path(
        &self,
        message_id: Option<&str>,
        message: Option<&Message>,
        messages: &[MessageNode],
        branches: bool,
        recursive: bool,
    ) -> MessagePath {
        let selected = self.select(message_id, messages, branches);

        if recursive {
            let children: Vec<MessageNode> = selected
                .iter()
                .map(|child| self.expand(child, branches))
                .collect();
            return match message {
                Some(message) => {
                    MessagePath::Tree(MessageNode::new(message.clone()).with_children(children))
                }
                None => MessagePath::Forest(children),
            };
        }

        let mut flat: Vec<Message> = message.into_iter().cloned().collect();
        for child in selected {
            self.flatten_into(child, branches, &mut flat);
        }
        MessagePath::Flat(flat)
    }

    /// The messages currently shown for a conversation, oldest first.
    pub fn active_path(&self, conversation_id: Option<&str>, roots: &[MessageNode]) -> Vec<Message> {
        self.build_path(conversation_id, None, roots, false, false)
            .into_messages()
    }

    fn select<'a>(
        &self,
        message_id: Option<&str>,
        messages: &'a [MessageNode],
        branches: bool,
    ) -> &'a [MessageNode] {
        if branches || messages.len() <= 1 {
            return messages;
        }

        let sibling_index = self.store.sibling_index(message_id);
        match (messages.len() - 1).checked_sub(sibling_index) {
            Some(i) => &messages[i..=i],
            None => {
                log::debug!(
                    "sibling index {} out of range for {} replies of {:?}",
                    sibling_index,
                    messages.len(),
                    message_id
                );
                &[]
            }
        }
    }

    fn expand(&self, node: &MessageNode, branches: bool) -> MessageNode {
        let children = self
            .select(node.message().message_id(), node.children(), branches)
            .iter()
            .map(|child| self.expand(child, branches))
            .collect();

        MessageNode::new(node.message().clone())
            .with_children(children)
            .with_depth(node.depth())
            .with_sibling_index(node.sibling_index())
    }

    fn flatten_into(&self, node: &MessageNode, branches: bool, out: &mut Vec<Message>) {
        out.push(node.message().clone());
        for child in self.select(node.message().message_id(), node.children(), branches) {
            self.flatten_into(child, branches, out);
        }
    }
}
