use crate::models::Message;

/// A message together with the replies recorded for it.
///
/// `children` are kept in the order they were recorded, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageNode {
    message: Message,
    children: Vec<MessageNode>,
    depth: usize,
    sibling_index: usize,
}

impl MessageNode {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            ..Default::default()
        }
    }

    pub fn with_children(mut self, children: Vec<MessageNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_sibling_index(mut self, sibling_index: usize) -> Self {
        self.sibling_index = sibling_index;
        self
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn children(&self) -> &[MessageNode] {
        &self.children
    }

    /// Distance from the root of the tree, roots are at depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Position among the parent's children, counted from the first one.
    pub fn sibling_index(&self) -> usize {
        self.sibling_index
    }

    /// Number of nodes in this subtree, including this one.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(MessageNode::count).sum::<usize>()
    }
}

/// What [`MessageTreeBuilder::build_path`](super::MessageTreeBuilder::build_path)
/// produces.
#[derive(Debug, Clone, PartialEq)]
pub enum MessagePath {
    /// A single node with its selected replies nested below it.
    Tree(MessageNode),
    /// Nested trees built without a current node.
    Forest(Vec<MessageNode>),
    /// Messages in reading order with no nesting.
    Flat(Vec<Message>),
}

impl MessagePath {
    /// Total number of messages, counting nested ones.
    pub fn len(&self) -> usize {
        match self {
            MessagePath::Tree(node) => node.count(),
            MessagePath::Forest(nodes) => nodes.iter().map(MessageNode::count).sum(),
            MessagePath::Flat(messages) => messages.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattens any shape into reading order, parents before their replies.
    pub fn into_messages(self) -> Vec<Message> {
        fn walk(node: MessageNode, out: &mut Vec<Message>) {
            out.push(node.message);
            for child in node.children {
                walk(child, out);
            }
        }

        match self {
            MessagePath::Flat(messages) => messages,
            MessagePath::Tree(node) => {
                let mut out = vec![];
                walk(node, &mut out);
                out
            }
            MessagePath::Forest(nodes) => {
                let mut out = vec![];
                for node in nodes {
                    walk(node, &mut out);
                }
                out
            }
        }
    }
}
