//! Reply trees of chat messages.
//!
//! A conversation is stored as a flat list of messages pointing at their
//! parent. [`build_tree`] groups that list into [`MessageNode`]s, and
//! [`MessageTreeBuilder`] walks the nodes to produce either the whole tree or
//! the single path the user currently has selected.

pub mod assemble;
pub mod builder;
pub mod node;
pub mod sibling;

pub use assemble::build_tree;
pub use builder::MessageTreeBuilder;
pub use node::{MessageNode, MessagePath};
pub use sibling::{SharedSiblingIndex, SiblingIndex, SiblingIndexStore};
