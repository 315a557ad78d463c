pub mod conversation;
pub mod message;
pub mod storage;

pub use conversation::Conversation;
pub use message::{CompleteMessage, Message};
