pub mod sqlite;

use std::sync::Arc;

use crate::{
    config::StorageConfig,
    models::{Conversation, Message, storage::FilterConversation},
    tree::SiblingIndex,
};
use async_trait::async_trait;
use eyre::Result;
use sqlite::Sqlite;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Storage {
    /// The conversation with its messages, or `None` if it does not exist.
    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>>;
    async fn get_conversations(&self, filter: FilterConversation) -> Result<Vec<Conversation>>;
    /// Inserts or updates the conversation itself; messages are left alone.
    async fn upsert_conversation(&self, conversation: Conversation) -> Result<()>;
    async fn delete_conversation(&self, id: &str) -> Result<()>;
    /// Messages in the order they were first added.
    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>>;
    /// Adds messages, replacing ones with the same id without moving them.
    async fn add_messages(&self, conversation_id: &str, messages: &[Message]) -> Result<()>;
    async fn delete_message(&self, conversation_id: &str, id: &str) -> Result<()>;
    async fn get_sibling_index(&self, conversation_id: &str) -> Result<SiblingIndex>;
    async fn set_sibling_index(
        &self,
        conversation_id: &str,
        message_id: Option<String>,
        index: usize,
    ) -> Result<()>;
    async fn reset_sibling_index(&self, conversation_id: &str) -> Result<()>;
}

pub type ArcStorage = Arc<dyn Storage + Send + Sync>;

pub async fn new_storage(config: &StorageConfig) -> Result<ArcStorage> {
    let storage = match config {
        StorageConfig::Sqlite(sqlite_config) => Arc::new(Sqlite::new(sqlite_config.path()).await?),
    };
    Ok(storage)
}
