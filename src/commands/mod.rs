pub mod import;
pub mod show;

#[cfg(test)]
#[path = "commands_test.rs"]
mod tests;

use eyre::{Context, Result};
use thiserror::Error;

use crate::{
    config::verbose,
    export::{self, ExportOptions},
    models::{Conversation, storage::FilterConversation},
    storage::ArcStorage,
    tree::MessageNode,
};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("conversation {0} not found")]
    ConversationNotFound(String),

    #[error("message {message_id} not found in conversation {conversation_id}")]
    MessageNotFound {
        conversation_id: String,
        message_id: String,
    },

    #[error("index {index} is out of range, there are {count} replies to choose from")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("a bare message array needs --conversation-id")]
    MissingConversationId,

    #[error("invalid import file: {0}")]
    InvalidImport(String),

    #[error("message id must not be empty")]
    EmptyMessageId,
}

async fn load_conversation(storage: &ArcStorage, id: &str) -> Result<Conversation> {
    storage
        .get_conversation(id)
        .await
        .wrap_err(format!("getting conversation {}", id))?
        .ok_or_else(|| CommandError::ConversationNotFound(id.to_string()).into())
}

/// Stores the conversation in `data`, merging with any stored copy.
pub async fn import(
    storage: &ArcStorage,
    data: &str,
    conversation_id: Option<&str>,
) -> Result<String> {
    let imported = import::parse_import(data, conversation_id)?;
    verbose!(
        "[+] Importing {} messages into {}",
        imported.len(),
        imported.id()
    );

    let stored = storage
        .get_conversation(imported.id())
        .await
        .wrap_err(format!("getting conversation {}", imported.id()))?;
    let conversation = imported.merge_into(stored);
    storage
        .upsert_conversation(conversation.clone())
        .await
        .wrap_err("storing conversation")?;
    storage
        .add_messages(conversation.id(), conversation.messages())
        .await
        .wrap_err("storing messages")?;

    log::info!(
        "imported conversation {} with {} messages",
        conversation.id(),
        conversation.len()
    );
    Ok(format!(
        "Imported {} messages into conversation {}",
        conversation.len(),
        conversation.id()
    ))
}

pub async fn list(storage: &ArcStorage, filter: FilterConversation) -> Result<String> {
    let conversations = storage
        .get_conversations(filter)
        .await
        .wrap_err("getting conversations")?;

    if conversations.is_empty() {
        return Ok("No conversations found.".to_string());
    }

    let lines: Vec<String> = conversations
        .iter()
        .map(|c| {
            format!(
                "{}\t{}\t{} messages\t{}",
                c.id(),
                c.title(),
                c.len(),
                c.updated_at().format("%Y-%m-%d %H:%M:%S")
            )
        })
        .collect();
    Ok(lines.join("\n"))
}

pub async fn show(storage: &ArcStorage, id: &str, branches: bool) -> Result<String> {
    let conversation = load_conversation(storage, id).await?;
    let index = storage
        .get_sibling_index(id)
        .await
        .wrap_err("getting sibling selections")?;
    Ok(show::render(&conversation, &index, branches))
}

/// Records which reply of `message_id` is shown. Without a message id the
/// choice is between the conversation's first messages. `index` counts from
/// the newest reply.
pub async fn select(
    storage: &ArcStorage,
    id: &str,
    message_id: Option<&str>,
    index: usize,
) -> Result<String> {
    if message_id == Some("") {
        return Err(CommandError::EmptyMessageId.into());
    }
    let conversation = load_conversation(storage, id).await?;
    let roots = conversation.message_tree();

    let count = match message_id {
        Some(message_id) => find_node(&roots, message_id)
            .map(|node| node.children().len())
            .ok_or_else(|| CommandError::MessageNotFound {
                conversation_id: id.to_string(),
                message_id: message_id.to_string(),
            })?,
        None => roots.len(),
    };
    if index >= count {
        return Err(CommandError::IndexOutOfRange { index, count }.into());
    }

    let key = message_id.or_else(|| export::conversation_key(&conversation));
    storage
        .set_sibling_index(id, key.map(str::to_string), index)
        .await
        .wrap_err("storing sibling selection")?;

    log::debug!("selected index {} of {} for {:?} in {}", index, count, key, id);
    Ok(format!(
        "Showing reply {} of {} (index {} from the newest)",
        count - index,
        count,
        index
    ))
}

/// Clears every selection so each branch point shows its newest reply.
pub async fn reset(storage: &ArcStorage, id: &str) -> Result<String> {
    load_conversation(storage, id).await?;
    storage
        .reset_sibling_index(id)
        .await
        .wrap_err("resetting sibling selections")?;
    Ok(format!("Reset selections of conversation {}", id))
}

pub async fn delete(storage: &ArcStorage, id: &str, message_id: Option<&str>) -> Result<String> {
    load_conversation(storage, id).await?;
    match message_id {
        Some(message_id) => {
            storage
                .delete_message(id, message_id)
                .await
                .wrap_err(format!("deleting message {}", message_id))?;
            Ok(format!("Deleted message {} from conversation {}", message_id, id))
        }
        None => {
            storage
                .delete_conversation(id)
                .await
                .wrap_err(format!("deleting conversation {}", id))?;
            Ok(format!("Deleted conversation {}", id))
        }
    }
}

pub async fn export(storage: &ArcStorage, id: &str, options: &ExportOptions) -> Result<String> {
    let conversation = load_conversation(storage, id).await?;
    let index = storage
        .get_sibling_index(id)
        .await
        .wrap_err("getting sibling selections")?;
    verbose!("[+] Exporting {} as {}", id, options.format);
    Ok(export::export(&conversation, &index, options)?)
}

fn find_node<'a>(nodes: &'a [MessageNode], message_id: &str) -> Option<&'a MessageNode> {
    nodes.iter().find_map(|node| {
        if node.message().message_id() == Some(message_id) {
            Some(node)
        } else {
            find_node(node.children(), message_id)
        }
    })
}
