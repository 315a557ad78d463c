#[cfg(test)]
#[path = "import_test.rs"]
mod tests;

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::models::{Conversation, Message};

use super::CommandError;

const CHILDREN: &str = "children";

/// A conversation file as the chat client exports it. Messages may be flat
/// records or nested under `children`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConversationFile {
    #[serde(default)]
    conversation_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default)]
    options: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    updated_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    messages: Vec<Value>,
}

/// The parsed content of an import file. Metadata the file leaves out stays
/// `None` so it does not replace what is already stored.
#[derive(Debug)]
pub struct ImportedConversation {
    id: String,
    title: Option<String>,
    endpoint: Option<String>,
    options: Option<BTreeMap<String, Value>>,
    created_at: Option<chrono::DateTime<chrono::Utc>>,
    updated_at: Option<chrono::DateTime<chrono::Utc>>,
    messages: Vec<Message>,
}

impl ImportedConversation {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Applies the file on top of the stored conversation. Fields missing
    /// from the file keep their stored values and the update time moves to
    /// now unless the file names one.
    pub fn merge_into(self, stored: Option<Conversation>) -> Conversation {
        let existing = stored.is_some();
        let mut conversation = stored.unwrap_or_else(|| Conversation::default().with_id(&self.id));

        if let Some(title) = self.title {
            conversation = conversation.with_title(title);
        }
        if let Some(endpoint) = self.endpoint {
            conversation = conversation.with_endpoint(endpoint);
        }
        if let Some(options) = self.options {
            conversation = conversation.with_options(options);
        }
        if let Some(created_at) = self.created_at {
            conversation = conversation.with_created_at(created_at);
        }
        match self.updated_at {
            Some(updated_at) => conversation = conversation.with_updated_at(updated_at),
            None if existing => conversation = conversation.with_updated_at(chrono::Utc::now()),
            None => {}
        }
        conversation.with_messages(self.messages)
    }

    fn bare(id: &str) -> Self {
        Self {
            id: id.to_string(),
            title: None,
            endpoint: None,
            options: None,
            created_at: None,
            updated_at: None,
            messages: vec![],
        }
    }

    fn from_file(file: ConversationFile, conversation_id: Option<&str>) -> (Self, Vec<Value>) {
        let id = conversation_id
            .map(str::to_string)
            .or(file.conversation_id)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Conversation::new().id().to_string());

        let imported = Self {
            id,
            title: file.title,
            endpoint: file.endpoint,
            options: file.options,
            created_at: file.created_at,
            updated_at: file.updated_at,
            messages: vec![],
        };
        (imported, file.messages)
    }
}

/// Parses an import file. `conversation_id` overrides the id in the file and
/// is required when the file is a bare message array. A file without any id
/// gets a new one.
pub fn parse_import(
    data: &str,
    conversation_id: Option<&str>,
) -> Result<ImportedConversation, CommandError> {
    let value: Value =
        serde_json::from_str(data).map_err(|e| CommandError::InvalidImport(e.to_string()))?;

    let (mut imported, records) = match value {
        Value::Array(records) => {
            let id = conversation_id.ok_or(CommandError::MissingConversationId)?;
            (ImportedConversation::bare(id), records)
        }
        Value::Object(_) => {
            let file: ConversationFile = serde_json::from_value(value)
                .map_err(|e| CommandError::InvalidImport(e.to_string()))?;
            ImportedConversation::from_file(file, conversation_id)
        }
        _ => {
            return Err(CommandError::InvalidImport(
                "expected an object or an array of messages".to_string(),
            ));
        }
    };

    let mut flat = Vec::with_capacity(records.len());
    for record in records {
        flatten_record(record, None, &mut flat);
    }

    for record in flat {
        let mut message: Message = serde_json::from_value(Value::Object(record))
            .map_err(|e| CommandError::InvalidImport(e.to_string()))?;
        if message.conversation_id().is_none() {
            message.set_conversation_id(&imported.id);
        }
        imported.messages.push(message);
    }

    log::debug!(
        "parsed conversation {} with {} messages",
        imported.id,
        imported.messages.len()
    );
    Ok(imported)
}

/// Appends `record` and then its nested replies, in reading order. Replies
/// that do not name a parent are attached to the record they are nested in.
fn flatten_record(record: Value, parent_id: Option<&str>, out: &mut Vec<Map<String, Value>>) {
    let Value::Object(mut record) = record else {
        log::warn!("skipping message record that is not an object");
        return;
    };

    let children = match record.remove(CHILDREN) {
        Some(Value::Array(children)) => children,
        _ => vec![],
    };

    if let Some(parent_id) = parent_id {
        let has_parent = matches!(record.get("parentMessageId"), Some(Value::String(_)));
        if !has_parent {
            record.insert("parentMessageId".into(), Value::from(parent_id));
        }
    }

    let message_id = match record.get("messageId") {
        Some(Value::String(id)) => Some(id.clone()),
        _ => None,
    };
    out.push(record);

    for child in children {
        flatten_record(child, message_id.as_deref(), out);
    }
}
