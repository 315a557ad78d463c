#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::constants::NO_PARENT;

/// A single chat message as the chat client records it.
///
/// Every field is optional on input, mirroring the partial records the
/// client keeps in its cache. Accessors substitute the usual defaults; use
/// [`Message::completed`] to get a record with the defaults written in.
/// Fields this type does not know about are kept in `extra` and written
/// back out unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_message_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    conversation_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    sender: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_created_by_user: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    unfinished: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<chrono::DateTime<chrono::Utc>>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Message {
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: Some(message_id.into()),
            ..Default::default()
        }
    }

    pub fn new_user(message_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(message_id)
            .with_text(text)
            .with_sender("User")
            .with_created_by_user(true)
    }

    pub fn new_assistant(message_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(message_id)
            .with_text(text)
            .with_sender("Assistant")
            .with_created_by_user(false)
    }

    pub fn with_parent(mut self, parent_message_id: impl Into<String>) -> Self {
        self.parent_message_id = Some(parent_message_id.into());
        self
    }

    pub fn with_conversation_id(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_created_by_user(mut self, is_created_by_user: bool) -> Self {
        self.is_created_by_user = Some(is_created_by_user);
        self
    }

    pub fn with_error(mut self, error: bool) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_unfinished(mut self, unfinished: bool) -> Self {
        self.unfinished = Some(unfinished);
        self
    }

    pub fn with_created_at(mut self, created_at: chrono::DateTime<chrono::Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    pub fn parent_message_id(&self) -> Option<&str> {
        self.parent_message_id.as_deref()
    }

    /// The parent this message replies to, or `None` when it starts the
    /// conversation.
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_message_id
            .as_deref()
            .filter(|id| !id.is_empty() && *id != NO_PARENT)
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn sender(&self) -> &str {
        self.sender.as_deref().unwrap_or_default()
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    pub fn is_created_by_user(&self) -> bool {
        self.is_created_by_user.unwrap_or(false)
    }

    pub fn is_error(&self) -> bool {
        self.error.unwrap_or(false)
    }

    pub fn is_unfinished(&self) -> bool {
        self.unfinished.unwrap_or(false)
    }

    pub fn unfinished(&self) -> Option<bool> {
        self.unfinished
    }

    pub fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.created_at
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub fn set_conversation_id(&mut self, conversation_id: impl Into<String>) {
        self.conversation_id = Some(conversation_id.into());
    }

    /// Returns a copy with the required fields filled in: empty id and text,
    /// `false` for the user/error flags. Conversation and parent ids stay
    /// `None` and serialize as `null`.
    pub fn completed(&self) -> CompleteMessage {
        CompleteMessage {
            message_id: self.message_id.clone().unwrap_or_default(),
            conversation_id: self.conversation_id.clone().filter(|id| !id.is_empty()),
            parent_message_id: self.parent_message_id.clone().filter(|id| !id.is_empty()),
            text: self.text().to_string(),
            is_created_by_user: self.is_created_by_user(),
            error: self.is_error(),
            rest: self.clone(),
        }
    }
}

/// A message with every required field present, ready to be exported.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteMessage {
    pub message_id: String,
    pub conversation_id: Option<String>,
    pub parent_message_id: Option<String>,
    pub text: String,
    pub is_created_by_user: bool,
    pub error: bool,
    rest: Message,
}

impl CompleteMessage {
    pub fn sender(&self) -> &str {
        self.rest.sender()
    }

    pub fn is_unfinished(&self) -> bool {
        self.rest.is_unfinished()
    }

    pub fn unfinished(&self) -> Option<bool> {
        self.rest.unfinished()
    }

    pub fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.rest.created_at()
    }

    /// Serializes the full record: the filled-in required fields plus every
    /// other field the source message carried.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("messageId".into(), Value::from(self.message_id.clone()));
        map.insert(
            "conversationId".into(),
            self.conversation_id.clone().map_or(Value::Null, Value::from),
        );
        map.insert(
            "parentMessageId".into(),
            self.parent_message_id.clone().map_or(Value::Null, Value::from),
        );
        map.insert("text".into(), Value::from(self.text.clone()));
        map.insert("isCreatedByUser".into(), Value::from(self.is_created_by_user));
        map.insert("error".into(), Value::from(self.error));

        if let Ok(Value::Object(rest)) = serde_json::to_value(&self.rest) {
            for (key, value) in rest {
                map.entry(key).or_insert(value);
            }
        }
        Value::Object(map)
    }
}
