#[cfg(test)]
#[path = "json_test.rs"]
mod tests;

use serde_json::{Map, Value};

use crate::{
    models::Conversation,
    tree::{MessageNode, MessagePath},
};

use super::{ExportError, ExportOptions, conversation_key, export_time};

pub fn render(
    conversation: &Conversation,
    path: &MessagePath,
    options: &ExportOptions,
) -> Result<String, ExportError> {
    let mut data = Map::new();
    data.insert(
        "conversationId".into(),
        conversation_key(conversation).map_or(Value::Null, Value::from),
    );
    data.insert(
        "endpoint".into(),
        conversation
            .endpoint()
            .filter(|e| !e.is_empty())
            .map_or(Value::Null, Value::from),
    );
    data.insert(
        "title".into(),
        Some(conversation.title())
            .filter(|t| !t.is_empty())
            .map_or(Value::Null, Value::from),
    );
    data.insert("exportAt".into(), Value::from(export_time(options)));
    data.insert("branches".into(), Value::from(options.branches));
    data.insert("recursive".into(), Value::from(options.recursive));

    if options.include_options {
        let preset: Map<String, Value> = conversation
            .options()
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        data.insert("options".into(), Value::Object(preset));
    }

    match path {
        MessagePath::Tree(node) => {
            data.insert(
                "messagesTree".into(),
                Value::Array(node.children().iter().map(node_value).collect()),
            );
        }
        MessagePath::Forest(nodes) => {
            data.insert(
                "messages".into(),
                Value::Array(nodes.iter().map(node_value).collect()),
            );
        }
        MessagePath::Flat(messages) => {
            data.insert(
                "messages".into(),
                Value::Array(messages.iter().map(|m| m.completed().to_value()).collect()),
            );
        }
    }

    Ok(serde_json::to_string_pretty(&Value::Object(data))?)
}

fn node_value(node: &MessageNode) -> Value {
    let mut value = node.message().completed().to_value();
    if let Value::Object(map) = &mut value {
        map.insert(
            "children".into(),
            Value::Array(node.children().iter().map(node_value).collect()),
        );
    }
    value
}
