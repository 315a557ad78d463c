#[cfg(test)]
#[path = "content_test.rs"]
mod tests;

use serde_json::Value;

use crate::models::Message;

/// Splits a message into `(sender, text)` pairs for the document exports.
///
/// Messages from assistants with structured `content` get one pair per
/// content part; tool calls and images are shown as JSON under a label of
/// their own. Everything else is a single pair of the sender and the text.
pub fn message_parts(message: &Message) -> Vec<(String, String)> {
    let sender = message.sender();
    match message.extra().get("content") {
        Some(Value::Array(parts)) if !parts.is_empty() => parts
            .iter()
            .filter(|part| !part.is_null())
            .map(|part| part_text(sender, part))
            .collect(),
        _ => vec![(sender.to_string(), message.text().to_string())],
    }
}

fn part_text(sender: &str, part: &Value) -> (String, String) {
    let labelled = |label: &str, value: Option<&Value>| {
        (
            label.to_string(),
            value.map_or_else(|| "{}".to_string(), Value::to_string),
        )
    };

    match part.get("type").and_then(Value::as_str) {
        Some("error") => {
            let text = match part.get("text") {
                Some(Value::Object(obj)) => obj.get("value").map(plain).unwrap_or_default(),
                Some(other) => plain(other),
                None => String::new(),
            };
            (sender.to_string(), text)
        }
        Some("text") => {
            let text = match part.get("text") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Object(obj)) => obj.get("value").map(plain).unwrap_or_default(),
                _ => String::new(),
            };
            (sender.to_string(), text)
        }
        Some("tool_call") => {
            let Some(call) = part.get("tool_call").filter(|c| !c.is_null()) else {
                return (sender.to_string(), "{}".to_string());
            };
            match call.get("type").and_then(Value::as_str) {
                Some("code_interpreter") => {
                    labelled("Code Interpreter", call.get("code_interpreter"))
                }
                Some("retrieval") => labelled("Retrieval", Some(call)),
                _ => labelled("Tool", Some(call)),
            }
        }
        Some("image_file") => labelled("Image", part.get("image_file")),
        _ => (sender.to_string(), part.to_string()),
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
