#[cfg(test)]
#[path = "csv_test.rs"]
mod tests;

use crate::models::Message;

pub const COLUMNS: [&str; 8] = [
    "sender",
    "text",
    "isCreatedByUser",
    "error",
    "unfinished",
    "messageId",
    "parentMessageId",
    "createdAt",
];

/// One row per message. Fields are quoted only when they contain a comma,
/// a quote or a line break; quotes are doubled.
pub fn render(messages: &[Message]) -> String {
    let mut out = row(COLUMNS.iter().map(|c| c.to_string()));
    for message in messages {
        let message = message.completed();
        out.push_str(&row([
            message.sender().to_string(),
            message.text.clone(),
            message.is_created_by_user.to_string(),
            message.error.to_string(),
            message.unfinished().map(|u| u.to_string()).unwrap_or_default(),
            message.message_id.clone(),
            message.parent_message_id.clone().unwrap_or_default(),
            message
                .created_at()
                .map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
                .unwrap_or_default(),
        ]));
    }
    out
}

fn row(fields: impl IntoIterator<Item = String>) -> String {
    let mut line = fields
        .into_iter()
        .map(|field| escape(&field))
        .collect::<Vec<_>>()
        .join(",");
    line.push_str("\r\n");
    line
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
