#[cfg(test)]
#[path = "document_test.rs"]
mod tests;

use crate::models::{Conversation, Message};

use super::{
    ExportFormat, ExportOptions, content::message_parts, endpoint_or_na, export_time, id_or_na,
    title_or_untitled, visible_options,
};

const BANNER: &str = "########################";

/// Renders the Markdown or plain-text transcript of `messages`.
pub fn render(conversation: &Conversation, messages: &[Message], options: &ExportOptions) -> String {
    let markdown = options.format == ExportFormat::Markdown;
    let mut data = String::new();

    let header = [
        ("conversationId", id_or_na(conversation).to_string()),
        ("endpoint", endpoint_or_na(conversation).to_string()),
        ("title", title_or_untitled(conversation).to_string()),
        ("exportAt", export_time(options)),
    ];

    section(&mut data, "Conversation", markdown, 1);
    for (key, value) in header {
        entry(&mut data, key, &value, markdown);
    }

    if options.include_options {
        data.push('\n');
        section(&mut data, "Options", markdown, 2);
        for (key, value) in visible_options(conversation) {
            entry(&mut data, key, &value, markdown);
        }
    }

    data.push('\n');
    section(&mut data, "History", markdown, 2);
    if messages.is_empty() {
        data.push_str("No messages found.\n");
        return data;
    }

    for message in messages {
        let body = message_parts(message)
            .into_iter()
            .map(|(sender, text)| {
                if markdown {
                    format!("**{}**\n{}", sender, text)
                } else {
                    format!(">> {}:\n{}", sender, text)
                }
            })
            .collect::<Vec<_>>()
            .join("\n\n\n");
        data.push_str(&body);
        data.push('\n');

        if message.is_error() {
            data.push_str(note("This is an error message", markdown).as_str());
        }
        if message.is_unfinished() {
            data.push_str(note("This is an unfinished message", markdown).as_str());
        }
        data.push_str("\n\n");
    }
    data
}

fn section(data: &mut String, title: &str, markdown: bool, level: usize) {
    if markdown {
        data.push_str(&format!("{} {}\n", "#".repeat(level), title));
    } else {
        data.push_str(&format!("{}\n{}\n", title, BANNER));
    }
}

fn entry(data: &mut String, key: &str, value: &str, markdown: bool) {
    if markdown {
        data.push_str(&format!("- {}: {}\n", key, value));
    } else {
        data.push_str(&format!("{}: {}\n", key, value));
    }
}

fn note(text: &str, markdown: bool) -> String {
    if markdown {
        format!("*({})*\n", text)
    } else {
        format!("({})\n", text)
    }
}
