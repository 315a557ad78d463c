//! Conversation exports in the formats the chat client offers.

pub mod content;
pub mod csv;
pub mod document;
pub mod format;
pub mod json;

pub use format::ExportFormat;

use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use thiserror::Error;

use crate::{
    config::constants::{NOT_AVAILABLE, UNTITLED},
    models::Conversation,
    tree::{MessageTreeBuilder, SiblingIndexStore},
};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unknown export format: {0}")]
    UnknownFormat(String),

    #[error("serializing export: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Include every alternative reply instead of only the selected ones.
    /// Markdown and text exports always show the selected path.
    pub branches: bool,
    /// Keep replies nested under their parent. JSON only.
    pub recursive: bool,
    /// Add the conversation's options to the header.
    pub include_options: bool,
    pub exported_at: DateTime<FixedOffset>,
}

impl ExportOptions {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            branches: false,
            recursive: false,
            include_options: false,
            exported_at: chrono::Local::now().fixed_offset(),
        }
    }

    pub fn with_branches(mut self, branches: bool) -> Self {
        self.branches = branches;
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_include_options(mut self, include_options: bool) -> Self {
        self.include_options = include_options;
        self
    }

    pub fn with_exported_at(mut self, exported_at: DateTime<FixedOffset>) -> Self {
        self.exported_at = exported_at;
        self
    }
}

/// Renders `conversation` using the sibling selections in `store`.
pub fn export<S: SiblingIndexStore>(
    conversation: &Conversation,
    store: S,
    options: &ExportOptions,
) -> Result<String, ExportError> {
    let roots = conversation.message_tree();
    let builder = MessageTreeBuilder::new(store);
    let key = conversation_key(conversation);

    log::debug!(
        "exporting conversation {} as {} (branches: {}, recursive: {})",
        conversation.id(),
        options.format,
        options.branches,
        options.recursive
    );

    let output = match options.format {
        ExportFormat::Json => {
            let path =
                builder.build_path(key, None, &roots, options.branches, options.recursive);
            json::render(conversation, &path, options)?
        }
        ExportFormat::Markdown | ExportFormat::Text => {
            let path = builder.build_path(key, None, &roots, false, false);
            document::render(conversation, &path.into_messages(), options)
        }
        ExportFormat::Csv => {
            let path = builder.build_path(key, None, &roots, options.branches, false);
            csv::render(&path.into_messages())
        }
    };
    Ok(output)
}

/// Key under which the selection between top-level messages is stored.
pub fn conversation_key(conversation: &Conversation) -> Option<&str> {
    Some(conversation.id()).filter(|id| !id.is_empty())
}

/// Time of day the way the chat client stamps exports, e.g.
/// `14:03:12 GMT+0200`.
pub(crate) fn export_time(options: &ExportOptions) -> String {
    options.exported_at.format("%H:%M:%S GMT%z").to_string()
}

pub(crate) fn title_or_untitled(conversation: &Conversation) -> &str {
    Some(conversation.title())
        .filter(|title| !title.is_empty())
        .unwrap_or(UNTITLED)
}

pub(crate) fn id_or_na(conversation: &Conversation) -> &str {
    conversation_key(conversation).unwrap_or(NOT_AVAILABLE)
}

pub(crate) fn endpoint_or_na(conversation: &Conversation) -> &str {
    conversation
        .endpoint()
        .filter(|endpoint| !endpoint.is_empty())
        .unwrap_or(NOT_AVAILABLE)
}

/// Options worth showing: nulls and empty strings are left out.
pub(crate) fn visible_options(conversation: &Conversation) -> Vec<(&str, String)> {
    conversation
        .options()
        .iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some((key.as_str(), s.clone())),
            other => Some((key.as_str(), other.to_string())),
        })
        .collect()
}
