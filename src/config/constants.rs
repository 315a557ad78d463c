pub const LOG_FILE_PATH: &str = "/tmp/chatty-tree.log";

pub const DATABASE_PATH: &str = "${HOME}/.local/share/chatty-tree/chat.db";

/// Parent id the chat client stores for messages that start a conversation.
pub const NO_PARENT: &str = "00000000-0000-0000-0000-000000000000";

pub const DEFAULT_EXPORT_FORMAT: &str = "json";

pub const UNTITLED: &str = "Untitled";

pub const NOT_AVAILABLE: &str = "N/A";
