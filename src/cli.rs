#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::path::Path;

use clap::{CommandFactory, Parser, Subcommand};
use eyre::{Context, Result};

use crate::{
    commands,
    config::{self, Configuration, ExportConfig, load_configuration, lookup_config_path, verbose},
    export::{ExportFormat, ExportOptions},
    models::storage::FilterConversation,
    storage::ArcStorage,
};

#[derive(Debug, Parser)]
#[command(
    version,
    about,
    long_about = r#"Rebuild, navigate and export branching chat conversations

Default configuration file location looks up in the following order:
    * $XDG_CONFIG_HOME/chatty-tree/config.toml
    * $HOME/.config/chatty-tree/config.toml
    * $HOME/.chatty-tree.toml
"#,
    disable_version_flag = true
)]
pub struct Command {
    /// Configuration file path
    #[arg(short, long, value_name = "PATH")]
    config: Option<String>,

    /// Show the version
    #[arg(short, long)]
    version: bool,

    #[command(subcommand)]
    action: Option<Action>,
}

#[derive(Debug, Subcommand)]
pub enum Action {
    /// Import a conversation from a JSON file
    Import {
        /// JSON file with a conversation object or a message array
        file: String,

        /// Conversation id to store the messages under
        #[arg(long, value_name = "ID")]
        conversation_id: Option<String>,
    },

    /// List stored conversations
    List {
        /// Only conversations whose title contains this text
        #[arg(long)]
        title: Option<String>,

        /// Only conversations with a message containing this text
        #[arg(long)]
        contains: Option<String>,
    },

    /// Print the selected path of a conversation
    Show {
        id: String,

        /// Print every branch as an outline
        #[arg(short, long)]
        branches: bool,
    },

    /// Choose which reply is shown at a branch point
    Select {
        id: String,

        /// Position counted from the newest reply, 0 is the newest
        index: usize,

        /// Message whose replies are chosen between. Defaults to the first
        /// messages of the conversation
        #[arg(short, long, value_name = "MESSAGE_ID")]
        message: Option<String>,
    },

    /// Show the newest reply at every branch point again
    Reset { id: String },

    /// Delete a conversation or one of its messages
    Delete {
        id: String,

        #[arg(short, long, value_name = "MESSAGE_ID")]
        message: Option<String>,
    },

    /// Export a conversation
    Export {
        id: String,

        /// json, markdown, text or csv
        #[arg(short, long)]
        format: Option<String>,

        /// Include every alternative reply
        #[arg(long)]
        branches: bool,

        /// Keep replies nested under their parent (json only)
        #[arg(long)]
        recursive: bool,

        /// Add the conversation options to the header
        #[arg(long)]
        include_options: bool,

        /// Output file or directory, stdout when omitted
        #[arg(short, long, value_name = "PATH")]
        output: Option<String>,
    },
}

impl Command {
    pub fn new() -> Command {
        Self::parse()
    }

    pub fn get_config(&self) -> Result<Configuration> {
        let config_path = self
            .config
            .clone()
            .unwrap_or_else(|| lookup_config_path().unwrap_or_default());

        if config_path.is_empty() {
            // No config path is specified just use the default config
            return Ok(Configuration::default());
        }
        Ok(load_configuration(config_path.as_str()).wrap_err("loading configuration")?)
    }

    pub fn version(&self) -> bool {
        self.version
    }

    pub fn print_version(&self) {
        println!("{}", config::version())
    }

    pub fn action(&self) -> Option<&Action> {
        self.action.as_ref()
    }

    pub fn print_help() -> Result<()> {
        Self::command().print_help().wrap_err("printing help")
    }
}

impl Action {
    /// Runs the action and writes its result to stdout or the export file.
    pub async fn run(&self, storage: &ArcStorage, defaults: &ExportConfig) -> Result<()> {
        let output = match self {
            Action::Import {
                file,
                conversation_id,
            } => {
                let data = tokio::fs::read_to_string(file)
                    .await
                    .wrap_err(format!("reading {}", file))?;
                commands::import(storage, &data, conversation_id.as_deref()).await?
            }
            Action::List { title, contains } => {
                let mut filter = FilterConversation::default();
                if let Some(title) = title {
                    filter = filter.with_title(title);
                }
                if let Some(contains) = contains {
                    filter = filter.with_message_contains(contains);
                }
                commands::list(storage, filter).await?
            }
            Action::Show { id, branches } => commands::show(storage, id, *branches).await?,
            Action::Select { id, index, message } => {
                commands::select(storage, id, message.as_deref(), *index).await?
            }
            Action::Reset { id } => commands::reset(storage, id).await?,
            Action::Delete { id, message } => {
                commands::delete(storage, id, message.as_deref()).await?
            }
            Action::Export {
                id,
                format,
                branches,
                recursive,
                include_options,
                output,
            } => {
                let format: ExportFormat = format
                    .as_deref()
                    .unwrap_or(defaults.format.as_str())
                    .parse()?;
                let options = ExportOptions::new(format)
                    .with_branches(*branches || defaults.branches)
                    .with_recursive(*recursive || defaults.recursive)
                    .with_include_options(*include_options || defaults.include_options);
                let data = commands::export(storage, id, &options).await?;

                if let Some(output) = output {
                    let path = output_path(output, id, format);
                    tokio::fs::write(&path, data)
                        .await
                        .wrap_err(format!("writing {}", path))?;
                    verbose!("[+] Exported {} to {}", id, path);
                    return Ok(());
                }
                data
            }
        };

        println!("{}", output.trim_end());
        Ok(())
    }
}

/// Exports into a directory are named after the conversation.
fn output_path(output: &str, id: &str, format: ExportFormat) -> String {
    if output.ends_with('/') || Path::new(output).is_dir() {
        let dir = output.trim_end_matches('/');
        return format!("{}/{}.{}", dir, id, format.extension());
    }
    output.to_string()
}
