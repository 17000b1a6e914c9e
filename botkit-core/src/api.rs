//! Transport contract between the framework core and a messaging backend.
//!
//! The core only ever needs to send messages, fetch update batches, and
//! read the upstream command registry; everything else about the wire is
//! the backend's business. Production code talks to a remote HTTP API
//! (see botkit-telegram); tests substitute a recording implementation.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Rich-text dialect for outbound messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    MarkdownV2,
    Html,
}

impl ParseMode {
    /// Wire name of the dialect.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::MarkdownV2 => "MarkdownV2",
            ParseMode::Html => "html",
        }
    }
}

/// Update categories a poll may subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    Message,
    CallbackQuery,
}

impl UpdateKind {
    /// Wire name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateKind::Message => "message",
            UpdateKind::CallbackQuery => "callback_query",
        }
    }
}

/// A `{command, description}` pair as registered with the backend.
/// The `command` field carries no leading slash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandInfo {
    pub command: String,
    #[serde(default)]
    pub description: String,
}

/// Messaging backend seam.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Sends a text message. Under a parse mode the backend rejects
    /// malformed markup, so callers must escape special characters in
    /// generated text themselves.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<()>;

    /// Uploads a local file as a document attachment.
    async fn send_document(&self, chat_id: i64, document: &Path) -> Result<()>;

    /// Deletes a previously sent message.
    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()>;

    /// Fetches raw update payloads with id >= `offset`, ascending by id.
    /// An empty batch means nothing new.
    async fn get_updates(&self, offset: i64, allowed: &[UpdateKind]) -> Result<Vec<Value>>;

    /// Returns the command list registered with the backend.
    async fn get_my_commands(&self) -> Result<Vec<CommandInfo>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(ParseMode::MarkdownV2.as_str(), "MarkdownV2");
        assert_eq!(ParseMode::Html.as_str(), "html");
        assert_eq!(UpdateKind::Message.as_str(), "message");
        assert_eq!(UpdateKind::CallbackQuery.as_str(), "callback_query");
    }

    #[test]
    fn test_command_info_description_defaults_empty() {
        let info: CommandInfo = serde_json::from_str(r#"{"command": "help"}"#).unwrap();
        assert_eq!(info.command, "help");
        assert_eq!(info.description, "");
    }
}
