//! Test doubles for command tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use botkit_core::{
    ChatApi, CommandContext, CommandInfo, Message, ParseMode, Result, UpdateKind, User,
};
use serde_json::Value;

/// In-memory [`ChatApi`] recording outbound traffic.
#[derive(Default)]
pub(crate) struct RecordingApi {
    pub sent: Mutex<Vec<(i64, String, Option<ParseMode>)>>,
    pub documents: Mutex<Vec<(i64, PathBuf)>>,
}

impl RecordingApi {
    pub fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text, _)| text.clone())
            .collect()
    }
}

#[async_trait]
impl ChatApi for RecordingApi {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((chat_id, text.to_string(), parse_mode));
        Ok(())
    }

    async fn send_document(&self, chat_id: i64, document: &Path) -> Result<()> {
        self.documents
            .lock()
            .unwrap()
            .push((chat_id, document.to_path_buf()));
        Ok(())
    }

    async fn delete_message(&self, _chat_id: i64, _message_id: i64) -> Result<()> {
        Ok(())
    }

    async fn get_updates(&self, _offset: i64, _allowed: &[UpdateKind]) -> Result<Vec<Value>> {
        Ok(Vec::new())
    }

    async fn get_my_commands(&self) -> Result<Vec<CommandInfo>> {
        Ok(Vec::new())
    }
}

/// Context for a command-flagged message from Ann in the given chat.
pub(crate) fn command_ctx(api: Arc<RecordingApi>, chat_id: i64, text: &str) -> CommandContext {
    CommandContext::for_message(
        api,
        Message {
            id: Some(100),
            chat_id: Some(chat_id),
            sender: Some(User {
                id: Some(1),
                is_bot: Some(false),
                first_name: Some("Ann".to_string()),
                username: Some("ann".to_string()),
            }),
            text: Some(text.to_string()),
            date: None,
            is_command: true,
        },
    )
}
