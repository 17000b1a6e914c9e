//! Test doubles shared by the crate's unit tests.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::api::{ChatApi, CommandInfo, ParseMode, UpdateKind};
use crate::error::Result;
use crate::types::{Message, User};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SentMessage {
    pub chat_id: i64,
    pub text: String,
    pub parse_mode: Option<ParseMode>,
}

/// In-memory [`ChatApi`] that records outbound traffic and replays
/// canned update batches, one batch per `get_updates` call.
#[derive(Default)]
pub(crate) struct RecordingApi {
    pub sent: Mutex<Vec<SentMessage>>,
    pub batches: Mutex<VecDeque<Vec<Value>>>,
    pub offsets: Mutex<Vec<i64>>,
    pub my_commands: Vec<CommandInfo>,
}

impl RecordingApi {
    pub fn with_batches(batches: Vec<Vec<Value>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            ..Default::default()
        }
    }

    pub fn with_commands(my_commands: Vec<CommandInfo>) -> Self {
        Self {
            my_commands,
            ..Default::default()
        }
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|message| message.text.clone())
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
        self.sent.lock().unwrap().push(SentMessage {
            chat_id,
            text: text.to_string(),
            parse_mode,
        });
        Ok(())
    }

    async fn send_document(&self, _chat_id: i64, _document: &Path) -> Result<()> {
        Ok(())
    }

    async fn delete_message(&self, _chat_id: i64, _message_id: i64) -> Result<()> {
        Ok(())
    }

    async fn get_updates(&self, offset: i64, _allowed: &[UpdateKind]) -> Result<Vec<Value>> {
        self.offsets.lock().unwrap().push(offset);
        Ok(self.batches.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn get_my_commands(&self) -> Result<Vec<CommandInfo>> {
        Ok(self.my_commands.clone())
    }
}

/// A parsed message from Ann in the given chat; command-flagged when the
/// text starts with a slash.
pub(crate) fn sample_message(chat_id: i64, text: &str) -> Message {
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
        is_command: text.starts_with('/'),
    }
}

/// Raw command-flagged update payload, as the wire would deliver it.
pub(crate) fn command_update(update_id: i64, chat_id: i64, text: &str) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id * 10,
            "chat": {"id": chat_id, "type": "private"},
            "from": {"id": 1, "is_bot": false, "first_name": "Ann", "username": "ann"},
            "text": text,
            "entities": [{"type": "bot_command", "offset": 0, "length": text.len()}]
        }
    })
}

/// Raw plain-text update payload (no command entity).
pub(crate) fn plain_update(update_id: i64, chat_id: i64, text: &str) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id * 10,
            "chat": {"id": chat_id, "type": "private"},
            "from": {"id": 1, "is_bot": false, "first_name": "Ann", "username": "ann"},
            "text": text
        }
    })
}
