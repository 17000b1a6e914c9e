//! reqwest client for the Telegram Bot HTTP API, implementing
//! [`botkit_core::ChatApi`]. Every response is unwrapped from the
//! `ok`/`result`/`description` envelope before it reaches the core.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use botkit_core::{BotError, ChatApi, CommandInfo, ParseMode, Result, UpdateKind};
use reqwest::multipart;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Envelope shared by Bot API responses.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DeleteMessageRequest {
    chat_id: i64,
    message_id: i64,
}

pub struct TelegramApi {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramApi {
    /// Client for the given bot token against the public API host.
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, "https://api.telegram.org")
    }

    /// Client against a custom API host (local proxies, tests).
    pub fn with_base_url(token: &str, host: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BotError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{}/", host.trim_end_matches('/'), token),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}{}", self.base_url, method)
    }

    async fn read_envelope<T>(response: reqwest::Response, method: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Transport(format!(
                "{method} returned HTTP {status}: {body}"
            )));
        }

        let envelope: ApiResponse<T> = response.json().await.map_err(|e| {
            BotError::Transport(format!("{method} response did not parse: {e}"))
        })?;
        if !envelope.ok {
            return Err(BotError::Transport(format!(
                "{method} returned ok=false: {}",
                envelope.description.unwrap_or_default()
            )));
        }
        envelope.result.ok_or_else(|| {
            BotError::Transport(format!("{method} returned ok=true without a result"))
        })
    }
}

#[async_trait]
impl ChatApi for TelegramApi {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<()> {
        debug!(chat_id, len = text.len(), "sendMessage");
        let body = SendMessageRequest {
            chat_id,
            text,
            parse_mode: parse_mode.map(|mode| mode.as_str()),
        };
        let response = self
            .client
            .post(self.url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| BotError::Transport(format!("sendMessage request failed: {e}")))?;
        Self::read_envelope::<Value>(response, "sendMessage").await?;
        Ok(())
    }

    async fn send_document(&self, chat_id: i64, document: &Path) -> Result<()> {
        let file_name = document
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("document")
            .to_string();
        debug!(chat_id, file = %file_name, "sendDocument");

        let bytes = tokio::fs::read(document).await?;
        let form = multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", multipart::Part::bytes(bytes).file_name(file_name));
        let response = self
            .client
            .post(self.url("sendDocument"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| BotError::Transport(format!("sendDocument request failed: {e}")))?;
        Self::read_envelope::<Value>(response, "sendDocument").await?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()> {
        let body = DeleteMessageRequest {
            chat_id,
            message_id,
        };
        let response = self
            .client
            .post(self.url("deleteMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| BotError::Transport(format!("deleteMessage request failed: {e}")))?;
        Self::read_envelope::<bool>(response, "deleteMessage").await?;
        Ok(())
    }

    async fn get_updates(&self, offset: i64, allowed: &[UpdateKind]) -> Result<Vec<Value>> {
        let allowed_names: Vec<&str> = allowed.iter().map(|kind| kind.as_str()).collect();
        let params = [
            ("offset", offset.to_string()),
            ("allowed_updates", serde_json::to_string(&allowed_names)?),
        ];
        let response = self
            .client
            .get(self.url("getUpdates"))
            .query(&params)
            .send()
            .await
            .map_err(|e| BotError::Transport(format!("getUpdates request failed: {e}")))?;
        Self::read_envelope::<Vec<Value>>(response, "getUpdates").await
    }

    async fn get_my_commands(&self) -> Result<Vec<CommandInfo>> {
        let response = self
            .client
            .get(self.url("getMyCommands"))
            .send()
            .await
            .map_err(|e| BotError::Transport(format!("getMyCommands request failed: {e}")))?;
        Self::read_envelope::<Vec<CommandInfo>>(response, "getMyCommands").await
    }
}
