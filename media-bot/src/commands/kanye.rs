//! `/kanye`: fetches a quote from api.kanye.rest.

use async_trait::async_trait;
use botkit_core::{Command, CommandContext, Result};
use serde_json::Value;

use super::external;

pub struct KanyeCommand {
    url: String,
    client: reqwest::Client,
}

impl KanyeCommand {
    /// Command against a custom quote endpoint (tests).
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl Default for KanyeCommand {
    fn default() -> Self {
        Self::with_url("https://api.kanye.rest")
    }
}

#[async_trait]
impl Command for KanyeCommand {
    fn trigger(&self) -> &str {
        "/kanye"
    }

    fn description(&self) -> &str {
        "Returns a Kanye quote"
    }

    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let Some(chat_id) = ctx.chat_id() else {
            return Ok(());
        };

        let body: Value = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(external)?
            .error_for_status()
            .map_err(external)?
            .json()
            .await
            .map_err(external)?;
        let quote = body
            .get("quote")
            .and_then(Value::as_str)
            .ok_or_else(|| external("quote missing from response"))?;

        ctx.api
            .send_message(chat_id, &format!("\"{quote}\"\n-Kanye West"), None)
            .await
    }
}
