//! Command and hook abstractions, plus the built-in `/help` and `/start`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::{ChatApi, CommandInfo};
use crate::error::Result;
use crate::types::{CallbackQuery, Message};

/// Execution context handed to commands and hooks: the outbound API
/// handle, the triggering message (absent for loop hooks), and the
/// whitespace-split tokens following the first one.
#[derive(Clone)]
pub struct CommandContext {
    pub api: Arc<dyn ChatApi>,
    pub message: Option<Message>,
    pub args: Vec<String>,
}

impl CommandContext {
    /// Context for a message-driven invocation.
    pub fn for_message(api: Arc<dyn ChatApi>, message: Message) -> Self {
        let args = message
            .text
            .as_deref()
            .map(split_args)
            .unwrap_or_default();
        Self {
            api,
            message: Some(message),
            args,
        }
    }

    /// Context for a loop hook: no message, no args.
    pub fn for_tick(api: Arc<dyn ChatApi>) -> Self {
        Self {
            api,
            message: None,
            args: Vec::new(),
        }
    }

    /// Chat id of the triggering message, if any.
    pub fn chat_id(&self) -> Option<i64> {
        self.message.as_ref().and_then(|message| message.chat_id)
    }
}

fn split_args(text: &str) -> Vec<String> {
    text.split_whitespace().skip(1).map(str::to_string).collect()
}

/// A unit of work bound to a slash trigger.
#[async_trait]
pub trait Command: Send + Sync {
    /// The keyword that triggers this command, e.g. `/radarr`.
    fn trigger(&self) -> &str;

    /// One-line description shown by `/help`.
    fn description(&self) -> &str {
        ""
    }

    /// Whether `text` addresses this command. The first whitespace token
    /// must equal the trigger (case-insensitive) after removing a
    /// trailing `@botname` mention. Substring checks would also accept
    /// longer triggers sharing the prefix, e.g. `/radarr_plus`.
    fn matches(&self, text: &str) -> bool {
        let Some(first) = text.split_whitespace().next() else {
            return false;
        };
        let token = first.split('@').next().unwrap_or(first);
        token.eq_ignore_ascii_case(self.trigger())
    }

    /// Performs the command's side effect. Results reach the user via
    /// outbound sends, not the return value.
    async fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// A unit that runs unconditionally: on every non-command message, or on
/// every polling cycle when registered as a loop hook.
#[async_trait]
pub trait Hook: Send + Sync {
    /// Name used in logs and startup summaries.
    fn name(&self) -> &str;

    async fn run(&self, ctx: &CommandContext) -> Result<()>;
}

/// Handler for callback-query updates.
#[async_trait]
pub trait CallbackHandler: Send + Sync {
    async fn handle(&self, api: Arc<dyn ChatApi>, query: CallbackQuery) -> Result<()>;
}

/// Built-in `/help`: merges the registered command entries with the
/// backend's own command list and sends the result as one message.
pub struct HelpCommand {
    entries: Vec<CommandInfo>,
}

impl HelpCommand {
    pub fn new(entries: Vec<CommandInfo>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl Command for HelpCommand {
    fn trigger(&self) -> &str {
        "/help"
    }

    fn description(&self) -> &str {
        "List available commands"
    }

    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let Some(chat_id) = ctx.chat_id() else {
            return Ok(());
        };

        let mut entries = self.entries.clone();
        for info in ctx.api.get_my_commands().await? {
            if !entries.iter().any(|entry| entry.command == info.command) {
                entries.push(info);
            }
        }

        let mut listing = String::new();
        for info in &entries {
            listing.push_str(&format!("/{} {}\n", info.command, info.description));
        }

        ctx.api.send_message(chat_id, &listing, None).await
    }
}

/// Built-in `/start`: greets the sender by first name, then runs the
/// help flow against the same message.
pub struct StartCommand {
    help: Arc<HelpCommand>,
}

impl StartCommand {
    pub fn new(help: Arc<HelpCommand>) -> Self {
        Self { help }
    }
}

#[async_trait]
impl Command for StartCommand {
    fn trigger(&self) -> &str {
        "/start"
    }

    fn description(&self) -> &str {
        "Greet and list available commands"
    }

    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let Some(chat_id) = ctx.chat_id() else {
            return Ok(());
        };

        let first_name = ctx
            .message
            .as_ref()
            .and_then(|message| message.sender.as_ref())
            .and_then(|sender| sender.first_name.as_deref())
            .unwrap_or("there");
        ctx.api
            .send_message(chat_id, &format!("Hello {first_name}"), None)
            .await?;

        // Re-route into the help flow as if the user had sent /help.
        let mut help_ctx = ctx.clone();
        if let Some(message) = help_ctx.message.as_mut() {
            message.text = Some("/help".to_string());
        }
        help_ctx.args.clear();
        self.help.execute(&help_ctx).await
    }
}
