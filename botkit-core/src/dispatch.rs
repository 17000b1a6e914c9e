//! Runs batches of commands and hooks, isolating failures.
//!
//! Every unit in a batch runs as its own task and the whole batch is
//! awaited before the loop moves on, so offset persistence can never
//! race ahead of in-flight execution. A failing unit notifies the
//! originating chat and is reported upward only after its siblings have
//! finished.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::api::ChatApi;
use crate::command::{Command, CommandContext, Hook};
use crate::error::{BotError, CommandError, Result};

pub(crate) struct Dispatcher {
    pub command_timeout: Duration,
}

impl Dispatcher {
    /// Runs every registered command whose trigger matches the message
    /// text. Non-matching commands are skipped silently.
    pub async fn dispatch_commands(
        &self,
        api: Arc<dyn ChatApi>,
        commands: &[Arc<dyn Command>],
        message: &crate::types::Message,
    ) -> Result<()> {
        let text = message.text.as_deref().unwrap_or("");
        let matched: Vec<Arc<dyn Command>> = commands
            .iter()
            .filter(|command| command.matches(text))
            .cloned()
            .collect();
        if matched.is_empty() {
            debug!(text, "no command matched");
            return Ok(());
        }

        let mut handles = Vec::with_capacity(matched.len());
        for command in matched {
            let ctx = CommandContext::for_message(api.clone(), message.clone());
            let name = command.trigger().to_string();
            let timeout = self.command_timeout;
            let handle: JoinHandle<Result<()>> = tokio::spawn(async move {
                debug!(trigger = %command.trigger(), args = ?ctx.args, "executing command");
                match tokio::time::timeout(timeout, command.execute(&ctx)).await {
                    Ok(result) => result,
                    Err(_) => Err(CommandError::Timeout.into()),
                }
            });
            handles.push((name, handle));
        }

        self.drain(api, message.chat_id, handles).await
    }

    /// Force-runs every hook, with `message` present for per-message
    /// hooks and absent for loop hooks.
    pub async fn run_hooks(
        &self,
        api: Arc<dyn ChatApi>,
        hooks: &[Arc<dyn Hook>],
        message: Option<&crate::types::Message>,
    ) -> Result<()> {
        if hooks.is_empty() {
            return Ok(());
        }

        let mut handles = Vec::with_capacity(hooks.len());
        for hook in hooks {
            let hook = hook.clone();
            let ctx = match message {
                Some(message) => CommandContext::for_message(api.clone(), message.clone()),
                None => CommandContext::for_tick(api.clone()),
            };
            let name = hook.name().to_string();
            let timeout = self.command_timeout;
            let handle: JoinHandle<Result<()>> = tokio::spawn(async move {
                debug!(hook = %hook.name(), "running hook");
                match tokio::time::timeout(timeout, hook.run(&ctx)).await {
                    Ok(result) => result,
                    Err(_) => Err(CommandError::Timeout.into()),
                }
            });
            handles.push((name, handle));
        }

        self.drain(api, message.and_then(|m| m.chat_id), handles).await
    }

    /// Awaits the whole batch, notifies the chat about each failure, and
    /// propagates the first one once every unit has finished.
    async fn drain(
        &self,
        api: Arc<dyn ChatApi>,
        chat_id: Option<i64>,
        handles: Vec<(String, JoinHandle<Result<()>>)>,
    ) -> Result<()> {
        let mut first_failure: Option<BotError> = None;
        for (name, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_error) => {
                    error!(unit = %name, %join_error, "task aborted");
                    Err(CommandError::Panicked.into())
                }
            };
            let Err(err) = result else {
                continue;
            };
            error!(unit = %name, error = %err, "execution failed");
            if let Some(chat_id) = chat_id {
                let diagnostic = format!("There was an error running {name}:\n{err}");
                if let Err(send_err) = api.send_message(chat_id, &diagnostic, None).await {
                    warn!(error = %send_err, "failed to deliver error diagnostic");
                }
            }
            if first_failure.is_none() {
                first_failure = Some(err);
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
