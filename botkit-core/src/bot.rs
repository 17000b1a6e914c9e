//! Bot registration and the update-polling loop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::api::{ChatApi, CommandInfo, UpdateKind};
use crate::command::{CallbackHandler, Command, HelpCommand, Hook, StartCommand};
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::state::StateStore;
use crate::types::Update;

/// Default pause between polling cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
/// Default upper bound on a single command or hook execution.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);
/// Default path of the persisted state document.
pub const DEFAULT_STATE_PATH: &str = "data.json";

/// A polling bot: registered commands and hooks plus the loop that
/// feeds them. Construction wires the transport; `run` blocks forever.
pub struct Bot {
    api: Arc<dyn ChatApi>,
    name: String,
    commands: Vec<Arc<dyn Command>>,
    message_hooks: Vec<Arc<dyn Hook>>,
    loop_hooks: Vec<Arc<dyn Hook>>,
    callback_handler: Option<Arc<dyn CallbackHandler>>,
    state: StateStore,
    poll_interval: Duration,
    dispatcher: Dispatcher,
}

impl Bot {
    pub fn new(api: Arc<dyn ChatApi>, name: impl Into<String>) -> Self {
        Self {
            api,
            name: name.into(),
            commands: Vec::new(),
            message_hooks: Vec::new(),
            loop_hooks: Vec::new(),
            callback_handler: None,
            state: StateStore::new(DEFAULT_STATE_PATH),
            poll_interval: DEFAULT_POLL_INTERVAL,
            dispatcher: Dispatcher {
                command_timeout: DEFAULT_COMMAND_TIMEOUT,
            },
        }
    }

    /// Registers a triggerable command.
    pub fn add_command(mut self, command: Arc<dyn Command>) -> Self {
        self.commands.push(command);
        self
    }

    /// Registers a hook run on every non-command message.
    pub fn add_message_hook(mut self, hook: Arc<dyn Hook>) -> Self {
        self.message_hooks.push(hook);
        self
    }

    /// Registers a hook force-run on every polling cycle.
    pub fn add_loop_hook(mut self, hook: Arc<dyn Hook>) -> Self {
        self.loop_hooks.push(hook);
        self
    }

    /// Registers the handler for callback-query updates.
    pub fn callback_handler(mut self, handler: Arc<dyn CallbackHandler>) -> Self {
        self.callback_handler = Some(handler);
        self
    }

    /// Sets the persisted-state file path (default `data.json`).
    pub fn state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state = StateStore::new(path);
        self
    }

    /// Sets the pause between polling cycles.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the upper bound on a single command or hook execution.
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.dispatcher.command_timeout = timeout;
        self
    }

    /// Mutable access to the persisted state between cycles.
    pub fn state_mut(&mut self) -> &mut StateStore {
        &mut self.state
    }

    /// Runs the polling loop forever. Cycle failures are logged and the
    /// loop retries after the fixed poll interval; nothing is fatal.
    pub async fn run(&mut self) {
        self.log_startup();
        loop {
            if let Err(err) = self.tick().await {
                error!(error = %err, "polling cycle failed");
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Runs one polling cycle: loop hooks, fetch, dispatch, persist.
    pub async fn tick(&mut self) -> Result<()> {
        self.dispatcher
            .run_hooks(self.api.clone(), &self.loop_hooks, None)
            .await?;

        let offset = self.state.current_update_id()?;
        info!(current_update_id = offset, "polling for updates");

        let allowed = self.allowed_updates();
        let raw_updates = self.api.get_updates(offset, &allowed).await?;
        if raw_updates.is_empty() {
            return Ok(());
        }

        let mut updates: Vec<Update> = raw_updates.iter().map(Update::from_value).collect();
        updates.sort_by_key(|update| update.update_id);

        for update in updates {
            // Acknowledge before dispatching so a failed cycle cannot
            // replay an update that already reached its commands.
            if let Some(id) = update.update_id {
                self.state.set_current_update_id(id + 1)?;
            }
            self.on_update(update).await?;
        }

        self.state.save_if_changed()?;
        Ok(())
    }

    async fn on_update(&mut self, update: Update) -> Result<()> {
        if let Some(query) = update.callback_query {
            if let Some(handler) = &self.callback_handler {
                handler.handle(self.api.clone(), query).await?;
            }
            return Ok(());
        }

        let Some(message) = update.message else {
            return Ok(());
        };

        if let Some(sender) = &message.sender {
            debug!(chat_id = ?message.chat_id, sender = %sender.display_name(), "new message");
        }

        if message.is_command {
            let mut batch = self.builtin_commands();
            batch.extend(self.commands.iter().cloned());
            self.dispatcher
                .dispatch_commands(self.api.clone(), &batch, &message)
                .await
        } else {
            self.dispatcher
                .run_hooks(self.api.clone(), &self.message_hooks, Some(&message))
                .await
        }
    }

    /// `/help` and `/start`, with the help listing seeded from the
    /// registered commands.
    fn builtin_commands(&self) -> Vec<Arc<dyn Command>> {
        let entries: Vec<CommandInfo> = self
            .commands
            .iter()
            .map(|command| CommandInfo {
                command: command.trigger().trim_start_matches('/').to_string(),
                description: command.description().to_string(),
            })
            .collect();
        let help = Arc::new(HelpCommand::new(entries));
        let start = Arc::new(StartCommand::new(help.clone()));
        vec![help, start]
    }

    fn allowed_updates(&self) -> Vec<UpdateKind> {
        let mut kinds = vec![UpdateKind::Message];
        if self.callback_handler.is_some() {
            kinds.push(UpdateKind::CallbackQuery);
        }
        kinds
    }

    fn log_startup(&self) {
        let triggers: Vec<&str> = self
            .commands
            .iter()
            .map(|command| command.trigger())
            .collect();
        let message_hooks: Vec<&str> = self.message_hooks.iter().map(|hook| hook.name()).collect();
        let loop_hooks: Vec<&str> = self.loop_hooks.iter().map(|hook| hook.name()).collect();
        info!(bot = %self.name, "starting bot");
        info!(commands = ?triggers, "commands enabled");
        info!(hooks = ?message_hooks, "hooks on every message");
        info!(hooks = ?loop_hooks, "hooks on every cycle");
    }
}
