//! # botkit-core
//!
//! Core of the polling-bot framework: domain model, command abstraction,
//! dispatcher, polling loop, and persisted state. Transport-agnostic;
//! backends implement [`ChatApi`] (see botkit-telegram).

pub mod api;
pub mod bot;
pub mod command;
mod dispatch;
pub mod error;
pub mod logger;
pub mod state;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ChatApi, CommandInfo, ParseMode, UpdateKind};
pub use bot::{Bot, DEFAULT_COMMAND_TIMEOUT, DEFAULT_POLL_INTERVAL, DEFAULT_STATE_PATH};
pub use command::{CallbackHandler, Command, CommandContext, HelpCommand, Hook, StartCommand};
pub use error::{BotError, CommandError, Result};
pub use logger::init_tracing;
pub use state::StateStore;
pub use types::{CallbackQuery, Message, Update, User};
