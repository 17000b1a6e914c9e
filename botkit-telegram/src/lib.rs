//! # botkit-telegram
//!
//! Telegram transport for the botkit framework: a reqwest client
//! implementing [`botkit_core::ChatApi`] plus minimal env-based
//! configuration. Handles only Telegram connectivity; dispatch and
//! persistence live in botkit-core.

mod api;
mod config;

pub use api::TelegramApi;
pub use config::TelegramConfig;
