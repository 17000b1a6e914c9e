//! media-bot: example bot wiring the botkit framework to media-library,
//! quote, download, and encyclopedia commands. Config from env and
//! optional CLI args.

use std::sync::Arc;

use anyhow::{Context, Result};
use botkit_core::{init_tracing, Bot};
use botkit_telegram::{TelegramApi, TelegramConfig};
use clap::{Parser, Subcommand};

mod commands;

use commands::{
    FindMoviesCommand, KanyeCommand, RadarrCommand, RadarrConfig, WikipediaCommand,
    YoutubeDlCommand,
};

#[derive(Parser)]
#[command(name = "media-bot")]
#[command(about = "Telegram media bot: run the polling loop", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
        /// Log filter, e.g. `debug` or `media_bot=debug,botkit_core=info`.
        #[arg(long)]
        log: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { token, log } => run(token, log).await,
    }
}

async fn run(token: Option<String>, log: Option<String>) -> Result<()> {
    init_tracing(log.as_deref())?;

    let config = match token {
        Some(token) => TelegramConfig::with_token(token),
        None => TelegramConfig::from_env()?,
    };

    let api = match &config.api_url {
        Some(host) => TelegramApi::with_base_url(&config.bot_token, host),
        None => TelegramApi::new(&config.bot_token),
    }
    .context("failed to build Telegram client")?;

    let radarr = RadarrConfig::from_env()?;

    let mut bot = Bot::new(Arc::new(api), "media-bot")
        .add_command(Arc::new(RadarrCommand::new(radarr.clone())))
        .add_command(Arc::new(FindMoviesCommand::new(radarr)))
        .add_command(Arc::new(KanyeCommand::default()))
        .add_command(Arc::new(YoutubeDlCommand::new(".ignore/downloads")))
        .add_command(Arc::new(WikipediaCommand::default()));

    if let Some(path) = &config.data_file {
        bot = bot.state_path(path);
    }
    if let Some(interval) = config.poll_interval {
        bot = bot.poll_interval(interval);
    }
    if let Some(timeout) = config.command_timeout {
        bot = bot.command_timeout(timeout);
    }

    bot.run().await;
    Ok(())
}
