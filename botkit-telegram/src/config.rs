//! Minimal transport config: token, API host override, state-file path,
//! and loop timing knobs. Loaded from environment variables.

use std::env;
use std::time::Duration;

use anyhow::Result;

pub struct TelegramConfig {
    pub bot_token: String,
    pub api_url: Option<String>,
    pub data_file: Option<String>,
    pub poll_interval: Option<Duration>,
    pub command_timeout: Option<Duration>,
}

impl TelegramConfig {
    /// Loads from env: `BOT_TOKEN` required; `TELEGRAM_API_URL`,
    /// `BOT_DATA_FILE`, `BOT_POLL_INTERVAL_SECS` and
    /// `BOT_COMMAND_TIMEOUT_SECS` optional.
    pub fn from_env() -> Result<Self> {
        let bot_token = env::var("BOT_TOKEN").map_err(|_| anyhow::anyhow!("BOT_TOKEN not set"))?;
        Ok(Self {
            bot_token,
            api_url: env::var("TELEGRAM_API_URL").ok(),
            data_file: env::var("BOT_DATA_FILE").ok(),
            poll_interval: parse_secs("BOT_POLL_INTERVAL_SECS")?,
            command_timeout: parse_secs("BOT_COMMAND_TIMEOUT_SECS")?,
        })
    }

    /// Constructs with the given token, everything else defaulted.
    pub fn with_token(bot_token: String) -> Self {
        Self {
            bot_token,
            api_url: None,
            data_file: None,
            poll_interval: None,
            command_timeout: None,
        }
    }
}

fn parse_secs(var: &str) -> Result<Option<Duration>> {
    match env::var(var) {
        Ok(raw) => {
            let secs: u64 = raw
                .parse()
                .map_err(|_| anyhow::anyhow!("{var} must be an integer number of seconds"))?;
            Ok(Some(Duration::from_secs(secs)))
        }
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_token() {
        let config = TelegramConfig::with_token("test_token".to_string());
        assert_eq!(config.bot_token, "test_token");
        assert!(config.api_url.is_none());
        assert!(config.data_file.is_none());
        assert!(config.poll_interval.is_none());
        assert!(config.command_timeout.is_none());
    }
}
