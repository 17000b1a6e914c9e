use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("State error: {0}")]
    State(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("No text in message")]
    NoText,

    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Execution timed out")]
    Timeout,

    #[error("Execution panicked")]
    Panicked,

    #[error("External service error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, BotError>;
