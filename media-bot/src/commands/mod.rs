//! Command plugins for the media bot. Each plugin is thin glue between
//! the command trait and one external service.

mod kanye;
mod radarr;
mod wikipedia;
mod youtube_dl;

#[cfg(test)]
pub(crate) mod testutil;

pub use kanye::KanyeCommand;
pub use radarr::{FindMoviesCommand, RadarrCommand, RadarrConfig};
pub use wikipedia::WikipediaCommand;
pub use youtube_dl::YoutubeDlCommand;

use botkit_core::{BotError, CommandError};

/// Maps an external-service failure into the command error taxonomy.
pub(crate) fn external(err: impl std::fmt::Display) -> BotError {
    BotError::Command(CommandError::External(err.to_string()))
}
