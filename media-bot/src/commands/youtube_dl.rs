//! `/youtube_dl`: downloads a video with the yt-dlp binary and sends
//! it back as a document.

use std::path::PathBuf;

use async_trait::async_trait;
use botkit_core::{Command, CommandContext, Result};
use tracing::debug;

use super::external;

pub struct YoutubeDlCommand {
    download_dir: PathBuf,
}

impl YoutubeDlCommand {
    /// Command downloading into the given scratch directory. The
    /// directory is emptied after each successful upload.
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
        }
    }
}

#[async_trait]
impl Command for YoutubeDlCommand {
    fn trigger(&self) -> &str {
        "/youtube_dl"
    }

    fn description(&self) -> &str {
        "<video URL> - Sends a video file from any website supported by yt-dlp"
    }

    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let Some(chat_id) = ctx.chat_id() else {
            return Ok(());
        };
        let Some(link) = ctx.args.first() else {
            ctx.api.send_message(chat_id, "No link given", None).await?;
            return Ok(());
        };

        tokio::fs::create_dir_all(&self.download_dir).await?;
        let template = self.download_dir.join("%(id)s.%(ext)s");

        debug!(%link, "downloading video");
        let output = tokio::process::Command::new("yt-dlp")
            .arg("--quiet")
            .arg("--output")
            .arg(&template)
            .arg(link)
            .output()
            .await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(external(format!("yt-dlp failed: {}", stderr.trim())));
        }

        let mut entries = tokio::fs::read_dir(&self.download_dir).await?;
        let Some(entry) = entries.next_entry().await? else {
            return Err(external("download produced no file"));
        };
        ctx.api.send_document(chat_id, &entry.path()).await?;

        // The scratch directory is reused across runs; empty it so the
        // next download picks up only its own file.
        let mut entries = tokio::fs::read_dir(&self.download_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            tokio::fs::remove_file(entry.path()).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testutil::{command_ctx, RecordingApi};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_youtube_dl_without_link_asks_for_one() {
        let dir = tempfile::TempDir::new().unwrap();
        let command = YoutubeDlCommand::new(dir.path());
        let api = Arc::new(RecordingApi::default());

        command
            .execute(&command_ctx(api.clone(), 4, "/youtube_dl"))
            .await
            .unwrap();

        assert_eq!(api.sent_texts(), vec!["No link given".to_string()]);
        assert!(api.documents.lock().unwrap().is_empty());
    }
}
