//! `/wikipedia`: looks a term up via the MediaWiki search API and
//! replies with a short summary and the page link.

use async_trait::async_trait;
use botkit_core::{Command, CommandContext, ParseMode, Result};
use serde_json::Value;

use super::external;

pub struct WikipediaCommand {
    search_url: String,
    summary_url: String,
    client: reqwest::Client,
}

impl WikipediaCommand {
    /// Command against custom MediaWiki endpoints (tests, mirrors).
    pub fn with_base_urls(search_url: impl Into<String>, summary_url: impl Into<String>) -> Self {
        Self {
            search_url: search_url.into(),
            summary_url: summary_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl Default for WikipediaCommand {
    fn default() -> Self {
        Self::with_base_urls(
            "https://en.wikipedia.org/w/api.php",
            "https://en.wikipedia.org/api/rest_v1/page/summary",
        )
    }
}

#[async_trait]
impl Command for WikipediaCommand {
    fn trigger(&self) -> &str {
        "/wikipedia"
    }

    fn description(&self) -> &str {
        "<search term> - Returns a Wikipedia page matching search term"
    }

    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let Some(chat_id) = ctx.chat_id() else {
            return Ok(());
        };
        let query = ctx.args.join(" ");
        if query.is_empty() {
            ctx.api.send_message(chat_id, "No query given", None).await?;
            return Ok(());
        }

        let search: Value = self
            .client
            .get(&self.search_url)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query.as_str()),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(external)?
            .error_for_status()
            .map_err(external)?
            .json()
            .await
            .map_err(external)?;
        let Some(title) = search
            .pointer("/query/search/0/title")
            .and_then(Value::as_str)
        else {
            ctx.api
                .send_message(chat_id, "No results found for query", None)
                .await?;
            return Ok(());
        };

        let summary_url = format!(
            "{}/{}",
            self.summary_url.trim_end_matches('/'),
            title.replace(' ', "_")
        );
        let summary: Value = self
            .client
            .get(&summary_url)
            .send()
            .await
            .map_err(external)?
            .error_for_status()
            .map_err(external)?
            .json()
            .await
            .map_err(external)?;

        let display_title = summary.get("title").and_then(Value::as_str).unwrap_or(title);
        let extract = summary
            .get("extract")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let page_url = summary
            .pointer("/content_urls/desktop/page")
            .and_then(Value::as_str)
            .unwrap_or_default();

        // Outbound text is HTML-parsed; page content must be escaped.
        let text = format!(
            "<b>{}:</b>\n{}\n\n{}",
            escape_html(display_title),
            escape_html(&first_sentences(extract, 2)),
            page_url
        );
        ctx.api
            .send_message(chat_id, &text, Some(ParseMode::Html))
            .await
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// First `count` sentences of `text`; the whole text when it has fewer
/// sentence breaks.
fn first_sentences(text: &str, count: usize) -> String {
    let mut seen = 0;
    for (idx, _) in text.match_indices(". ") {
        seen += 1;
        if seen == count {
            return text[..idx + 1].to_string();
        }
    }
    text.trim_end().to_string()
}
