//! Movie-library commands backed by a Radarr v3 HTTP API.

use std::env;

use async_trait::async_trait;
use botkit_core::{Command, CommandContext, ParseMode, Result};
use serde_json::{json, Value};

use super::external;

/// Connection settings for the Radarr server, plus the defaults applied
/// when adding a movie.
#[derive(Clone)]
pub struct RadarrConfig {
    pub url: String,
    pub api_key: String,
    pub quality_profile_id: i64,
    pub root_folder: String,
}

impl RadarrConfig {
    /// Loads from env: `RADARR_URL` and `RADARR_API_KEY` required;
    /// `RADARR_QUALITY_PROFILE_ID` (default 6) and `RADARR_ROOT_FOLDER`
    /// (default `/data/media/Movies`) optional.
    pub fn from_env() -> anyhow::Result<Self> {
        let url = env::var("RADARR_URL").map_err(|_| anyhow::anyhow!("RADARR_URL not set"))?;
        let api_key =
            env::var("RADARR_API_KEY").map_err(|_| anyhow::anyhow!("RADARR_API_KEY not set"))?;
        let quality_profile_id = match env::var("RADARR_QUALITY_PROFILE_ID") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("RADARR_QUALITY_PROFILE_ID must be an integer"))?,
            Err(_) => 6,
        };
        let root_folder =
            env::var("RADARR_ROOT_FOLDER").unwrap_or_else(|_| "/data/media/Movies".to_string());
        Ok(Self {
            url,
            api_key,
            quality_profile_id,
            root_folder,
        })
    }
}

/// Thin client over the handful of Radarr endpoints the commands use.
struct RadarrClient {
    config: RadarrConfig,
    client: reqwest::Client,
}

impl RadarrClient {
    fn new(config: RadarrConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v3/{}", self.config.url.trim_end_matches('/'), path)
    }

    async fn lookup(&self, term: &str) -> Result<Vec<Value>> {
        let response = self
            .client
            .get(self.url("movie/lookup"))
            .header("X-Api-Key", &self.config.api_key)
            .query(&[("term", term)])
            .send()
            .await
            .map_err(external)?
            .error_for_status()
            .map_err(external)?;
        response.json().await.map_err(external)
    }

    async fn lookup_imdb(&self, imdb_id: &str) -> Result<Vec<Value>> {
        self.lookup(&format!("imdb:{imdb_id}")).await
    }

    /// Adds a looked-up movie. Radarr reports validation failures as a
    /// JSON array of `errorMessage` entries instead of an HTTP error, so
    /// the raw body is returned for the caller to inspect.
    async fn add_movie(&self, movie: &Value) -> Result<Value> {
        let mut body = movie.clone();
        if let Some(fields) = body.as_object_mut() {
            fields.insert(
                "qualityProfileId".to_string(),
                json!(self.config.quality_profile_id),
            );
            fields.insert("rootFolderPath".to_string(), json!(self.config.root_folder));
            fields.insert("monitored".to_string(), json!(true));
            fields.insert("addOptions".to_string(), json!({"searchForMovie": true}));
        }
        let response = self
            .client
            .post(self.url("movie"))
            .header("X-Api-Key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(external)?;
        response.json().await.map_err(external)
    }

    async fn delete_movie(&self, id: i64) -> Result<()> {
        self.client
            .delete(self.url(&format!("movie/{id}")))
            .header("X-Api-Key", &self.config.api_key)
            .query(&[("deleteFiles", "true")])
            .send()
            .await
            .map_err(external)?
            .error_for_status()
            .map_err(external)?;
        Ok(())
    }
}

fn title_and_year(movie: &Value) -> (&str, i64) {
    (
        movie.get("title").and_then(Value::as_str).unwrap_or("<unknown>"),
        movie.get("year").and_then(Value::as_i64).unwrap_or(0),
    )
}

/// `/radarr <IMDB ID> | remove <IMDB ID>`: adds or removes a movie.
pub struct RadarrCommand {
    client: RadarrClient,
}

impl RadarrCommand {
    pub fn new(config: RadarrConfig) -> Self {
        Self {
            client: RadarrClient::new(config),
        }
    }

    async fn remove_movie(&self, ctx: &CommandContext, chat_id: i64) -> Result<()> {
        let Some(imdb_id) = ctx.args.get(1) else {
            ctx.api.send_message(chat_id, "No IMDB ID given", None).await?;
            return Ok(());
        };

        let results = self.client.lookup_imdb(imdb_id).await?;
        let Some(movie) = results.first() else {
            ctx.api.send_message(chat_id, "Movie is not added", None).await?;
            return Ok(());
        };
        let Some(movie_id) = movie.get("id").and_then(Value::as_i64) else {
            ctx.api.send_message(chat_id, "Movie is not added", None).await?;
            return Ok(());
        };

        self.client.delete_movie(movie_id).await?;
        let (title, year) = title_and_year(movie);
        ctx.api
            .send_message(chat_id, &format!("Removed movie: {title} ({year})"), None)
            .await
    }
}

#[async_trait]
impl Command for RadarrCommand {
    fn trigger(&self) -> &str {
        "/radarr"
    }

    fn description(&self) -> &str {
        "<IMDB ID> | remove <IMDB ID> - Adds or removes a movie"
    }

    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let Some(chat_id) = ctx.chat_id() else {
            return Ok(());
        };
        let Some(query) = ctx.args.first() else {
            ctx.api.send_message(chat_id, "No query given", None).await?;
            return Ok(());
        };

        if query.eq_ignore_ascii_case("remove") {
            return self.remove_movie(ctx, chat_id).await;
        }

        let results = self.client.lookup_imdb(query).await?;
        let Some(movie) = results.first() else {
            ctx.api
                .send_message(chat_id, &format!("No result found for: {query}"), None)
                .await?;
            return Ok(());
        };

        let added = self.client.add_movie(movie).await?;
        if let Some(error_message) = added
            .get(0)
            .and_then(|entry| entry.get("errorMessage"))
            .and_then(Value::as_str)
        {
            ctx.api.send_message(chat_id, error_message, None).await?;
            return Ok(());
        }

        let (title, year) = title_and_year(&added);
        ctx.api
            .send_message(chat_id, &format!("Added movie: {title} ({year})"), None)
            .await
    }
}

/// `/find_movies <search term>`: replies with a year-sorted table of
/// matching movies and their IMDB ids.
pub struct FindMoviesCommand {
    client: RadarrClient,
}

impl FindMoviesCommand {
    pub fn new(config: RadarrConfig) -> Self {
        Self {
            client: RadarrClient::new(config),
        }
    }
}

#[async_trait]
impl Command for FindMoviesCommand {
    fn trigger(&self) -> &str {
        "/find_movies"
    }

    fn description(&self) -> &str {
        "<search term> - Returns a table of movies and IMDB IDs matching search term"
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

        let results = self.client.lookup(&query).await?;
        if results.is_empty() {
            ctx.api
                .send_message(chat_id, &format!("No result found for: {query}"), None)
                .await?;
            return Ok(());
        }

        let rows: Vec<MovieRow> = results
            .iter()
            .map(|movie| {
                let (title, year) = title_and_year(movie);
                MovieRow {
                    title: title.to_string(),
                    year,
                    imdb_id: movie
                        .get("imdbId")
                        .and_then(Value::as_str)
                        .unwrap_or("<none found>")
                        .to_string(),
                }
            })
            .collect();

        let table = format_movie_table(rows);
        ctx.api
            .send_message(
                chat_id,
                &format!("```\n{table}\n```"),
                Some(ParseMode::MarkdownV2),
            )
            .await
    }
}

struct MovieRow {
    title: String,
    year: i64,
    imdb_id: String,
}

/// Fixed-width listing sorted by year, newest first.
fn format_movie_table(mut rows: Vec<MovieRow>) -> String {
    rows.sort_by(|a, b| b.year.cmp(&a.year));
    let title_width = rows
        .iter()
        .map(|row| row.title.chars().count())
        .chain(std::iter::once("Movie Name".len()))
        .max()
        .unwrap_or(0);

    let mut lines = vec![format!("{:<width$}  Year  IMDB ID", "Movie Name", width = title_width)];
    for row in rows {
        lines.push(format!(
            "{:<width$}  {:<4}  {}",
            row.title,
            row.year,
            row.imdb_id,
            width = title_width
        ));
    }
    lines.join("\n")
}
