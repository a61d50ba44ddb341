use engine::{Genres, RawMovie};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("invalid catalog url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("catalog returned {status} for {url}")]
    Status { status: StatusCode, url: String },

    #[error("unexpected catalog payload: {0}")]
    Payload(String),
}

// request urls carry the api key, so errors never keep them
impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self { FetchError::Transport(e.without_url()) }
}

/// Pages through a JSON movie catalog.
pub struct CatalogClient {
    client: Client,
    base: Url,
    api_key: Option<String>,
}

impl CatalogClient {
    pub fn new(base: &str, api_key: Option<String>, timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent.to_string())
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, base: Url::parse(base)?, api_key })
    }

    fn page_url(&self, page: u32) -> Url {
        let mut url = self.base.clone();
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("page", &page.to_string());
            if let Some(key) = &self.api_key {
                q.append_pair("api_key", key);
            }
        }
        url
    }

    pub async fn fetch_page(&self, page: u32) -> Result<CatalogPage, FetchError> {
        let url = self.page_url(page);
        let resp = self.client.get(url.clone()).send().await?;
        if !resp.status().is_success() {
            let mut shown = url;
            shown.set_query(None);
            return Err(FetchError::Status { status: resp.status(), url: shown.to_string() });
        }
        let body: Value = resp.json().await.map_err(|e| FetchError::Payload(e.without_url().to_string()))?;
        parse_page(body)
    }

    /// Fetch up to `max_pages` pages. Either every page succeeds or the whole fetch fails.
    pub async fn fetch_all(&self, max_pages: u32) -> Result<Vec<RawMovie>, FetchError> {
        let mut movies = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for page in 1..=max_pages.max(1) {
            let batch = self.fetch_page(page).await?;
            tracing::info!(page, movies = batch.movies.len(), skipped = batch.skipped, "fetched catalog page");
            let last = batch.movies.is_empty() || batch.total_pages.is_some_and(|total| page >= total);
            for movie in batch.movies {
                let title = movie.title.clone().unwrap_or_default();
                if !seen.insert(title.clone()) {
                    tracing::warn!(%title, page, "dropping duplicate title");
                    continue;
                }
                movies.push(movie);
            }
            if last {
                break;
            }
        }
        Ok(movies)
    }
}

#[derive(Debug, Default)]
pub struct CatalogPage {
    pub movies: Vec<RawMovie>,
    pub skipped: usize,
    pub total_pages: Option<u32>,
}

/// Accepts a bare array of movies or an object with a `results` array.
pub fn parse_page(body: Value) -> Result<CatalogPage, FetchError> {
    let (items, total_pages) = match body {
        Value::Array(items) => (items, None),
        Value::Object(mut obj) => {
            let total = obj.get("total_pages").and_then(Value::as_u64).map(|t| t as u32);
            match obj.remove("results") {
                Some(Value::Array(items)) => (items, total),
                _ => return Err(FetchError::Payload("object without a `results` array".into())),
            }
        }
        other => return Err(FetchError::Payload(format!("expected array or object, got {}", kind(&other)))),
    };

    let mut page = CatalogPage { total_pages, ..Default::default() };
    for (i, item) in items.into_iter().enumerate() {
        let Value::Object(obj) = item else {
            return Err(FetchError::Payload(format!("entry {i} is not an object")));
        };
        let title = ["title", "name"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_str))
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let Some(title) = title else {
            tracing::warn!(entry = i, "skipping catalog entry without title");
            page.skipped += 1;
            continue;
        };
        let overview = obj.get("overview").and_then(Value::as_str).unwrap_or_default();
        let poster = ["poster_path", "poster"].iter().find_map(|k| obj.get(*k).and_then(Value::as_str));
        page.movies.push(RawMovie {
            title: Some(title.to_string()),
            overview: Some(overview.to_string()),
            genres: obj.get("genres").and_then(parse_genres),
            poster: poster.map(str::to_string),
        });
    }
    Ok(page)
}

/// `"Drama|Crime"`, `["Drama"]` or `[{"id": 18, "name": "Drama"}]`.
fn parse_genres(v: &Value) -> Option<Genres> {
    match v {
        Value::String(s) => Some(Genres::Text(s.clone())),
        Value::Array(items) => {
            let tags: Vec<String> = items
                .iter()
                .filter_map(|g| match g {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(o) => o.get("name").and_then(Value::as_str).map(str::to_string),
                    _ => None,
                })
                .collect();
            Some(Genres::Tags(tags))
        }
        _ => None,
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
