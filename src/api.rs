//! OMDb metadata API client

use std::thread;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{FetchError, FetchResult};
use crate::models::MovieSummary;

/// Source of movie records. The fetch hook only talks to this trait.
pub trait MetadataProvider: Send + Sync {
    fn popular_movies(&self) -> FetchResult<Vec<MovieSummary>>;
    fn search(&self, query: &str) -> FetchResult<Vec<MovieSummary>>;
}

#[derive(Debug, Deserialize)]
struct OmdbStatus {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbMovie {
    title: String,
    #[serde(default)]
    year: Option<String>,
    #[serde(default)]
    genre: Option<String>,
    #[serde(default)]
    director: Option<String>,
    #[serde(default)]
    actors: Option<String>,
    #[serde(default)]
    plot: Option<String>,
    #[serde(default)]
    poster: Option<String>,
    #[serde(default)]
    runtime: Option<String>,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: String,
}

#[derive(Debug, Deserialize)]
struct OmdbSearch {
    #[serde(rename = "Search", default)]
    search: Vec<OmdbMovie>,
}

pub struct OmdbClient {
    base_url: String,
    api_key: String,
    popular_ids: Vec<String>,
    user_agent: String,
    agent: ureq::Agent,
}

impl OmdbClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .timeout_connect(Some(Duration::from_secs(10)))
            .build()
            .new_agent();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            popular_ids: Vec::new(),
            user_agent: format!("CineStream/{}", env!("CARGO_PKG_VERSION")),
            agent,
        }
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn with_popular_ids(mut self, ids: &[String]) -> Self {
        self.popular_ids = ids.to_vec();
        self
    }

    fn make_request(&self, params: &[(&str, &str)]) -> FetchResult<String> {
        if self.api_key.is_empty() {
            return Err(FetchError::MissingApiKey);
        }

        let mut request = self
            .agent
            .get(format!("{}/", self.base_url))
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json")
            .query("apikey", &self.api_key);
        for (name, value) in params {
            request = request.query(*name, *value);
        }

        let mut response = request.call()?;
        response
            .body_mut()
            .read_to_string()
            .map_err(|e| FetchError::Http(e.to_string()))
    }

    pub fn get_movie(&self, imdb_id: &str) -> FetchResult<MovieSummary> {
        let body = self.make_request(&[("i", imdb_id), ("plot", "short")])?;
        parse_movie(&body)
    }
}

impl MetadataProvider for OmdbClient {
    fn popular_movies(&self) -> FetchResult<Vec<MovieSummary>> {
        if self.api_key.is_empty() {
            return Err(FetchError::MissingApiKey);
        }

        // One request per id, issued in parallel
        let results: Vec<(String, FetchResult<MovieSummary>)> = thread::scope(|s| {
            let handles: Vec<_> = self
                .popular_ids
                .iter()
                .map(|id| (id.clone(), s.spawn(move || self.get_movie(id))))
                .collect();

            handles
                .into_iter()
                .map(|(id, handle)| {
                    let result = handle
                        .join()
                        .unwrap_or_else(|_| Err(FetchError::Http("worker thread panicked".to_string())));
                    (id, result)
                })
                .collect()
        });

        collect_popular(results)
    }

    fn search(&self, query: &str) -> FetchResult<Vec<MovieSummary>> {
        let body = self.make_request(&[("s", query.trim()), ("type", "movie")])?;
        parse_search(&body)
    }
}

/// Keep the movies that loaded. Failures are logged and skipped; the whole
/// fetch fails only when every lookup failed.
pub fn collect_popular(results: Vec<(String, FetchResult<MovieSummary>)>) -> FetchResult<Vec<MovieSummary>> {
    let mut movies = Vec::with_capacity(results.len());
    let mut last_error = None;
    for (id, result) in results {
        match result {
            Ok(movie) => movies.push(movie),
            Err(e) => {
                log::warn!("Skipping {}: {}", id, e);
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if movies.is_empty() => Err(e),
        _ => Ok(movies),
    }
}

fn check_status(body: &str) -> FetchResult<bool> {
    let status: OmdbStatus = serde_json::from_str(body)?;
    if status.response.eq_ignore_ascii_case("true") {
        return Ok(true);
    }
    match status.error {
        // OMDb reports an empty search as an error
        Some(e) if e.contains("not found") => Ok(false),
        Some(e) => Err(FetchError::Api(e)),
        None => Err(FetchError::Api("unknown error".to_string())),
    }
}

/// Parse a single `?i=` lookup response
pub fn parse_movie(body: &str) -> FetchResult<MovieSummary> {
    if !check_status(body)? {
        return Err(FetchError::Api("Movie not found!".to_string()));
    }
    let movie: OmdbMovie = serde_json::from_str(body)?;
    Ok(movie.into())
}

/// Parse a `?s=` search response. No matches is an empty list, not an error.
pub fn parse_search(body: &str) -> FetchResult<Vec<MovieSummary>> {
    if !check_status(body)? {
        return Ok(Vec::new());
    }
    let search: OmdbSearch = serde_json::from_str(body)?;
    Ok(search.search.into_iter().map(MovieSummary::from).collect())
}

impl From<OmdbMovie> for MovieSummary {
    fn from(m: OmdbMovie) -> Self {
        MovieSummary {
            id: m.imdb_id,
            title: m.title,
            poster_url: available(m.poster),
            genre: split_list(m.genre),
            description: available(m.plot).unwrap_or_default(),
            rating: available(m.imdb_rating).and_then(|r| r.parse().ok()),
            release_year: available(m.year).and_then(|y| parse_year(&y)),
            cast: split_list(m.actors),
            director: available(m.director),
            runtime_minutes: available(m.runtime).and_then(|r| parse_runtime(&r)),
        }
    }
}

/// OMDb uses "N/A" for missing values
fn available(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != "N/A")
}

fn split_list(value: Option<String>) -> Vec<String> {
    available(value)
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// "1994" or "2010–2013" -> first year
fn parse_year(value: &str) -> Option<u16> {
    let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() == 4 {
        digits.parse().ok()
    } else {
        None
    }
}

/// "142 min" -> 142
fn parse_runtime(value: &str) -> Option<u32> {
    value.split_whitespace().next()?.parse().ok()
}
