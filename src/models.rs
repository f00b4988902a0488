//! Data models for CineStream

use serde::{Deserialize, Serialize};

/// Top-level views the app can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Welcome,
    Home,
    Search,
}

/// A movie record as received from the metadata source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: String,
    pub title: String,
    pub poster_url: Option<String>,
    pub genre: Vec<String>,
    pub description: String,
    pub rating: Option<f32>,
    pub release_year: Option<u16>,
    pub cast: Vec<String>,
    pub director: Option<String>,
    pub runtime_minutes: Option<u32>,
}

/// Card shown in a content row
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub image: Option<String>,
    pub genre: String,
    pub description: String,
    pub rating: String,
    pub year: String,
    pub cast: Vec<String>,
    pub director: String,
}

/// Ranked entry of the top-ten row
#[derive(Debug, Clone, PartialEq)]
pub struct TopTenItem {
    pub id: String,
    pub title: String,
    pub image: Option<String>,
    pub rank: usize,
    pub category: String,
}

/// Everything the detail modal displays
#[derive(Debug, Clone, PartialEq)]
pub struct DetailContent {
    pub id: String,
    pub title: String,
    pub image: Option<String>,
    pub rating: String,
    pub duration: String,
    pub category: String,
    pub year: String,
    pub description: String,
    pub cast: Vec<String>,
    pub director: String,
}

/// Media source handed to the player overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamingSource {
    pub url: String,
    #[serde(default)]
    pub quality: Option<String>,
}

/// Signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub signed_in_at: chrono::DateTime<chrono::Utc>,
}

/// Last known playback position (persisted to JSON)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchProgress {
    pub key: String,
    pub title: String,
    pub position: f64,
    #[serde(default)]
    pub duration: f64,
    pub updated_at: i64,
}
