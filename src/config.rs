//! Configuration management

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{User, WatchProgress};

pub const DEMO_VIDEO_URL: &str =
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4";

/// IMDb ids loaded for the "popular" rows when nothing else is configured
pub const DEFAULT_POPULAR_IDS: &[&str] = &[
    "tt0111161", // The Shawshank Redemption
    "tt0068646", // The Godfather
    "tt0468569", // The Dark Knight
    "tt0071562", // The Godfather Part II
    "tt0050083", // 12 Angry Men
    "tt0108052", // Schindler's List
    "tt0167260", // The Return of the King
    "tt0110912", // Pulp Fiction
    "tt0120737", // The Fellowship of the Ring
    "tt0060196", // The Good, the Bad and the Ugly
    "tt0109830", // Forrest Gump
    "tt1375666", // Inception
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub omdb_api_key: String,
    #[serde(default = "default_omdb_url")]
    pub omdb_base_url: String,
    #[serde(default = "default_popular_ids")]
    pub popular_ids: Vec<String>,
    #[serde(default = "default_demo_url")]
    pub demo_video_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_true")]
    pub dark_mode: bool,
    #[serde(default = "default_controls_hide")]
    pub controls_hide_secs: f32,
    #[serde(default = "default_hero_rotate")]
    pub hero_rotate_secs: f32,
    // Saved session
    #[serde(default)]
    pub remember_session: bool,
    #[serde(default)]
    pub saved_user: Option<User>,
    // Watch progress (stored as JSON)
    #[serde(default)]
    pub watch_progress_json: String,
    // OMDB_API_KEY from the environment; never written back
    #[serde(skip)]
    pub env_api_key: Option<String>,
}

fn default_omdb_url() -> String { "https://www.omdbapi.com".to_string() }
fn default_popular_ids() -> Vec<String> { DEFAULT_POPULAR_IDS.iter().map(|s| s.to_string()).collect() }
fn default_demo_url() -> String { DEMO_VIDEO_URL.to_string() }
fn default_user_agent() -> String { format!("CineStream/{}", env!("CARGO_PKG_VERSION")) }
fn default_true() -> bool { true }
fn default_controls_hide() -> f32 { 3.0 }
fn default_hero_rotate() -> f32 { 8.0 }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            omdb_api_key: String::new(),
            omdb_base_url: default_omdb_url(),
            popular_ids: default_popular_ids(),
            demo_video_url: default_demo_url(),
            user_agent: default_user_agent(),
            dark_mode: true,
            controls_hide_secs: 3.0,
            hero_rotate_secs: 8.0,
            remember_session: false,
            saved_user: None,
            watch_progress_json: String::new(),
            env_api_key: None,
        }
    }
}

impl AppConfig {
    fn config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("cinestream");
        fs::create_dir_all(&path).ok();
        path.push("config.json");
        path
    }

    /// Load config from disk, falling back to defaults. `OMDB_API_KEY`
    /// overrides the stored key for this run only.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path(), std::env::var("OMDB_API_KEY").ok())
    }

    pub fn load_from(path: &Path, env_api_key: Option<String>) -> Self {
        let mut config = match fs::read_to_string(path) {
            Ok(content) => Self::from_json(&content).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        };

        config.env_api_key = env_api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        config
    }

    /// Key used for requests: the environment override, else the stored key
    pub fn api_key(&self) -> &str {
        self.env_api_key.as_deref().unwrap_or(&self.omdb_api_key)
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn save(&self) {
        self.save_to(&Self::config_path());
    }

    pub fn save_to(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(content) => {
                if let Err(e) = fs::write(path, content) {
                    log::error!("Failed to write config {}: {}", path.display(), e);
                }
            }
            Err(e) => log::error!("Failed to serialize config: {}", e),
        }
    }

    pub fn watch_progress(&self) -> Vec<WatchProgress> {
        if self.watch_progress_json.is_empty() {
            return Vec::new();
        }
        serde_json::from_str(&self.watch_progress_json).unwrap_or_default()
    }

    pub fn set_watch_progress(&mut self, entries: &[WatchProgress]) {
        self.watch_progress_json = serde_json::to_string(entries).unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = AppConfig::from_json(r#"{"omdb_api_key":"abc123"}"#).unwrap();
        assert_eq!(config.omdb_api_key, "abc123");
        assert_eq!(config.omdb_base_url, "https://www.omdbapi.com");
        assert_eq!(config.demo_video_url, DEMO_VIDEO_URL);
        assert_eq!(config.controls_hide_secs, 3.0);
        assert_eq!(config.popular_ids.len(), DEFAULT_POPULAR_IDS.len());
        assert!(config.dark_mode);
        assert!(config.saved_user.is_none());
    }

    #[test]
    fn test_watch_progress_json() {
        let mut config = AppConfig::default();
        assert!(config.watch_progress().is_empty());

        let entry = WatchProgress {
            key: "tt0111161".to_string(),
            title: "The Shawshank Redemption".to_string(),
            position: 42.5,
            duration: 596.0,
            updated_at: 1_700_000_000,
        };
        config.set_watch_progress(std::slice::from_ref(&entry));
        assert_eq!(config.watch_progress(), vec![entry]);
    }

    fn temp_config_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cinestream-test-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join("config.json")
    }

    #[test]
    fn test_env_key_overrides_without_persisting() {
        let path = temp_config_path("env-key");
        fs::write(&path, r#"{"omdb_api_key":"stored-key"}"#).unwrap();

        let config = AppConfig::load_from(&path, Some(" secret-from-env ".to_string()));
        assert_eq!(config.api_key(), "secret-from-env");
        assert_eq!(config.omdb_api_key, "stored-key");

        config.save_to(&path);
        let written = fs::read_to_string(&path).unwrap();
        assert!(!written.contains("secret-from-env"));
        assert!(written.contains("stored-key"));

        let reloaded = AppConfig::load_from(&path, None);
        assert_eq!(reloaded.api_key(), "stored-key");
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_blank_env_key_is_ignored() {
        let path = temp_config_path("blank-env");
        fs::write(&path, r#"{"omdb_api_key":"stored-key"}"#).unwrap();
        let config = AppConfig::load_from(&path, Some("   ".to_string()));
        assert!(config.env_api_key.is_none());
        assert_eq!(config.api_key(), "stored-key");
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_corrupt_progress_is_empty() {
        let config = AppConfig {
            watch_progress_json: "not json".to_string(),
            ..AppConfig::default()
        };
        assert!(config.watch_progress().is_empty());
    }
}
