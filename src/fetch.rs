//! Movie fetch hook: result list, loading flag and trigger for the views

use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use crate::api::MetadataProvider;
use crate::error::FetchResult;
use crate::models::MovieSummary;

/// Outcome of the most recent request
#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Loaded,
    Empty,
    Failed(String),
}

enum FetchRequest {
    Popular,
    Search(String),
}

pub struct MovieFetcher {
    provider: Arc<dyn MetadataProvider>,
    movies: Vec<MovieSummary>,
    status: FetchStatus,
    query: String,
    receiver: Option<Receiver<FetchResult<Vec<MovieSummary>>>>,
}

impl MovieFetcher {
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self {
            provider,
            movies: Vec::new(),
            status: FetchStatus::Idle,
            query: String::new(),
            receiver: None,
        }
    }

    pub fn movies(&self) -> &[MovieSummary] {
        &self.movies
    }

    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    /// Query of the last accepted search
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Swap the metadata source (e.g. after the API key changes)
    pub fn set_provider(&mut self, provider: Arc<dyn MetadataProvider>) {
        self.provider = provider;
    }

    /// Trigger: load the popular movies list
    pub fn get_popular_movies(&mut self) {
        self.start(FetchRequest::Popular);
    }

    /// Trigger: search the metadata source by title
    pub fn search(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            if !self.is_loading() {
                self.movies.clear();
                self.status = FetchStatus::Idle;
                self.query.clear();
            }
            return;
        }
        if self.start(FetchRequest::Search(query.to_string())) {
            self.query = query.to_string();
        }
    }

    fn start(&mut self, request: FetchRequest) -> bool {
        if self.is_loading() {
            log::debug!("Fetch already in flight, ignoring trigger");
            return false;
        }

        self.status = FetchStatus::Loading;
        let (sender, receiver) = channel();
        self.receiver = Some(receiver);

        let provider = Arc::clone(&self.provider);
        thread::spawn(move || {
            let result = match request {
                FetchRequest::Popular => provider.popular_movies(),
                FetchRequest::Search(query) => provider.search(&query),
            };
            let _ = sender.send(result);
        });
        true
    }

    /// Drain the background result, if any. Returns true when state changed.
    pub fn poll(&mut self) -> bool {
        let Some(receiver) = &self.receiver else {
            return false;
        };

        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                self.receiver = None;
                self.status = FetchStatus::Failed("fetch worker exited unexpectedly".to_string());
                return true;
            }
        };
        self.receiver = None;

        match result {
            Ok(movies) => {
                log::info!("Loaded {} movies", movies.len());
                self.status = if movies.is_empty() {
                    FetchStatus::Empty
                } else {
                    FetchStatus::Loaded
                };
                self.movies = movies;
            }
            Err(e) => {
                log::error!("Movie fetch failed: {}", e);
                self.movies.clear();
                self.status = FetchStatus::Failed(e.to_string());
            }
        }
        true
    }
}
