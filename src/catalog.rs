//! Home page composition: maps fetched records onto the shapes each view
//! component draws, and decides which screen the home route shows.

use crate::fetch::{FetchStatus, MovieFetcher};
use crate::models::{ContentItem, DetailContent, MovieSummary, TopTenItem};
use crate::session::SessionProvider;

const PLACEHOLDER: &str = "N/A";
pub const HERO_COUNT: usize = 5;
pub const ROW_COUNT: usize = 10;

/// Everything the populated home screen renders
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub hero: Vec<MovieSummary>,
    pub top_ten: Vec<TopTenItem>,
    pub popular: Vec<ContentItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HomeScreen {
    /// No session: go to the welcome view and draw nothing
    Redirect,
    Spinner,
    Empty,
    Failed(String),
    Catalog(Catalog),
}

pub fn compose_home(session: &dyn SessionProvider, fetcher: &MovieFetcher) -> HomeScreen {
    if !session.is_signed_in() {
        return HomeScreen::Redirect;
    }
    compose_movies(fetcher.movies(), fetcher.status())
}

/// Screen for a given fetch state. Movies already on hand are shown even
/// while a refresh is in flight.
pub fn compose_movies(movies: &[MovieSummary], status: &FetchStatus) -> HomeScreen {
    if !movies.is_empty() {
        return HomeScreen::Catalog(build_catalog(movies));
    }
    match status {
        FetchStatus::Idle | FetchStatus::Loading => HomeScreen::Spinner,
        FetchStatus::Failed(msg) => HomeScreen::Failed(msg.clone()),
        FetchStatus::Loaded | FetchStatus::Empty => HomeScreen::Empty,
    }
}

pub fn build_catalog(movies: &[MovieSummary]) -> Catalog {
    let popular: Vec<ContentItem> = movies.iter().take(ROW_COUNT).map(to_content_item).collect();
    Catalog {
        hero: movies.iter().take(HERO_COUNT).cloned().collect(),
        top_ten: to_top_ten(&popular),
        popular,
    }
}

fn or_placeholder(value: Option<String>) -> String {
    value.unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn genre_text(genre: &[String]) -> String {
    if genre.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        genre.join(", ")
    }
}

pub fn to_content_item(movie: &MovieSummary) -> ContentItem {
    ContentItem {
        id: movie.id.clone(),
        title: movie.title.clone(),
        image: movie.poster_url.clone(),
        genre: genre_text(&movie.genre),
        description: movie.description.clone(),
        rating: or_placeholder(movie.rating.map(|r| r.to_string())),
        year: or_placeholder(movie.release_year.map(|y| y.to_string())),
        cast: movie.cast.clone(),
        director: or_placeholder(movie.director.clone()),
    }
}

/// Rank the first ten items 1..=10 in input order
pub fn to_top_ten(items: &[ContentItem]) -> Vec<TopTenItem> {
    items
        .iter()
        .take(ROW_COUNT)
        .enumerate()
        .map(|(index, item)| TopTenItem {
            id: item.id.clone(),
            title: item.title.clone(),
            image: item.image.clone(),
            rank: index + 1,
            category: item.genre.clone(),
        })
        .collect()
}

/// "148" minutes -> "2h 28m"
pub fn format_runtime(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

pub fn to_detail(movie: &MovieSummary) -> DetailContent {
    DetailContent {
        id: movie.id.clone(),
        title: movie.title.clone(),
        image: movie.poster_url.clone(),
        rating: or_placeholder(movie.rating.map(|r| r.to_string())),
        duration: or_placeholder(movie.runtime_minutes.map(format_runtime)),
        category: genre_text(&movie.genre),
        year: or_placeholder(movie.release_year.map(|y| y.to_string())),
        description: movie.description.clone(),
        cast: movie.cast.clone(),
        director: or_placeholder(movie.director.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::session::Session;

    fn movie(n: usize) -> MovieSummary {
        MovieSummary {
            id: format!("tt{:07}", n),
            title: format!("Movie {}", n),
            poster_url: Some(format!("https://example.com/{}.jpg", n)),
            genre: vec!["Action".to_string(), "Sci-Fi".to_string()],
            description: "A plot.".to_string(),
            rating: Some(8.5),
            release_year: Some(1999),
            cast: vec!["Keanu Reeves".to_string()],
            director: Some("Lana Wachowski".to_string()),
            runtime_minutes: Some(136),
        }
    }

    fn movies(n: usize) -> Vec<MovieSummary> {
        (1..=n).map(movie).collect()
    }

    fn signed_in() -> Session {
        Session::new(Some(User {
            name: "Ana".to_string(),
            email: String::new(),
            signed_in_at: chrono::Utc::now(),
        }))
    }

    #[test]
    fn test_top_ten_ranks_in_input_order() {
        for n in [0, 1, 3, 10, 14] {
            let catalog = build_catalog(&movies(n));
            let expected = n.min(10);
            assert_eq!(catalog.top_ten.len(), expected);
            for (i, item) in catalog.top_ten.iter().enumerate() {
                assert_eq!(item.rank, i + 1);
                assert_eq!(item.title, format!("Movie {}", i + 1));
            }
        }
    }

    #[test]
    fn test_hero_and_popular_limits() {
        let catalog = build_catalog(&movies(14));
        assert_eq!(catalog.hero.len(), HERO_COUNT);
        assert_eq!(catalog.popular.len(), ROW_COUNT);
        assert_eq!(catalog.hero[0].id, "tt0000001");
    }

    #[test]
    fn test_content_item_fields() {
        let item = to_content_item(&movie(1));
        assert_eq!(item.genre, "Action, Sci-Fi");
        assert_eq!(item.rating, "8.5");
        assert_eq!(item.year, "1999");
        assert_eq!(item.director, "Lana Wachowski");
    }

    #[test]
    fn test_missing_fields_get_placeholder() {
        let mut m = movie(1);
        m.genre.clear();
        m.rating = None;
        m.release_year = None;
        m.director = None;
        m.runtime_minutes = None;

        let item = to_content_item(&m);
        assert_eq!(item.genre, "N/A");
        assert_eq!(item.rating, "N/A");
        assert_eq!(item.year, "N/A");
        assert_eq!(item.director, "N/A");

        let detail = to_detail(&m);
        assert_eq!(detail.duration, "N/A");
        assert_eq!(detail.category, "N/A");
    }

    #[test]
    fn test_detail_duration() {
        assert_eq!(format_runtime(148), "2h 28m");
        assert_eq!(format_runtime(45), "0h 45m");
        assert_eq!(to_detail(&movie(1)).duration, "2h 16m");
    }

    #[test]
    fn test_home_redirects_without_session() {
        let session = Session::default();
        let fetcher = MovieFetcher::new(std::sync::Arc::new(NoProvider));
        assert_eq!(compose_home(&session, &fetcher), HomeScreen::Redirect);
        assert_eq!(compose_home(&signed_in(), &fetcher), HomeScreen::Spinner);
    }

    #[test]
    fn test_home_screens_by_status() {
        assert_eq!(compose_movies(&[], &FetchStatus::Loading), HomeScreen::Spinner);
        assert_eq!(compose_movies(&[], &FetchStatus::Empty), HomeScreen::Empty);
        assert_eq!(
            compose_movies(&[], &FetchStatus::Failed("boom".to_string())),
            HomeScreen::Failed("boom".to_string())
        );
        match compose_movies(&movies(3), &FetchStatus::Loading) {
            HomeScreen::Catalog(c) => assert_eq!(c.top_ten.len(), 3),
            other => panic!("expected catalog, got {:?}", other),
        }
    }

    struct NoProvider;

    impl crate::api::MetadataProvider for NoProvider {
        fn popular_movies(&self) -> crate::error::FetchResult<Vec<MovieSummary>> {
            Ok(Vec::new())
        }

        fn search(&self, _query: &str) -> crate::error::FetchResult<Vec<MovieSummary>> {
            Ok(Vec::new())
        }
    }
}
