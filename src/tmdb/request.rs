//! Fetch operation descriptors.
//!
//! Each upstream operation is described once: its endpoint and query for the
//! raw client, its category and key parameters for the cache. Both the raw
//! and the cached fetcher are driven from this table.

use crate::cache::{build_key, genres_key, movie_details_key, CacheKey, Category, KeyParams};
use crate::tmdb::{DiscoverFilters, TimeWindow};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FetchRequest<'a> {
    Popular { page: u32 },
    Trending { window: TimeWindow, page: u32 },
    TopRated { page: u32 },
    Details { movie_id: i64 },
    Search { query: &'a str, page: u32 },
    Genres,
    NowPlaying { page: u32 },
    Upcoming { page: u32 },
    Discover { filters: &'a DiscoverFilters },
    Recommendations { movie_id: i64, page: u32 },
    Similar { movie_id: i64, page: u32 },
}

impl FetchRequest<'_> {
    pub fn category(&self) -> Category {
        match self {
            FetchRequest::Popular { .. } => Category::PopularMovies,
            FetchRequest::Trending { .. } => Category::TrendingMovies,
            FetchRequest::TopRated { .. } => Category::TopRatedMovies,
            FetchRequest::Details { .. } => Category::MovieDetails,
            FetchRequest::Search { .. } => Category::SearchResults,
            FetchRequest::Genres => Category::Genres,
            FetchRequest::NowPlaying { .. } => Category::NowPlaying,
            FetchRequest::Upcoming { .. } => Category::Upcoming,
            FetchRequest::Discover { .. } => Category::Discover,
            FetchRequest::Recommendations { .. } => Category::Recommendations,
            FetchRequest::Similar { .. } => Category::Similar,
        }
    }

    /// Path relative to the API base URL.
    pub fn endpoint(&self) -> String {
        match self {
            FetchRequest::Popular { .. } => "movie/popular".to_string(),
            FetchRequest::Trending { window, .. } => format!("trending/movie/{}", window),
            FetchRequest::TopRated { .. } => "movie/top_rated".to_string(),
            FetchRequest::Details { movie_id } => format!("movie/{}", movie_id),
            FetchRequest::Search { .. } => "search/movie".to_string(),
            FetchRequest::Genres => "genre/movie/list".to_string(),
            FetchRequest::NowPlaying { .. } => "movie/now_playing".to_string(),
            FetchRequest::Upcoming { .. } => "movie/upcoming".to_string(),
            FetchRequest::Discover { .. } => "discover/movie".to_string(),
            FetchRequest::Recommendations { movie_id, .. } => {
                format!("movie/{}/recommendations", movie_id)
            }
            FetchRequest::Similar { movie_id, .. } => format!("movie/{}/similar", movie_id),
        }
    }

    /// Query string parameters, excluding the API key.
    pub fn query(&self) -> Vec<(String, String)> {
        let page = |page: &u32| vec![("page".to_string(), page.to_string())];

        match self {
            FetchRequest::Popular { page: p }
            | FetchRequest::Trending { page: p, .. }
            | FetchRequest::TopRated { page: p }
            | FetchRequest::NowPlaying { page: p }
            | FetchRequest::Upcoming { page: p }
            | FetchRequest::Recommendations { page: p, .. }
            | FetchRequest::Similar { page: p, .. } => page(p),
            FetchRequest::Search { query, page: p } => vec![
                ("query".to_string(), query.to_string()),
                ("page".to_string(), p.to_string()),
                ("include_adult".to_string(), "false".to_string()),
            ],
            FetchRequest::Discover { filters } => filters
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            FetchRequest::Details { .. } | FetchRequest::Genres => Vec::new(),
        }
    }

    /// Parameters that identify the result in the cache.
    pub fn key_params(&self) -> KeyParams {
        match self {
            FetchRequest::Popular { page }
            | FetchRequest::TopRated { page }
            | FetchRequest::NowPlaying { page }
            | FetchRequest::Upcoming { page } => KeyParams::new().with("page", *page),
            FetchRequest::Trending { window, page } => KeyParams::new()
                .with("time_window", window.as_str())
                .with("page", *page),
            FetchRequest::Details { movie_id } => KeyParams::new().with("movie_id", *movie_id),
            // Search results are case-insensitive upstream
            FetchRequest::Search { query, page } => KeyParams::new()
                .with("query", query.trim().to_lowercase())
                .with("page", *page),
            FetchRequest::Genres => KeyParams::new(),
            FetchRequest::Discover { filters } => filters.iter().collect(),
            FetchRequest::Recommendations { movie_id, page }
            | FetchRequest::Similar { movie_id, page } => KeyParams::new()
                .with("movie_id", *movie_id)
                .with("page", *page),
        }
    }

    /// Genres and details use literal keys; everything else is hashed.
    pub fn cache_key(&self) -> CacheKey {
        match self {
            FetchRequest::Genres => genres_key(),
            FetchRequest::Details { movie_id } => movie_details_key(*movie_id),
            other => build_key(other.category(), &other.key_params()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trending_endpoint_and_query() {
        let request = FetchRequest::Trending { window: TimeWindow::Day, page: 2 };

        assert_eq!(request.endpoint(), "trending/movie/day");
        assert_eq!(request.query(), vec![("page".to_string(), "2".to_string())]);
        assert_eq!(request.category(), Category::TrendingMovies);
    }

    #[test]
    fn test_trending_window_is_part_of_key() {
        let day = FetchRequest::Trending { window: TimeWindow::Day, page: 1 }.cache_key();
        let week = FetchRequest::Trending { window: TimeWindow::Week, page: 1 }.cache_key();
        assert_ne!(day, week);
    }

    #[test]
    fn test_search_key_is_case_insensitive() {
        let upper = FetchRequest::Search { query: "Batman", page: 1 }.cache_key();
        let lower = FetchRequest::Search { query: "batman ", page: 1 }.cache_key();

        assert_eq!(upper, lower);
        assert!(upper.as_str().starts_with("search:"));
    }

    #[test]
    fn test_search_query_keeps_original_text() {
        let query = FetchRequest::Search { query: "Batman", page: 1 }.query();
        assert!(query.contains(&("query".to_string(), "Batman".to_string())));
        assert!(query.contains(&("include_adult".to_string(), "false".to_string())));
    }

    #[test]
    fn test_literal_keys() {
        assert_eq!(FetchRequest::Genres.cache_key().as_str(), "genres:all");
        assert_eq!(
            FetchRequest::Details { movie_id: 42 }.cache_key().as_str(),
            "movie_details:42"
        );
    }

    #[test]
    fn test_discover_key_ignores_filter_order() {
        let a = DiscoverFilters::new().with("with_genres", "18").with("sort_by", "popularity.desc");
        let b = DiscoverFilters::new().with("sort_by", "popularity.desc").with("with_genres", "18");

        assert_eq!(
            FetchRequest::Discover { filters: &a }.cache_key(),
            FetchRequest::Discover { filters: &b }.cache_key()
        );
        assert_eq!(FetchRequest::Discover { filters: &a }.endpoint(), "discover/movie");
    }

    #[test]
    fn test_recommendations_endpoint() {
        let request = FetchRequest::Recommendations { movie_id: 603, page: 1 };
        assert_eq!(request.endpoint(), "movie/603/recommendations");
        assert!(request.cache_key().as_str().starts_with("recommendations:"));
    }
}
