//! Response DTOs for the movie catalog API
//!
//! Defines the structure of outgoing HTTP response bodies. List items and
//! favorites also round-trip through the cache, so they deserialize too.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::catalog::{Genre, Movie, MovieStatus, UserFavorite};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreResponse {
    pub id: i64,
    pub tmdb_id: i64,
    pub name: String,
}

impl From<&Genre> for GenreResponse {
    fn from(genre: &Genre) -> Self {
        Self {
            id: genre.id,
            tmdb_id: genre.tmdb_id,
            name: genre.name.clone(),
        }
    }
}

fn genre_list(movie: &Movie) -> Vec<GenreResponse> {
    movie.genres.iter().map(GenreResponse::from).collect()
}

/// Compact movie representation used in lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieListItem {
    pub id: i64,
    pub tmdb_id: i64,
    pub title: String,
    pub overview: String,
    pub release_date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub poster_path: String,
    pub poster_url: Option<String>,
    pub vote_average: f64,
    pub vote_count: i64,
    pub popularity: f64,
    pub genres: Vec<GenreResponse>,
}

impl From<&Movie> for MovieListItem {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            tmdb_id: movie.tmdb_id,
            title: movie.title.clone(),
            overview: movie.overview.clone(),
            release_date: movie.release_date,
            year: movie.year(),
            poster_path: movie.poster_path.clone(),
            poster_url: movie.poster_url(),
            vote_average: movie.vote_average,
            vote_count: movie.vote_count,
            popularity: movie.popularity,
            genres: genre_list(movie),
        }
    }
}

/// Full movie representation.
#[derive(Debug, Clone, Serialize)]
pub struct MovieDetail {
    pub id: i64,
    pub tmdb_id: i64,
    pub imdb_id: Option<String>,
    pub title: String,
    pub original_title: String,
    pub overview: String,
    pub tagline: String,
    pub release_date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub poster_path: String,
    pub poster_url: Option<String>,
    pub backdrop_path: String,
    pub backdrop_url: Option<String>,
    pub vote_average: f64,
    pub vote_count: i64,
    pub popularity: f64,
    pub runtime: Option<i32>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    pub status: MovieStatus,
    pub original_language: String,
    pub genres: Vec<GenreResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Movie> for MovieDetail {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            tmdb_id: movie.tmdb_id,
            imdb_id: movie.imdb_id.clone(),
            title: movie.title.clone(),
            original_title: movie.original_title.clone(),
            overview: movie.overview.clone(),
            tagline: movie.tagline.clone(),
            release_date: movie.release_date,
            year: movie.year(),
            poster_path: movie.poster_path.clone(),
            poster_url: movie.poster_url(),
            backdrop_path: movie.backdrop_path.clone(),
            backdrop_url: movie.backdrop_url(),
            vote_average: movie.vote_average,
            vote_count: movie.vote_count,
            popularity: movie.popularity,
            runtime: movie.runtime,
            budget: movie.budget,
            revenue: movie.revenue,
            status: movie.status,
            original_language: movie.original_language.clone(),
            genres: genre_list(movie),
            created_at: movie.created_at,
            updated_at: movie.updated_at,
        }
    }
}

/// One page of a catalog listing.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    /// Total matching items across all pages
    pub count: usize,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Slices page `page` (1-based) of `page_size` out of `items`.
    pub fn from_items<S>(items: Vec<S>, page: u32, page_size: u32) -> Self
    where
        T: From<S>,
    {
        let count = items.len();
        let size = page_size.max(1) as usize;
        let total_pages = count.div_ceil(size) as u32;
        let start = (page.saturating_sub(1) as usize).saturating_mul(size);

        let results = items
            .into_iter()
            .skip(start)
            .take(size)
            .map(T::from)
            .collect();

        Self {
            count,
            page,
            page_size,
            total_pages,
            results,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub count: usize,
    pub results: Vec<MovieListItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteResponse {
    pub id: i64,
    pub movie: MovieListItem,
    pub created_at: DateTime<Utc>,
}

impl FavoriteResponse {
    pub fn new(favorite: &UserFavorite, movie: &Movie) -> Self {
        Self {
            id: favorite.id,
            movie: MovieListItem::from(movie),
            created_at: favorite.created_at,
        }
    }
}

/// Counters of the cache layer.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsBody {
    pub hits: u64,
    pub misses: u64,
    pub errors: u64,
    pub writes: u64,
    pub invalidations: u64,
    /// Live entries, `None` when the store could not answer
    pub entries: Option<usize>,
    pub hit_rate_percentage: f64,
}

/// Response body for `GET /api/movies/cache/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub cache_enabled: bool,
    pub backend: String,
    pub stats: CacheStatsBody,
}

impl CacheStatsResponse {
    pub fn new(backend: &str, stats: &CacheStats, entries: Option<usize>) -> Self {
        let hit_rate_percentage = (stats.hit_rate() * 10_000.0).round() / 100.0;
        Self {
            cache_enabled: true,
            backend: backend.to_string(),
            stats: CacheStatsBody {
                hits: stats.hits,
                misses: stats.misses,
                errors: stats.errors,
                writes: stats.writes,
                invalidations: stats.invalidations,
                entries,
                hit_rate_percentage,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginated_slices_pages() {
        let items: Vec<i64> = (1..=45).collect();

        let page: Paginated<i64> = Paginated::from_items(items.clone(), 3, 20);
        assert_eq!(page.count, 45);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.results, (41..=45).collect::<Vec<_>>());

        let beyond: Paginated<i64> = Paginated::from_items(items, 9, 20);
        assert!(beyond.results.is_empty());
    }

    #[test]
    fn test_paginated_empty() {
        let page: Paginated<i64> = Paginated::from_items(Vec::<i64>::new(), 1, 20);
        assert_eq!(page.total_pages, 0);
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_cache_stats_hit_rate_percentage() {
        let stats = CacheStats { hits: 2, misses: 1, ..CacheStats::default() };
        let resp = CacheStatsResponse::new("memory", &stats, Some(4));

        assert_eq!(resp.stats.hit_rate_percentage, 66.67);
        assert_eq!(resp.stats.entries, Some(4));
        assert!(resp.cache_enabled);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
