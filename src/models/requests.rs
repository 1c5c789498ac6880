//! Request DTOs for the movie catalog API
//!
//! Query strings and JSON bodies accepted by the handlers.

use serde::Deserialize;

use crate::catalog::MovieFilter;
use crate::tmdb::TimeWindow;

/// Default catalog page size.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size a client may ask for.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Highest page TMDb serves.
pub const MAX_UPSTREAM_PAGE: u32 = 500;

fn blank_to_none(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn parse_year(raw: &Option<String>) -> Result<Option<i32>, String> {
    match blank_to_none(raw) {
        None => Ok(None),
        Some(year) => year
            .parse()
            .map(Some)
            .map_err(|_| format!("Invalid year '{}'", year)),
    }
}

/// Query for `GET /api/movies/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl ListQuery {
    pub fn filter(&self) -> Result<MovieFilter, String> {
        Ok(MovieFilter {
            genre: blank_to_none(&self.genre),
            year: parse_year(&self.year)?,
            text: blank_to_none(&self.search),
        })
    }

    /// 1-based page number and page size, validated.
    pub fn pagination(&self) -> Result<(u32, u32), String> {
        let page = self.page.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page == 0 {
            return Err("Page must be at least 1".to_string());
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(format!("Page size must be between 1 and {}", MAX_PAGE_SIZE));
        }
        Ok((page, page_size))
    }
}

/// Query for `GET /api/movies/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
}

impl SearchParams {
    /// At least one of `q`, `genre` or `year` is required.
    pub fn filter(&self) -> Result<MovieFilter, String> {
        let filter = MovieFilter {
            genre: blank_to_none(&self.genre),
            year: parse_year(&self.year)?,
            text: blank_to_none(&self.q),
        };

        if filter.is_empty() {
            return Err(
                "Please provide at least one search parameter (q, genre, or year)".to_string(),
            );
        }
        Ok(filter)
    }
}

/// `page` query for upstream list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<u32>,
}

impl PageQuery {
    pub fn page(&self) -> Result<u32, String> {
        validate_upstream_page(self.page)
    }
}

fn validate_upstream_page(page: Option<u32>) -> Result<u32, String> {
    match page.unwrap_or(1) {
        page @ 1..=MAX_UPSTREAM_PAGE => Ok(page),
        _ => Err(format!("Page must be between 1 and {}", MAX_UPSTREAM_PAGE)),
    }
}

/// Query for `GET /api/tmdb/trending`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrendingQuery {
    #[serde(default)]
    pub window: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
}

impl TrendingQuery {
    pub fn window(&self) -> Result<TimeWindow, String> {
        match blank_to_none(&self.window) {
            None => Ok(TimeWindow::default()),
            Some(raw) => raw.parse(),
        }
    }

    pub fn page(&self) -> Result<u32, String> {
        validate_upstream_page(self.page)
    }
}

/// Query for `GET /api/tmdb/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamSearchQuery {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
}

impl UpstreamSearchQuery {
    pub fn query(&self) -> Result<String, String> {
        blank_to_none(&self.query).ok_or_else(|| "Query parameter 'query' is required".to_string())
    }

    pub fn page(&self) -> Result<u32, String> {
        validate_upstream_page(self.page)
    }
}

/// Body for `POST /api/movies/favorites`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddFavoriteRequest {
    /// Catalog movie id
    pub movie_id: i64,
}

impl AddFavoriteRequest {
    pub fn validate(&self) -> Option<String> {
        if self.movie_id <= 0 {
            return Some("movie_id must be a positive integer".to_string());
        }
        None
    }
}

/// Body for `POST /api/movies/cache/clear`. No pattern clears everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClearCacheRequest {
    #[serde(default)]
    pub pattern: Option<String>,
}

impl ClearCacheRequest {
    pub fn pattern(&self) -> Option<String> {
        blank_to_none(&self.pattern)
    }
}
