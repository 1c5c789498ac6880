//! TMDb Module
//!
//! The upstream movie database: the fetch contract, the raw HTTP client
//! and the cache-aside decorator over any fetcher.

mod cached;
mod client;
mod request;
mod types;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;

use crate::error::UpstreamError;

pub use cached::CachedFetcher;
pub use client::{TmdbClient, IMAGE_BASE_URL};
pub use request::FetchRequest;
pub use types::{
    DiscoverFilters, GenreEntry, GenreList, MovieDetails, MoviePage, MovieSummary, TimeWindow,
};

/// Outcome of an upstream fetch: a payload or an explicit failure.
pub type FetchResult<T> = Result<T, UpstreamError>;

// == Movie Fetcher ==
/// Operations offered by the movie database.
///
/// "No results" is an `Ok` page with empty `results`, never an error.
#[async_trait]
pub trait MovieFetcher: Send + Sync {
    async fn popular(&self, page: u32) -> FetchResult<MoviePage>;

    async fn trending(&self, window: TimeWindow, page: u32) -> FetchResult<MoviePage>;

    async fn top_rated(&self, page: u32) -> FetchResult<MoviePage>;

    async fn details(&self, movie_id: i64) -> FetchResult<MovieDetails>;

    async fn search(&self, query: &str, page: u32) -> FetchResult<MoviePage>;

    async fn genres(&self) -> FetchResult<GenreList>;

    async fn now_playing(&self, page: u32) -> FetchResult<MoviePage>;

    async fn upcoming(&self, page: u32) -> FetchResult<MoviePage>;

    async fn discover(&self, filters: &DiscoverFilters) -> FetchResult<MoviePage>;

    async fn recommendations(&self, movie_id: i64, page: u32) -> FetchResult<MoviePage>;

    async fn similar(&self, movie_id: i64, page: u32) -> FetchResult<MoviePage>;
}
