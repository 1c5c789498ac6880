//! Request and Response models for the movie catalog API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{
    AddFavoriteRequest, ClearCacheRequest, ListQuery, PageQuery, SearchParams, TrendingQuery,
    UpstreamSearchQuery,
};
pub use responses::{
    CacheStatsResponse, ErrorResponse, FavoriteResponse, GenreResponse, HealthResponse,
    MessageResponse, MovieDetail, MovieListItem, Paginated, SearchResponse,
};
