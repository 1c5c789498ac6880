//! Upstream passthrough handlers.
//!
//! Thin wrappers over the cached fetcher under `/api/tmdb`. Upstream
//! failures surface as 502.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::api::AppState;
use crate::error::{ApiError, Result};
use crate::models::{PageQuery, TrendingQuery, UpstreamSearchQuery};
use crate::tmdb::{DiscoverFilters, GenreList, MovieDetails, MoviePage};

/// Handler for GET /api/tmdb/popular
pub async fn popular(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<MoviePage>> {
    let page = query.page().map_err(ApiError::InvalidRequest)?;
    Ok(Json(state.fetcher.popular(page).await?))
}

/// Handler for GET /api/tmdb/trending
pub async fn trending(
    State(state): State<AppState>,
    Query(query): Query<TrendingQuery>,
) -> Result<Json<MoviePage>> {
    let window = query.window().map_err(ApiError::InvalidRequest)?;
    let page = query.page().map_err(ApiError::InvalidRequest)?;
    Ok(Json(state.fetcher.trending(window, page).await?))
}

/// Handler for GET /api/tmdb/top_rated
pub async fn top_rated(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<MoviePage>> {
    let page = query.page().map_err(ApiError::InvalidRequest)?;
    Ok(Json(state.fetcher.top_rated(page).await?))
}

/// Handler for GET /api/tmdb/now_playing
pub async fn now_playing(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<MoviePage>> {
    let page = query.page().map_err(ApiError::InvalidRequest)?;
    Ok(Json(state.fetcher.now_playing(page).await?))
}

/// Handler for GET /api/tmdb/upcoming
pub async fn upcoming(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<MoviePage>> {
    let page = query.page().map_err(ApiError::InvalidRequest)?;
    Ok(Json(state.fetcher.upcoming(page).await?))
}

/// Handler for GET /api/tmdb/search
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<UpstreamSearchQuery>,
) -> Result<Json<MoviePage>> {
    let text = query.query().map_err(ApiError::InvalidRequest)?;
    let page = query.page().map_err(ApiError::InvalidRequest)?;
    Ok(Json(state.fetcher.search(&text, page).await?))
}

/// Handler for GET /api/tmdb/genres
pub async fn genres(State(state): State<AppState>) -> Result<Json<GenreList>> {
    Ok(Json(state.fetcher.genres().await?))
}

/// Handler for GET /api/tmdb/discover
///
/// Every query parameter is forwarded as a discover filter.
pub async fn discover(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<MoviePage>> {
    let filters: DiscoverFilters = params.into_iter().collect();
    Ok(Json(state.fetcher.discover(&filters).await?))
}

/// Handler for GET /api/tmdb/movie/:movie_id
pub async fn details(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
) -> Result<Json<MovieDetails>> {
    Ok(Json(state.fetcher.details(movie_id).await?))
}

/// Handler for GET /api/tmdb/movie/:movie_id/recommendations
pub async fn recommendations(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<MoviePage>> {
    let page = query.page().map_err(ApiError::InvalidRequest)?;
    Ok(Json(state.fetcher.recommendations(movie_id, page).await?))
}

/// Handler for GET /api/tmdb/movie/:movie_id/similar
pub async fn similar(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<MoviePage>> {
    let page = query.page().map_err(ApiError::InvalidRequest)?;
    Ok(Json(state.fetcher.similar(movie_id, page).await?))
}
