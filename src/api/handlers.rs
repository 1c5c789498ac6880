//! API Handlers
//!
//! HTTP request handlers for the catalog, favorites and cache admin
//! endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;

use crate::api::auth::{AdminUser, CurrentUser};
use crate::cache::{
    build_key, user_favorites_key, CacheKey, CacheService, Category, InvalidationScope, Invalidator,
    KeyParams, KeyValueStore, TtlPolicy,
};
use crate::catalog::{Catalog, Movie};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{
    AddFavoriteRequest, CacheStatsResponse, ClearCacheRequest, FavoriteResponse, GenreResponse,
    HealthResponse, ListQuery, MessageResponse, MovieDetail, MovieListItem, Paginated,
    SearchParams, SearchResponse,
};
use crate::tmdb::{CachedFetcher, MovieFetcher};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub cache: CacheService,
    /// Cache-aside fetcher in front of the upstream
    pub fetcher: Arc<dyn MovieFetcher>,
    pub invalidator: Invalidator,
    pub ttl: TtlPolicy,
}

impl AppState {
    /// Wires the cached fetcher and the invalidator around `cache`.
    pub fn new(
        catalog: Arc<Catalog>,
        cache: CacheService,
        upstream: Arc<dyn MovieFetcher>,
        ttl: TtlPolicy,
    ) -> Self {
        let fetcher = CachedFetcher::new(upstream, cache.clone(), ttl.clone());
        Self {
            catalog,
            invalidator: Invalidator::new(cache.clone()),
            cache,
            fetcher: Arc::new(fetcher),
            ttl,
        }
    }

    /// Builds the state from configuration over an existing store and raw
    /// upstream fetcher.
    pub fn with_store(
        store: Arc<dyn KeyValueStore>,
        upstream: Arc<dyn MovieFetcher>,
        config: &Config,
    ) -> Self {
        let cache = CacheService::new(store, config.store_timeout);
        Self::new(Arc::new(Catalog::new()), cache, upstream, config.ttl.clone())
    }
}

/// Key for a list computed from the local catalog.
fn catalog_list_key(category: Category) -> CacheKey {
    build_key(category, &KeyParams::new().with("source", "catalog"))
}

fn list_items(movies: &[Movie]) -> Vec<MovieListItem> {
    movies.iter().map(MovieListItem::from).collect()
}

// == Movies ==
/// Handler for GET /api/movies
///
/// Paginated catalog listing with optional genre, year and text filters.
pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<MovieListItem>>> {
    let filter = query.filter().map_err(ApiError::InvalidRequest)?;
    let (page, page_size) = query.pagination().map_err(ApiError::InvalidRequest)?;

    let movies = state.catalog.list(&filter).await;
    Ok(Json(Paginated::from_items(
        movies.iter().collect::<Vec<_>>(),
        page,
        page_size,
    )))
}

/// Handler for GET /api/movies/:tmdb_id
pub async fn movie_detail(
    State(state): State<AppState>,
    Path(tmdb_id): Path<i64>,
) -> Result<Json<MovieDetail>> {
    let movie = state
        .catalog
        .get(tmdb_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Movie {} not found", tmdb_id)))?;

    Ok(Json(MovieDetail::from(&movie)))
}

/// Handler for GET /api/movies/trending
///
/// Most popular released catalog movies, cached until the next movie change.
pub async fn trending_movies(State(state): State<AppState>) -> Result<Json<Vec<MovieListItem>>> {
    let category = Category::TrendingMovies;
    let catalog = state.catalog.clone();
    let movies = state
        .cache
        .get_or_compute(&catalog_list_key(category), state.ttl.ttl_for(category), || async move {
            Ok::<_, ApiError>(list_items(&catalog.trending().await))
        })
        .await?;

    Ok(Json(movies))
}

/// Handler for GET /api/movies/recommended
///
/// Well-rated recent releases, cached under the recommendations category.
pub async fn recommended_movies(
    State(state): State<AppState>,
) -> Result<Json<Vec<MovieListItem>>> {
    let category = Category::Recommendations;
    let catalog = state.catalog.clone();
    let today = Utc::now().date_naive();
    let movies = state
        .cache
        .get_or_compute(&catalog_list_key(category), state.ttl.ttl_for(category), || async move {
            Ok::<_, ApiError>(list_items(&catalog.recommended(today).await))
        })
        .await?;

    Ok(Json(movies))
}

/// Handler for GET /api/movies/search
pub async fn search_movies(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>> {
    let filter = params.filter().map_err(ApiError::InvalidRequest)?;
    let results = list_items(&state.catalog.search(&filter).await);

    Ok(Json(SearchResponse {
        count: results.len(),
        results,
    }))
}

/// Handler for GET /api/movies/genres
pub async fn list_genres(State(state): State<AppState>) -> Json<Vec<GenreResponse>> {
    let genres = state.catalog.genres().await;
    Json(genres.iter().map(GenreResponse::from).collect())
}

// == Favorites ==
/// Handler for GET /api/movies/favorites
pub async fn list_favorites(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<FavoriteResponse>>> {
    let catalog = state.catalog.clone();
    let favorites = state
        .cache
        .get_or_compute(
            &user_favorites_key(user_id),
            state.ttl.ttl_for(Category::UserFavorites),
            || async move {
                let favorites = catalog.favorites(user_id).await;
                Ok::<_, ApiError>(
                    favorites
                        .iter()
                        .map(|(favorite, movie)| FavoriteResponse::new(favorite, movie))
                        .collect::<Vec<_>>(),
                )
            },
        )
        .await?;

    Ok(Json(favorites))
}

/// Handler for POST /api/movies/favorites
pub async fn add_favorite(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<AddFavoriteRequest>,
) -> Result<(StatusCode, Json<FavoriteResponse>)> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let (favorite, movie) = state.catalog.add_favorite(user_id, req.movie_id).await?;
    state
        .invalidator
        .invalidate(InvalidationScope::UserFavorites(user_id))
        .await;

    Ok((
        StatusCode::CREATED,
        Json(FavoriteResponse::new(&favorite, &movie)),
    ))
}

/// Handler for DELETE /api/movies/favorites/:movie_id
pub async fn remove_favorite(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(movie_id): Path<i64>,
) -> Result<StatusCode> {
    state.catalog.remove_favorite(user_id, movie_id).await?;
    state
        .invalidator
        .invalidate(InvalidationScope::UserFavorites(user_id))
        .await;

    Ok(StatusCode::NO_CONTENT)
}

// == Cache Admin ==
/// Handler for GET /api/movies/cache/stats
pub async fn cache_stats(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Json<CacheStatsResponse> {
    let entries = state.cache.entry_count().await;
    Json(CacheStatsResponse::new(
        state.cache.backend_name(),
        &state.cache.stats(),
        entries,
    ))
}

/// Handler for POST /api/movies/cache/clear
///
/// Clears keys matching `pattern`, or the whole cache without one.
pub async fn clear_cache(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    body: Option<Json<ClearCacheRequest>>,
) -> Result<Json<MessageResponse>> {
    let pattern = body.and_then(|Json(req)| req.pattern());

    let message = match pattern {
        Some(pattern) => {
            let removed = state.cache.purge(&pattern).await;
            info!(admin_id, %pattern, removed, "cache pattern cleared");
            format!("Cleared cache pattern: {}", pattern)
        }
        None => {
            if !state.cache.clear().await {
                return Err(ApiError::Internal("Failed to clear cache".to_string()));
            }
            info!(admin_id, "cache cleared");
            "Cleared all cache".to_string()
        }
    };

    Ok(Json(MessageResponse::new(message)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
