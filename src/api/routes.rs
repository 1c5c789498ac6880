//! API Routes
//!
//! Configures the Axum router with the catalog, upstream and admin
//! endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    add_favorite, cache_stats, clear_cache, health_handler, list_favorites, list_genres,
    list_movies, movie_detail, recommended_movies, remove_favorite, search_movies,
    trending_movies, AppState,
};
use super::upstream;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/movies` - Paginated catalog listing
/// - `GET /api/movies/:tmdb_id` - Catalog movie detail
/// - `GET /api/movies/trending` - Most popular released movies
/// - `GET /api/movies/recommended` - Well-rated recent releases
/// - `GET /api/movies/search` - Catalog search (`q`, `genre`, `year`)
/// - `GET /api/movies/genres` - All genres
/// - `GET|POST /api/movies/favorites` - Caller's favorites
/// - `DELETE /api/movies/favorites/:movie_id` - Remove a favorite
/// - `GET /api/movies/cache/stats` - Cache counters (admin)
/// - `POST /api/movies/cache/clear` - Clear cache (admin)
/// - `GET /api/tmdb/...` - Cached upstream passthrough
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let movies = Router::new()
        .route("/", get(list_movies))
        .route("/trending", get(trending_movies))
        .route("/recommended", get(recommended_movies))
        .route("/search", get(search_movies))
        .route("/genres", get(list_genres))
        .route("/favorites", get(list_favorites).post(add_favorite))
        .route("/favorites/:movie_id", delete(remove_favorite))
        .route("/cache/stats", get(cache_stats))
        .route("/cache/clear", post(clear_cache))
        .route("/:tmdb_id", get(movie_detail));

    let tmdb = Router::new()
        .route("/popular", get(upstream::popular))
        .route("/trending", get(upstream::trending))
        .route("/top_rated", get(upstream::top_rated))
        .route("/now_playing", get(upstream::now_playing))
        .route("/upcoming", get(upstream::upcoming))
        .route("/search", get(upstream::search))
        .route("/genres", get(upstream::genres))
        .route("/discover", get(upstream::discover))
        .route("/movie/:movie_id", get(upstream::details))
        .route("/movie/:movie_id/recommendations", get(upstream::recommendations))
        .route("/movie/:movie_id/similar", get(upstream::similar));

    Router::new()
        .nest("/api/movies", movies)
        .nest("/api/tmdb", tmdb)
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheService, MemoryStore, TtlPolicy, DEFAULT_STORE_TIMEOUT};
    use crate::catalog::Catalog;
    use crate::tmdb::TmdbClient;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let cache = CacheService::new(Arc::new(MemoryStore::new(100)), DEFAULT_STORE_TIMEOUT);
        let state = AppState::new(
            Arc::new(Catalog::new()),
            cache,
            Arc::new(TmdbClient::default()),
            TtlPolicy::new(),
        );
        create_router(state)
    }

    async fn status_of(request: Request<Body>) -> StatusCode {
        create_test_app().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        assert_eq!(status_of(request).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_static_segments_win_over_movie_id() {
        let request = Request::builder()
            .uri("/api/movies/genres")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(request).await, StatusCode::OK);

        let request = Request::builder()
            .uri("/api/movies/603")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(request).await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_favorites_require_identity() {
        let request = Request::builder()
            .uri("/api/movies/favorites")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(request).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_upstream_without_api_key_is_bad_gateway() {
        let request = Request::builder()
            .uri("/api/tmdb/popular")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(request).await, StatusCode::BAD_GATEWAY);
    }
}
