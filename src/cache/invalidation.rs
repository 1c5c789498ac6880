//! Invalidation Router
//!
//! Maps a data change to the cache keys it makes stale and purges them.

use tracing::info;

use crate::cache::{movie_details_key, user_favorites_key, CacheService, Category};

/// Categories derived from the whole movie set; any movie change can alter
/// them.
pub const DERIVED_CATEGORIES: [Category; 5] = [
    Category::TrendingMovies,
    Category::PopularMovies,
    Category::TopRatedMovies,
    Category::SearchResults,
    Category::Recommendations,
];

// == Invalidation Scope ==
/// What changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationScope {
    /// Bulk change to movie data (e.g. after a sync run)
    AllMovieData,
    /// One movie changed, by TMDb id
    SpecificMovie(i64),
    /// A user's favorites changed
    UserFavorites(i64),
}

impl InvalidationScope {
    /// Glob patterns purged for this scope.
    pub fn patterns(&self) -> Vec<String> {
        let derived = || {
            DERIVED_CATEGORIES
                .iter()
                .map(|category| format!("{}:*", category.prefix()))
        };

        match self {
            InvalidationScope::AllMovieData => derived().collect(),
            InvalidationScope::SpecificMovie(movie_id) => derived()
                .chain(std::iter::once(movie_details_key(*movie_id).to_string()))
                .collect(),
            InvalidationScope::UserFavorites(user_id) => {
                vec![user_favorites_key(*user_id).to_string()]
            }
        }
    }
}

// == Invalidator ==
/// Best-effort purge of stale entries. Failures are logged by the cache
/// service and never reach the caller; the worst case is stale data until
/// natural expiry.
#[derive(Clone)]
pub struct Invalidator {
    cache: CacheService,
}

impl Invalidator {
    pub fn new(cache: CacheService) -> Self {
        Self { cache }
    }

    /// Purges everything `scope` makes stale, returning the number of keys
    /// removed.
    pub async fn invalidate(&self, scope: InvalidationScope) -> usize {
        let removed = match scope {
            InvalidationScope::UserFavorites(user_id) => {
                usize::from(self.cache.delete(&user_favorites_key(user_id)).await)
            }
            _ => {
                let mut removed = 0;
                for pattern in scope.patterns() {
                    removed += self.cache.purge(&pattern).await;
                }
                removed
            }
        };

        self.cache.metrics().record_invalidations(removed);
        info!(?scope, removed, "cache invalidated");
        removed
    }
}
