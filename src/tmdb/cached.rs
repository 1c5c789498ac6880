//! Cached fetcher.
//!
//! Wraps any `MovieFetcher` and serves every operation through the cache:
//! key from the operation descriptor, TTL from the policy table, upstream
//! call only on a miss. Failures pass through and are never stored.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::cache::{CacheService, TtlPolicy};
use crate::tmdb::{
    DiscoverFilters, FetchRequest, FetchResult, GenreList, MovieDetails, MovieFetcher, MoviePage,
    TimeWindow,
};

#[derive(Clone)]
pub struct CachedFetcher {
    inner: Arc<dyn MovieFetcher>,
    cache: CacheService,
    ttl: TtlPolicy,
}

impl CachedFetcher {
    pub fn new(inner: Arc<dyn MovieFetcher>, cache: CacheService, ttl: TtlPolicy) -> Self {
        Self { inner, cache, ttl }
    }

    /// The wrapped, uncached fetcher.
    pub fn inner(&self) -> &Arc<dyn MovieFetcher> {
        &self.inner
    }

    pub fn cache(&self) -> &CacheService {
        &self.cache
    }

    /// Serves `request` from the cache, awaiting `upstream` only on a miss.
    ///
    /// `upstream` is an unpolled future, so a hit never touches the network.
    async fn cached<T, Fut>(&self, request: FetchRequest<'_>, upstream: Fut) -> FetchResult<T>
    where
        T: Serialize + DeserializeOwned + Send,
        Fut: Future<Output = FetchResult<T>> + Send,
    {
        let key = request.cache_key();
        let ttl = self.ttl.ttl_for(request.category());
        self.cache.get_or_compute(&key, ttl, || upstream).await
    }
}

#[async_trait]
impl MovieFetcher for CachedFetcher {
    async fn popular(&self, page: u32) -> FetchResult<MoviePage> {
        self.cached(FetchRequest::Popular { page }, self.inner.popular(page))
            .await
    }

    async fn trending(&self, window: TimeWindow, page: u32) -> FetchResult<MoviePage> {
        self.cached(
            FetchRequest::Trending { window, page },
            self.inner.trending(window, page),
        )
        .await
    }

    async fn top_rated(&self, page: u32) -> FetchResult<MoviePage> {
        self.cached(FetchRequest::TopRated { page }, self.inner.top_rated(page))
            .await
    }

    async fn details(&self, movie_id: i64) -> FetchResult<MovieDetails> {
        self.cached(FetchRequest::Details { movie_id }, self.inner.details(movie_id))
            .await
    }

    async fn search(&self, query: &str, page: u32) -> FetchResult<MoviePage> {
        self.cached(
            FetchRequest::Search { query, page },
            self.inner.search(query, page),
        )
        .await
    }

    async fn genres(&self) -> FetchResult<GenreList> {
        self.cached(FetchRequest::Genres, self.inner.genres()).await
    }

    async fn now_playing(&self, page: u32) -> FetchResult<MoviePage> {
        self.cached(FetchRequest::NowPlaying { page }, self.inner.now_playing(page))
            .await
    }

    async fn upcoming(&self, page: u32) -> FetchResult<MoviePage> {
        self.cached(FetchRequest::Upcoming { page }, self.inner.upcoming(page))
            .await
    }

    async fn discover(&self, filters: &DiscoverFilters) -> FetchResult<MoviePage> {
        self.cached(FetchRequest::Discover { filters }, self.inner.discover(filters))
            .await
    }

    async fn recommendations(&self, movie_id: i64, page: u32) -> FetchResult<MoviePage> {
        self.cached(
            FetchRequest::Recommendations { movie_id, page },
            self.inner.recommendations(movie_id, page),
        )
        .await
    }

    async fn similar(&self, movie_id: i64, page: u32) -> FetchResult<MoviePage> {
        self.cached(
            FetchRequest::Similar { movie_id, page },
            self.inner.similar(movie_id, page),
        )
        .await
    }
}
