//! Raw TMDb HTTP client.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::config::TmdbConfig;
use crate::error::UpstreamError;
use crate::tmdb::{
    DiscoverFilters, FetchRequest, FetchResult, GenreList, MovieDetails, MovieFetcher, MoviePage,
    TimeWindow,
};

/// Base URL for poster and backdrop images.
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/";

// == TMDb Client ==
/// Uncached fetcher talking to the TMDb v3 API.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Builds a client with the configured request timeout.
    ///
    /// A missing API key is not an error here: every fetch then answers
    /// `UpstreamError::MissingApiKey`.
    pub fn new(config: &TmdbConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch<T: DeserializeOwned>(&self, request: FetchRequest<'_>) -> FetchResult<T> {
        if self.api_key.is_empty() {
            return Err(UpstreamError::MissingApiKey);
        }

        let endpoint = request.endpoint();
        let url = format!("{}/{}", self.base_url, endpoint);
        let mut query = request.query();
        query.push(("api_key".to_string(), self.api_key.clone()));

        debug!(%endpoint, "TMDb request");
        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|err| {
                error!(%endpoint, error = %err, "TMDb API request failed");
                UpstreamError::Transport(err.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(%endpoint, status = status.as_u16(), "TMDb API returned an error status");
            return Err(UpstreamError::Status(status.as_u16()));
        }

        response.json::<T>().await.map_err(|err| {
            error!(%endpoint, error = %err, "TMDb API response could not be decoded");
            UpstreamError::Decode(err.to_string())
        })
    }

    // == Image URLs ==
    /// Full poster URL, `None` for an empty path. TMDb size names such as
    /// `w500` or `original` are passed through.
    pub fn poster_url(path: &str, size: &str) -> Option<String> {
        image_url(path, size)
    }

    pub fn backdrop_url(path: &str, size: &str) -> Option<String> {
        image_url(path, size)
    }
}

fn image_url(path: &str, size: &str) -> Option<String> {
    if path.is_empty() {
        None
    } else {
        Some(format!("{}{}{}", IMAGE_BASE_URL, size, path))
    }
}

#[async_trait]
impl MovieFetcher for TmdbClient {
    async fn popular(&self, page: u32) -> FetchResult<MoviePage> {
        self.fetch(FetchRequest::Popular { page }).await
    }

    async fn trending(&self, window: TimeWindow, page: u32) -> FetchResult<MoviePage> {
        self.fetch(FetchRequest::Trending { window, page }).await
    }

    async fn top_rated(&self, page: u32) -> FetchResult<MoviePage> {
        self.fetch(FetchRequest::TopRated { page }).await
    }

    async fn details(&self, movie_id: i64) -> FetchResult<MovieDetails> {
        self.fetch(FetchRequest::Details { movie_id }).await
    }

    async fn search(&self, query: &str, page: u32) -> FetchResult<MoviePage> {
        self.fetch(FetchRequest::Search { query, page }).await
    }

    async fn genres(&self) -> FetchResult<GenreList> {
        self.fetch(FetchRequest::Genres).await
    }

    async fn now_playing(&self, page: u32) -> FetchResult<MoviePage> {
        self.fetch(FetchRequest::NowPlaying { page }).await
    }

    async fn upcoming(&self, page: u32) -> FetchResult<MoviePage> {
        self.fetch(FetchRequest::Upcoming { page }).await
    }

    async fn discover(&self, filters: &DiscoverFilters) -> FetchResult<MoviePage> {
        self.fetch(FetchRequest::Discover { filters }).await
    }

    async fn recommendations(&self, movie_id: i64, page: u32) -> FetchResult<MoviePage> {
        self.fetch(FetchRequest::Recommendations { movie_id, page }).await
    }

    async fn similar(&self, movie_id: i64, page: u32) -> FetchResult<MoviePage> {
        self.fetch(FetchRequest::Similar { movie_id, page }).await
    }
}

impl Default for TmdbClient {
    fn default() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: crate::config::DEFAULT_TMDB_BASE_URL.to_string(),
            api_key: String::new(),
        }
    }
}
