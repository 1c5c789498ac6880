//! Scripted upstream double for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::UpstreamError;
use crate::tmdb::{
    DiscoverFilters, FetchResult, GenreEntry, GenreList, MovieDetails, MovieFetcher, MoviePage,
    MovieSummary, TimeWindow,
};

/// Answers every list page `p` with movies `p*10+1` and `p*10+2`, records
/// each call and can be told to fail the next N calls with a 503.
#[derive(Default)]
pub struct StubFetcher {
    calls: Mutex<Vec<&'static str>>,
    failures: AtomicUsize,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, calls: usize) {
        self.failures.store(calls, Ordering::SeqCst);
    }

    /// Number of calls made to operation `op`.
    pub fn count(&self, op: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| **call == op)
            .count()
    }

    fn record(&self, op: &'static str) -> FetchResult<()> {
        self.calls.lock().unwrap().push(op);
        let failed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            Err(UpstreamError::Status(503))
        } else {
            Ok(())
        }
    }

    fn page(&self, op: &'static str, page: u32) -> FetchResult<MoviePage> {
        self.record(op)?;
        let base = i64::from(page) * 10;
        Ok(MoviePage {
            page,
            results: vec![summary(base + 1), summary(base + 2)],
            total_pages: 5,
            total_results: 10,
        })
    }
}

pub fn summary(tmdb_id: i64) -> MovieSummary {
    MovieSummary {
        id: tmdb_id,
        title: format!("Movie {}", tmdb_id),
        original_title: format!("Movie {}", tmdb_id),
        overview: String::new(),
        release_date: Some("2020-05-01".to_string()),
        poster_path: Some(format!("/{}.jpg", tmdb_id)),
        backdrop_path: None,
        vote_average: 7.0,
        vote_count: 100,
        popularity: tmdb_id as f64,
        original_language: Some("en".to_string()),
        genre_ids: vec![18],
    }
}

#[async_trait]
impl MovieFetcher for StubFetcher {
    async fn popular(&self, page: u32) -> FetchResult<MoviePage> {
        self.page("popular", page)
    }

    async fn trending(&self, _window: TimeWindow, page: u32) -> FetchResult<MoviePage> {
        self.page("trending", page)
    }

    async fn top_rated(&self, page: u32) -> FetchResult<MoviePage> {
        self.page("top_rated", page)
    }

    async fn details(&self, movie_id: i64) -> FetchResult<MovieDetails> {
        self.record("details")?;
        Ok(MovieDetails {
            id: movie_id,
            imdb_id: Some(format!("tt{:07}", movie_id)),
            title: format!("Movie {}", movie_id),
            original_title: String::new(),
            overview: String::new(),
            tagline: Some("A tagline".to_string()),
            release_date: None,
            poster_path: None,
            backdrop_path: None,
            vote_average: 7.0,
            vote_count: 100,
            popularity: 1.0,
            runtime: Some(120),
            budget: Some(1_000_000),
            revenue: Some(0),
            status: Some("Released".to_string()),
            original_language: None,
            genres: vec![],
        })
    }

    async fn search(&self, _query: &str, page: u32) -> FetchResult<MoviePage> {
        self.page("search", page)
    }

    async fn genres(&self) -> FetchResult<GenreList> {
        self.record("genres")?;
        Ok(GenreList {
            genres: vec![
                GenreEntry { id: 18, name: "Drama".to_string() },
                GenreEntry { id: 28, name: "Action".to_string() },
            ],
        })
    }

    async fn now_playing(&self, page: u32) -> FetchResult<MoviePage> {
        self.page("now_playing", page)
    }

    async fn upcoming(&self, page: u32) -> FetchResult<MoviePage> {
        self.page("upcoming", page)
    }

    async fn discover(&self, _filters: &DiscoverFilters) -> FetchResult<MoviePage> {
        self.page("discover", 1)
    }

    async fn recommendations(&self, _movie_id: i64, page: u32) -> FetchResult<MoviePage> {
        self.page("recommendations", page)
    }

    async fn similar(&self, _movie_id: i64, page: u32) -> FetchResult<MoviePage> {
        self.page("similar", page)
    }
}
