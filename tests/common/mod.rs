//! Shared test doubles.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use movie_catalog::error::UpstreamError;
use movie_catalog::tmdb::{
    DiscoverFilters, FetchResult, GenreEntry, GenreList, MovieDetails, MovieFetcher, MoviePage,
    MovieSummary, TimeWindow,
};
use serde_json::json;

/// Upstream that counts calls per operation. Page `p` holds movie `900 + p`;
/// details for movie 404 fail with a 404 status.
#[derive(Default)]
pub struct CountingUpstream {
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl CountingUpstream {
    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    fn page(&self, op: &'static str, page: u32) -> FetchResult<MoviePage> {
        *self.calls.lock().unwrap().entry(op).or_default() += 1;
        Ok(MoviePage {
            page,
            results: vec![summary(900 + i64::from(page), "Upstream Pick", 50.0)],
            total_pages: 3,
            total_results: 3,
        })
    }
}

#[async_trait]
impl MovieFetcher for CountingUpstream {
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
        *self.calls.lock().unwrap().entry("details").or_default() += 1;
        if movie_id == 404 {
            return Err(UpstreamError::Status(404));
        }
        Ok(serde_json::from_value(json!({ "id": movie_id, "title": "Detailed", "runtime": 99 }))
            .unwrap())
    }

    async fn search(&self, _query: &str, page: u32) -> FetchResult<MoviePage> {
        self.page("search", page)
    }

    async fn genres(&self) -> FetchResult<GenreList> {
        *self.calls.lock().unwrap().entry("genres").or_default() += 1;
        Ok(GenreList {
            genres: vec![GenreEntry {
                id: 18,
                name: "Drama".to_string(),
            }],
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

pub fn summary(tmdb_id: i64, title: &str, popularity: f64) -> MovieSummary {
    serde_json::from_value(json!({
        "id": tmdb_id,
        "title": title,
        "overview": format!("About {}", title),
        "release_date": "2015-06-01",
        "poster_path": format!("/{}.jpg", tmdb_id),
        "vote_average": 7.5,
        "vote_count": 500,
        "popularity": popularity,
        "genre_ids": [18]
    }))
    .unwrap()
}
