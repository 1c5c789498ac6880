//! Catalog Sync Task
//!
//! Loads genres and movie lists from the upstream into the catalog, then
//! enriches movies with their details. Every write is followed by the
//! matching cache invalidation.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::cache::{InvalidationScope, Invalidator};
use crate::catalog::Catalog;
use crate::config::SyncConfig;
use crate::tmdb::{FetchResult, MovieFetcher, MoviePage, TimeWindow};

/// Pause between attempts of a failed fetch.
pub const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Pause between detail requests.
pub const DETAILS_DELAY: Duration = Duration::from_millis(250);

// == Sync Category ==
/// Upstream list a sync run can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncCategory {
    Popular,
    TopRated,
    Trending,
    NowPlaying,
    Upcoming,
}

impl SyncCategory {
    pub const ALL: [SyncCategory; 5] = [
        SyncCategory::Popular,
        SyncCategory::TopRated,
        SyncCategory::Trending,
        SyncCategory::NowPlaying,
        SyncCategory::Upcoming,
    ];

    /// Categories loaded when none are configured.
    pub const DEFAULT: [SyncCategory; 3] = [
        SyncCategory::Popular,
        SyncCategory::TopRated,
        SyncCategory::Trending,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SyncCategory::Popular => "popular",
            SyncCategory::TopRated => "top_rated",
            SyncCategory::Trending => "trending",
            SyncCategory::NowPlaying => "now_playing",
            SyncCategory::Upcoming => "upcoming",
        }
    }

    async fn fetch(self, fetcher: &dyn MovieFetcher, page: u32) -> FetchResult<MoviePage> {
        match self {
            SyncCategory::Popular => fetcher.popular(page).await,
            SyncCategory::TopRated => fetcher.top_rated(page).await,
            SyncCategory::Trending => fetcher.trending(TimeWindow::Week, page).await,
            SyncCategory::NowPlaying => fetcher.now_playing(page).await,
            SyncCategory::Upcoming => fetcher.upcoming(page).await,
        }
    }
}

impl fmt::Display for SyncCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SyncCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown sync category '{}'", s))
    }
}

/// Outcome of a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub genres_created: usize,
    pub movies_created: usize,
    pub movies_updated: usize,
    /// Pages (and the genre list) given up on after all retries
    pub failed_fetches: usize,
}

/// Runs `op` up to `retries + 1` times, pausing `RETRY_BACKOFF` between
/// attempts. Failures are logged; `None` once every attempt failed.
async fn with_retry<T, F, Fut>(what: &str, retries: u32, mut op: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetchResult<T>>,
{
    for attempt in 0..=retries {
        match op().await {
            Ok(value) => return Some(value),
            Err(err) if attempt < retries => {
                warn!(what, attempt = attempt + 1, error = %err, "fetch failed, retrying");
                tokio::time::sleep(RETRY_BACKOFF).await;
            }
            Err(err) => {
                error!(what, attempts = attempt + 1, error = %err, "fetch failed, giving up");
            }
        }
    }
    None
}

// == Populate ==
/// Loads genres, then `options.pages` pages of every configured category.
///
/// Failed pages are skipped. Derived cache views are invalidated once at the
/// end if anything was written.
pub async fn populate(
    fetcher: &dyn MovieFetcher,
    catalog: &Catalog,
    invalidator: &Invalidator,
    options: &SyncConfig,
) -> SyncReport {
    let mut report = SyncReport::default();
    info!(
        pages = options.pages,
        categories = ?options.categories,
        "Starting catalog sync"
    );

    match with_retry("genres", options.retries, || fetcher.genres()).await {
        Some(list) => {
            for entry in &list.genres {
                if catalog.upsert_genre(entry).await {
                    report.genres_created += 1;
                }
            }
        }
        None => report.failed_fetches += 1,
    }

    for category in &options.categories {
        let (created_before, updated_before) = (report.movies_created, report.movies_updated);

        for page in 1..=options.pages {
            let what = format!("{} page {}", category, page);
            let Some(movies) =
                with_retry(&what, options.retries, || category.fetch(fetcher, page)).await
            else {
                report.failed_fetches += 1;
                continue;
            };

            for summary in &movies.results {
                if catalog.upsert_movie(summary).await.created {
                    report.movies_created += 1;
                } else {
                    report.movies_updated += 1;
                }
            }
        }

        info!(
            %category,
            created = report.movies_created - created_before,
            updated = report.movies_updated - updated_before,
            "Category synced"
        );
    }

    if report.genres_created + report.movies_created + report.movies_updated > 0 {
        invalidator.invalidate(InvalidationScope::AllMovieData).await;
    }

    info!(?report, "Catalog sync finished");
    report
}

// == Fetch Missing Details ==
/// Fetches details for up to `limit` movies that have none yet, pausing
/// `DETAILS_DELAY` between requests. Returns how many movies were updated.
pub async fn fetch_missing_details(
    fetcher: &dyn MovieFetcher,
    catalog: &Catalog,
    invalidator: &Invalidator,
    limit: usize,
) -> usize {
    let pending = catalog.movies_missing_details(limit).await;
    info!(count = pending.len(), "Fetching missing movie details");

    let mut updated = 0;
    for (i, tmdb_id) in pending.into_iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(DETAILS_DELAY).await;
        }

        match fetcher.details(tmdb_id).await {
            Ok(details) => {
                if let Some(movie) = catalog.apply_details(&details).await {
                    invalidator
                        .invalidate(InvalidationScope::SpecificMovie(tmdb_id))
                        .await;
                    info!(movie = %movie, "Updated movie details");
                    updated += 1;
                }
            }
            Err(err) => warn!(tmdb_id, error = %err, "Could not fetch movie details"),
        }
    }
    updated
}
