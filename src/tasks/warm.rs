//! Cache warming.

use tracing::{error, info};

use crate::tmdb::{MovieFetcher, TimeWindow};

/// Pre-fetches the first trending (weekly) and popular pages through the
/// cached fetcher. Returns how many of the two lists are now warm.
pub async fn warm_popular_caches(fetcher: &dyn MovieFetcher) -> usize {
    let mut warmed = 0;

    match fetcher.trending(TimeWindow::Week, 1).await {
        Ok(_) => warmed += 1,
        Err(err) => error!(list = "trending", error = %err, "Cache warming error"),
    }

    match fetcher.popular(1).await {
        Ok(_) => warmed += 1,
        Err(err) => error!(list = "popular", error = %err, "Cache warming error"),
    }

    info!(warmed, "Cache warming completed");
    warmed
}
