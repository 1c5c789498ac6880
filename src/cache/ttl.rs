//! TTL policy.
//!
//! Every cached resource belongs to a `Category`; the category decides both
//! the key prefix and how long its entries live.

use std::collections::HashMap;
use std::time::Duration;

use tracing::warn;

// == Category ==
/// Logical resource category of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    TrendingMovies,
    PopularMovies,
    TopRatedMovies,
    MovieDetails,
    Genres,
    SearchResults,
    NowPlaying,
    Upcoming,
    Discover,
    Recommendations,
    Similar,
    UserFavorites,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::TrendingMovies,
        Category::PopularMovies,
        Category::TopRatedMovies,
        Category::MovieDetails,
        Category::Genres,
        Category::SearchResults,
        Category::NowPlaying,
        Category::Upcoming,
        Category::Discover,
        Category::Recommendations,
        Category::Similar,
        Category::UserFavorites,
    ];

    /// Key prefix used in the store namespace.
    pub fn prefix(self) -> &'static str {
        match self {
            Category::TrendingMovies => "trending_movies",
            Category::PopularMovies => "popular_movies",
            Category::TopRatedMovies => "top_rated_movies",
            Category::MovieDetails => "movie_details",
            Category::Genres => "genres",
            Category::SearchResults => "search",
            Category::NowPlaying => "now_playing",
            Category::Upcoming => "upcoming",
            Category::Discover => "discover",
            Category::Recommendations => "recommendations",
            Category::Similar => "similar",
            Category::UserFavorites => "user_favorites",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.prefix() == prefix)
    }

    /// Built-in lifetime used when no override is configured.
    pub fn default_ttl(self) -> Duration {
        let seconds = match self {
            Category::TrendingMovies => 900,
            Category::PopularMovies => 1800,
            Category::TopRatedMovies => 3600,
            Category::MovieDetails => 7200,
            Category::Genres => 86_400,
            Category::SearchResults => 600,
            Category::NowPlaying => 600,
            Category::Upcoming => 1800,
            Category::Discover => 3600,
            Category::Recommendations => 3600,
            Category::Similar => 3600,
            Category::UserFavorites => 300,
        };
        Duration::from_secs(seconds)
    }

    /// Environment variable holding an override, e.g. `CACHE_TTL_GENRES`.
    pub fn env_var(self) -> String {
        format!("CACHE_TTL_{}", self.prefix().to_ascii_uppercase())
    }
}

// == TTL Policy ==
/// Category to TTL table: configured overrides over built-in defaults.
///
/// Read-only once the server is running.
#[derive(Debug, Clone, Default)]
pub struct TtlPolicy {
    overrides: HashMap<Category, Duration>,
}

impl TtlPolicy {
    /// A policy with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_override(mut self, category: Category, ttl: Duration) -> Self {
        self.overrides.insert(category, ttl);
        self
    }

    /// Reads `CACHE_TTL_<PREFIX>` overrides (whole seconds) through `lookup`.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut policy = Self::new();
        for category in Category::ALL {
            let var = category.env_var();
            let Some(raw) = lookup(&var) else {
                continue;
            };
            match raw.trim().parse::<u64>() {
                Ok(seconds) => {
                    policy.overrides.insert(category, Duration::from_secs(seconds));
                }
                Err(_) => warn!(variable = %var, value = %raw, "ignoring invalid TTL override"),
            }
        }
        policy
    }

    pub fn ttl_for(&self, category: Category) -> Duration {
        self.overrides
            .get(&category)
            .copied()
            .unwrap_or_else(|| category.default_ttl())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttls() {
        let policy = TtlPolicy::new();
        let expected = [
            (Category::TrendingMovies, 900),
            (Category::PopularMovies, 1800),
            (Category::TopRatedMovies, 3600),
            (Category::MovieDetails, 7200),
            (Category::Genres, 86_400),
            (Category::SearchResults, 600),
            (Category::NowPlaying, 600),
            (Category::Upcoming, 1800),
            (Category::Discover, 3600),
        ];

        for (category, seconds) in expected {
            assert_eq!(policy.ttl_for(category), Duration::from_secs(seconds), "{category:?}");
        }
    }

    #[test]
    fn test_override_wins_over_default() {
        let policy = TtlPolicy::new().with_override(Category::Genres, Duration::from_secs(60));

        assert_eq!(policy.ttl_for(Category::Genres), Duration::from_secs(60));
        assert_eq!(policy.ttl_for(Category::PopularMovies), Duration::from_secs(1800));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("CACHE_TTL_SEARCH", "30"),
            ("CACHE_TTL_GENRES", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let policy = TtlPolicy::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(policy.ttl_for(Category::SearchResults), Duration::from_secs(30));
        assert_eq!(policy.ttl_for(Category::Genres), Duration::from_secs(86_400));
    }

    #[test]
    fn test_prefix_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_prefix(category.prefix()), Some(category));
        }
        assert_eq!(Category::from_prefix("unknown"), None);
    }

    #[test]
    fn test_env_var_name() {
        assert_eq!(Category::TopRatedMovies.env_var(), "CACHE_TTL_TOP_RATED_MOVIES");
    }
}
