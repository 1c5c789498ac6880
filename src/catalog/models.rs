//! Catalog records.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::tmdb::TmdbClient;

/// Poster size used for catalog listings.
pub const POSTER_SIZE: &str = "w500";

/// Backdrop size used for catalog detail pages.
pub const BACKDROP_SIZE: &str = "w1280";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    /// Catalog id
    pub id: i64,
    pub tmdb_id: i64,
    pub name: String,
}

// == Movie Status ==
/// Production status of a movie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovieStatus {
    Rumored,
    Planned,
    InProduction,
    PostProduction,
    #[default]
    Released,
    Canceled,
}

impl MovieStatus {
    /// Maps a TMDb status label such as `"Post Production"`. Unknown labels
    /// count as released.
    pub fn from_tmdb(label: &str) -> Self {
        match label {
            "Rumored" => MovieStatus::Rumored,
            "Planned" => MovieStatus::Planned,
            "In Production" => MovieStatus::InProduction,
            "Post Production" => MovieStatus::PostProduction,
            "Canceled" => MovieStatus::Canceled,
            _ => MovieStatus::Released,
        }
    }
}

impl fmt::Display for MovieStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MovieStatus::Rumored => "rumored",
            MovieStatus::Planned => "planned",
            MovieStatus::InProduction => "in_production",
            MovieStatus::PostProduction => "post_production",
            MovieStatus::Released => "released",
            MovieStatus::Canceled => "canceled",
        };
        f.write_str(label)
    }
}

// == Movie ==
/// A movie mirrored from TMDb.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    /// Catalog id, referenced by favorites
    pub id: i64,
    pub tmdb_id: i64,
    pub imdb_id: Option<String>,
    pub title: String,
    pub original_title: String,
    pub overview: String,
    pub tagline: String,
    pub release_date: Option<NaiveDate>,
    pub poster_path: String,
    pub backdrop_path: String,
    pub vote_average: f64,
    pub vote_count: i64,
    pub popularity: f64,
    /// Minutes; `None` until details have been fetched
    pub runtime: Option<i32>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    pub status: MovieStatus,
    pub original_language: String,
    pub genres: Vec<Genre>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Movie {
    pub fn poster_url(&self) -> Option<String> {
        TmdbClient::poster_url(&self.poster_path, POSTER_SIZE)
    }

    pub fn backdrop_url(&self) -> Option<String> {
        TmdbClient::backdrop_url(&self.backdrop_path, BACKDROP_SIZE)
    }

    pub fn year(&self) -> Option<i32> {
        self.release_date.map(|date| date.year())
    }

    /// Case-insensitive match on title, original title or overview.
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [&self.title, &self.original_title, &self.overview]
            .iter()
            .any(|text| text.to_lowercase().contains(&needle))
    }

    /// Case-insensitive substring match on any genre name.
    pub fn has_genre_like(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.genres
            .iter()
            .any(|genre| genre.name.to_lowercase().contains(&name))
    }
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year() {
            Some(year) => write!(f, "{} ({})", self.title, year),
            None => write!(f, "{} (Unknown)", self.title),
        }
    }
}

/// Parses a TMDb `YYYY-MM-DD` date; blank or malformed dates are `None`.
pub fn parse_release_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok())
}

/// A movie a user marked as favorite. Unique per user and movie.
#[derive(Debug, Clone, PartialEq)]
pub struct UserFavorite {
    pub id: i64,
    pub user_id: i64,
    /// Catalog movie id
    pub movie_id: i64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie() -> Movie {
        let now = Utc::now();
        Movie {
            id: 1,
            tmdb_id: 603,
            imdb_id: None,
            title: "The Matrix".to_string(),
            original_title: "The Matrix".to_string(),
            overview: "A hacker learns the truth about reality.".to_string(),
            tagline: String::new(),
            release_date: parse_release_date(Some("1999-03-30")),
            poster_path: "/matrix.jpg".to_string(),
            backdrop_path: String::new(),
            vote_average: 8.2,
            vote_count: 20_000,
            popularity: 80.0,
            runtime: None,
            budget: None,
            revenue: None,
            status: MovieStatus::Released,
            original_language: "en".to_string(),
            genres: vec![Genre { id: 1, tmdb_id: 878, name: "Science Fiction".to_string() }],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(MovieStatus::from_tmdb("Post Production"), MovieStatus::PostProduction);
        assert_eq!(MovieStatus::from_tmdb("Canceled"), MovieStatus::Canceled);
        assert_eq!(MovieStatus::from_tmdb("Something New"), MovieStatus::Released);
        assert_eq!(MovieStatus::InProduction.to_string(), "in_production");
    }

    #[test]
    fn test_derived_fields() {
        let movie = movie();

        assert_eq!(movie.year(), Some(1999));
        assert_eq!(
            movie.poster_url().as_deref(),
            Some("https://image.tmdb.org/t/p/w500/matrix.jpg")
        );
        assert_eq!(movie.backdrop_url(), None);
        assert_eq!(movie.to_string(), "The Matrix (1999)");
    }

    #[test]
    fn test_text_and_genre_matching() {
        let movie = movie();

        assert!(movie.mentions("HACKER"));
        assert!(!movie.mentions("wizard"));
        assert!(movie.has_genre_like("science"));
        assert!(!movie.has_genre_like("drama"));
    }

    #[test]
    fn test_release_date_parsing() {
        assert_eq!(parse_release_date(Some("")), None);
        assert_eq!(parse_release_date(Some("2024-13-01")), None);
        assert_eq!(parse_release_date(None), None);
        assert_eq!(
            parse_release_date(Some("2024-02-29")),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
    }
}
