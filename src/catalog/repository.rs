//! In-memory catalog repository.
//!
//! Holds genres, movies and favorites behind a single `RwLock`. Callers are
//! responsible for invalidating cached views after a write.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use tokio::sync::RwLock;

use crate::catalog::models::{parse_release_date, Genre, Movie, MovieStatus, UserFavorite};
use crate::error::CatalogError;
use crate::tmdb::{GenreEntry, MovieDetails, MovieSummary};

/// Size of the trending and recommended lists.
pub const FEATURED_LIMIT: usize = 20;

/// Maximum number of search results.
pub const SEARCH_LIMIT: usize = 50;

/// Window for "recent" releases in recommendations.
pub const RECOMMENDED_WINDOW_DAYS: i64 = 730;

pub const RECOMMENDED_MIN_RATING: f64 = 7.0;

pub const RECOMMENDED_MIN_VOTES: i64 = 100;

// == Movie Filter ==
/// Optional list filters, combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieFilter {
    /// Substring of a genre name
    pub genre: Option<String>,
    /// Release year
    pub year: Option<i32>,
    /// Substring of title, original title or overview
    pub text: Option<String>,
}

impl MovieFilter {
    pub fn is_empty(&self) -> bool {
        self.genre.is_none() && self.year.is_none() && self.text.is_none()
    }

    fn matches(&self, movie: &Movie) -> bool {
        self.genre.as_deref().map_or(true, |genre| movie.has_genre_like(genre))
            && self.year.map_or(true, |year| movie.year() == Some(year))
            && self.text.as_deref().map_or(true, |text| movie.mentions(text))
    }
}

/// Result of an upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct Upserted {
    pub movie: Movie,
    pub created: bool,
}

#[derive(Debug, Default)]
struct CatalogData {
    genres: HashMap<i64, Genre>,
    movies: HashMap<i64, Movie>,
    tmdb_index: HashMap<i64, i64>,
    favorites: Vec<UserFavorite>,
    next_genre_id: i64,
    next_movie_id: i64,
    next_favorite_id: i64,
}

impl CatalogData {
    fn movie_by_tmdb(&self, tmdb_id: i64) -> Option<&Movie> {
        self.tmdb_index
            .get(&tmdb_id)
            .and_then(|id| self.movies.get(id))
    }

    fn genres_for(&self, tmdb_ids: &[i64]) -> Vec<Genre> {
        let mut genres: Vec<Genre> = tmdb_ids
            .iter()
            .filter_map(|id| self.genres.get(id).cloned())
            .collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        genres.dedup_by_key(|genre| genre.id);
        genres
    }

    fn sorted(&self, mut movies: Vec<Movie>) -> Vec<Movie> {
        movies.sort_by(by_popularity);
        movies
    }
}

/// Default catalog ordering: most popular first, then most recent.
fn by_popularity(a: &Movie, b: &Movie) -> Ordering {
    b.popularity
        .total_cmp(&a.popularity)
        .then_with(|| b.release_date.cmp(&a.release_date))
        .then_with(|| a.id.cmp(&b.id))
}

// == Catalog ==
/// The local movie catalog.
#[derive(Debug, Default)]
pub struct Catalog {
    data: RwLock<CatalogData>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    // == Writes ==
    /// Inserts a genre or renames an existing one. Returns whether it was new.
    pub async fn upsert_genre(&self, entry: &GenreEntry) -> bool {
        let mut data = self.data.write().await;
        if let Some(genre) = data.genres.get_mut(&entry.id) {
            genre.name.clone_from(&entry.name);
            return false;
        }

        data.next_genre_id += 1;
        let genre = Genre {
            id: data.next_genre_id,
            tmdb_id: entry.id,
            name: entry.name.clone(),
        };
        data.genres.insert(entry.id, genre);
        true
    }

    /// Creates or refreshes a movie from a list entry.
    ///
    /// Detail-only fields (runtime, budget, status, ...) are left untouched on
    /// update. Genre ids not present in the catalog are skipped.
    pub async fn upsert_movie(&self, summary: &MovieSummary) -> Upserted {
        let mut data = self.data.write().await;
        let now = Utc::now();
        let release_date = parse_release_date(summary.release_date.as_deref());
        let genres = data.genres_for(&summary.genre_ids);

        if let Some(id) = data.tmdb_index.get(&summary.id).copied() {
            if let Some(movie) = data.movies.get_mut(&id) {
                movie.title.clone_from(&summary.title);
                movie.original_title.clone_from(&summary.original_title);
                movie.overview.clone_from(&summary.overview);
                if release_date.is_some() {
                    movie.release_date = release_date;
                }
                if let Some(path) = &summary.poster_path {
                    movie.poster_path.clone_from(path);
                }
                if let Some(path) = &summary.backdrop_path {
                    movie.backdrop_path.clone_from(path);
                }
                movie.vote_average = summary.vote_average;
                movie.vote_count = summary.vote_count;
                movie.popularity = summary.popularity;
                if let Some(language) = &summary.original_language {
                    movie.original_language.clone_from(language);
                }
                if !genres.is_empty() {
                    movie.genres = genres;
                }
                movie.updated_at = now;
                return Upserted { movie: movie.clone(), created: false };
            }
        }

        data.next_movie_id += 1;
        let movie = Movie {
            id: data.next_movie_id,
            tmdb_id: summary.id,
            imdb_id: None,
            title: summary.title.clone(),
            original_title: summary.original_title.clone(),
            overview: summary.overview.clone(),
            tagline: String::new(),
            release_date,
            poster_path: summary.poster_path.clone().unwrap_or_default(),
            backdrop_path: summary.backdrop_path.clone().unwrap_or_default(),
            vote_average: summary.vote_average,
            vote_count: summary.vote_count,
            popularity: summary.popularity,
            runtime: None,
            budget: None,
            revenue: None,
            status: MovieStatus::Released,
            original_language: summary
                .original_language
                .clone()
                .unwrap_or_else(|| "en".to_string()),
            genres,
            created_at: now,
            updated_at: now,
        };
        data.tmdb_index.insert(movie.tmdb_id, movie.id);
        data.movies.insert(movie.id, movie.clone());
        Upserted { movie, created: true }
    }

    /// Copies detail-only fields onto an existing movie. Zero budgets and
    /// revenues are stored as unknown.
    pub async fn apply_details(&self, details: &MovieDetails) -> Option<Movie> {
        let mut data = self.data.write().await;
        let id = data.tmdb_index.get(&details.id).copied()?;
        let movie = data.movies.get_mut(&id)?;

        movie.runtime = details.runtime;
        movie.budget = details.budget.filter(|budget| *budget > 0);
        movie.revenue = details.revenue.filter(|revenue| *revenue > 0);
        movie.imdb_id = details.imdb_id.clone().filter(|imdb| !imdb.is_empty());
        movie.tagline = details.tagline.clone().unwrap_or_default();
        movie.status = details
            .status
            .as_deref()
            .map(MovieStatus::from_tmdb)
            .unwrap_or_default();
        movie.updated_at = Utc::now();
        Some(movie.clone())
    }

    /// TMDb ids of movies whose details were never fetched.
    pub async fn movies_missing_details(&self, limit: usize) -> Vec<i64> {
        let data = self.data.read().await;
        let mut missing: Vec<&Movie> = data
            .movies
            .values()
            .filter(|movie| movie.runtime.is_none())
            .collect();
        missing.sort_by_key(|movie| movie.id);
        missing.into_iter().take(limit).map(|movie| movie.tmdb_id).collect()
    }

    // == Reads ==
    pub async fn movie_count(&self) -> usize {
        self.data.read().await.movies.len()
    }

    /// Movies matching `filter` in catalog order.
    pub async fn list(&self, filter: &MovieFilter) -> Vec<Movie> {
        let data = self.data.read().await;
        let movies = data
            .movies
            .values()
            .filter(|movie| filter.matches(movie))
            .cloned()
            .collect();
        data.sorted(movies)
    }

    pub async fn get(&self, tmdb_id: i64) -> Option<Movie> {
        self.data.read().await.movie_by_tmdb(tmdb_id).cloned()
    }

    /// Most popular released movies.
    pub async fn trending(&self) -> Vec<Movie> {
        let data = self.data.read().await;
        let released = data
            .movies
            .values()
            .filter(|movie| movie.status == MovieStatus::Released)
            .cloned()
            .collect();
        let mut movies = data.sorted(released);
        movies.truncate(FEATURED_LIMIT);
        movies
    }

    /// Well-rated released movies from the last two years, best rated first.
    pub async fn recommended(&self, today: NaiveDate) -> Vec<Movie> {
        let since = today - ChronoDuration::days(RECOMMENDED_WINDOW_DAYS);
        let data = self.data.read().await;
        let mut movies: Vec<Movie> = data
            .movies
            .values()
            .filter(|movie| {
                movie.status == MovieStatus::Released
                    && movie.release_date.is_some_and(|date| date >= since)
                    && movie.vote_average >= RECOMMENDED_MIN_RATING
                    && movie.vote_count >= RECOMMENDED_MIN_VOTES
            })
            .cloned()
            .collect();

        movies.sort_by(|a, b| {
            b.vote_average
                .total_cmp(&a.vote_average)
                .then_with(|| by_popularity(a, b))
        });
        movies.truncate(FEATURED_LIMIT);
        movies
    }

    /// Like `list`, capped at `SEARCH_LIMIT`.
    pub async fn search(&self, filter: &MovieFilter) -> Vec<Movie> {
        let mut movies = self.list(filter).await;
        movies.truncate(SEARCH_LIMIT);
        movies
    }

    /// All genres ordered by name.
    pub async fn genres(&self) -> Vec<Genre> {
        let data = self.data.read().await;
        let mut genres: Vec<Genre> = data.genres.values().cloned().collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        genres
    }

    // == Favorites ==
    /// A user's favorites with their movies, newest first.
    pub async fn favorites(&self, user_id: i64) -> Vec<(UserFavorite, Movie)> {
        let data = self.data.read().await;
        let mut favorites: Vec<(UserFavorite, Movie)> = data
            .favorites
            .iter()
            .filter(|favorite| favorite.user_id == user_id)
            .filter_map(|favorite| {
                data.movies
                    .get(&favorite.movie_id)
                    .map(|movie| (favorite.clone(), movie.clone()))
            })
            .collect();

        favorites.sort_by(|(a, _), (b, _)| {
            b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
        });
        favorites
    }

    /// Marks catalog movie `movie_id` as a favorite of `user_id`.
    pub async fn add_favorite(
        &self,
        user_id: i64,
        movie_id: i64,
    ) -> Result<(UserFavorite, Movie), CatalogError> {
        let mut data = self.data.write().await;

        if data
            .favorites
            .iter()
            .any(|favorite| favorite.user_id == user_id && favorite.movie_id == movie_id)
        {
            return Err(CatalogError::AlreadyFavorite);
        }

        let movie = data
            .movies
            .get(&movie_id)
            .cloned()
            .ok_or(CatalogError::MovieNotFound(movie_id))?;

        data.next_favorite_id += 1;
        let favorite = UserFavorite {
            id: data.next_favorite_id,
            user_id,
            movie_id,
            created_at: Utc::now(),
        };
        data.favorites.push(favorite.clone());
        Ok((favorite, movie))
    }

    pub async fn remove_favorite(&self, user_id: i64, movie_id: i64) -> Result<(), CatalogError> {
        let mut data = self.data.write().await;
        let before = data.favorites.len();
        data.favorites
            .retain(|favorite| !(favorite.user_id == user_id && favorite.movie_id == movie_id));

        if data.favorites.len() == before {
            Err(CatalogError::FavoriteNotFound(movie_id))
        } else {
            Ok(())
        }
    }
}
