//! Catalog Module
//!
//! The local mirror of TMDb movies plus per-user favorites.

mod models;
mod repository;

pub use models::{
    parse_release_date, Genre, Movie, MovieStatus, UserFavorite, BACKDROP_SIZE, POSTER_SIZE,
};
pub use repository::{
    Catalog, MovieFilter, Upserted, FEATURED_LIMIT, RECOMMENDED_MIN_RATING,
    RECOMMENDED_MIN_VOTES, RECOMMENDED_WINDOW_DAYS, SEARCH_LIMIT,
};
