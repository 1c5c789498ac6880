//! Movie Catalog - A TMDb-backed movie catalog service
//!
//! Mirrors movie data from The Movie Database into a local catalog and puts
//! a cache-aside layer with per-category TTLs in front of every upstream
//! call.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;
pub mod tmdb;

pub use api::{create_router, AppState};
pub use config::Config;
pub use tasks::spawn_cleanup_task;
