//! API Module
//!
//! HTTP handlers and routing for the movie catalog REST API: the local
//! catalog under `/api/movies`, the cached upstream under `/api/tmdb`, and
//! `/health`.

pub mod auth;
pub mod handlers;
pub mod routes;
pub mod upstream;

pub use auth::{AdminUser, CurrentUser};
pub use handlers::*;
pub use routes::create_router;
