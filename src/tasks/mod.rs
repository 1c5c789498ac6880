//! Background Tasks Module
//!
//! Work that runs outside the request path.
//!
//! # Tasks
//! - TTL Cleanup: Removes expired store entries at configured intervals
//! - Sync: Loads upstream genres and movie lists into the catalog
//! - Warm: Pre-fetches the most requested upstream lists

mod cleanup;
pub mod sync;
mod warm;

pub use cleanup::spawn_cleanup_task;
pub use sync::{fetch_missing_details, populate, SyncCategory, SyncReport};
pub use warm::warm_popular_caches;
