//! Periodic refresh controller and category cache.
//!
//! The [`RefreshController`] owns the polling cadence and is the only writer
//! of the [`DataCache`]. Each cycle fetches all four categories as one batch
//! and, on success, replaces the cached group in a single swap. Results are
//! pushed to a [`RefreshSink`].
//!
//! ```text
//!   timer tick / refresh_now
//!            │
//!            ▼
//!   BatchFetcher::fetch_batch ──► evaluate ──► DataCache::swap ──► sink.on_refresh_complete
//!                                    │
//!                                    └──────────────────────────► sink.on_refresh_error
//! ```

pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod sink;

pub use cache::{CacheSnapshot, DataCache};
pub use config::RefreshConfig;
pub use controller::{RefreshController, RefreshPhase};
pub use error::{RefreshError, RefreshResult};
pub use sink::{BroadcastSink, RefreshEvent, RefreshSink};
