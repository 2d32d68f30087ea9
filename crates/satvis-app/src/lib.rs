//! Satellite visibility dashboard client.
//!
//! Wires the transport, refresh controller and a summary sink into one
//! application:
//! - Connection check and initial load
//! - Auto refresh until shutdown
//! - One-shot refresh, health check and test-data generation
//! - JSON export of the cache

pub mod app;
pub mod config;
pub mod error;
pub mod export;
pub mod summary;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use export::{default_export_filename, write_export, ExportDocument};
pub use summary::{DashboardSummary, SummarySink};
