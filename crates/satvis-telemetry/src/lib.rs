//! Prometheus metrics and structured logging for the dashboard client.
//!
//! - Structured logging with tracing (pretty in development, JSON in production)
//! - Prometheus counters for requests, refresh ticks and endpoint health

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
