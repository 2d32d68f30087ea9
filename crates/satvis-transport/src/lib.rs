//! HTTP transport for the satellite visibility backend API.
//!
//! Executes requests against a fixed base URL with a per-request timeout and
//! normalizes every outcome into an [`ApiResult`](satvis_core::ApiResult):
//!
//! - `request`: raw JSON or a [`TransportError`]
//! - `call_category`: one category GET, never fails
//! - `batch`: concurrent category calls, results in input order
//! - `health_check`: independent probe of every route
//!
//! [`BatchFetcher`] is the seam the refresh controller drives.

pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;

pub use client::ApiClient;
pub use config::{GenerateRequest, TransportConfig};
pub use error::{TransportError, TransportResult};
pub use fetcher::BatchFetcher;
