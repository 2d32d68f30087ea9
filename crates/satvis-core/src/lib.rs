//! Core data model for the satellite visibility dashboard.
//!
//! This crate provides the types shared by the transport and refresh layers:
//! - `Category`: the four fixed backend data domains and their routes
//! - `RequestSpec`: one entry of a batch (category tag + query parameters)
//! - `ApiResult`, `BatchResult`: normalized outcomes, never exceptions
//! - `HealthReport`: per-endpoint health as seen by the client

pub mod category;
pub mod error;
pub mod health;
pub mod request;
pub mod result;

pub use category::{Category, HttpMethod};
pub use error::{CoreError, Result};
pub use health::{EndpointHealth, HealthReport, HealthStatus};
pub use request::{QueryParams, RequestSpec};
pub use result::{ApiResult, BatchResult};
