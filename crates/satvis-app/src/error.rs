//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(#[from] satvis_transport::TransportError),

    #[error("Refresh error: {0}")]
    Refresh(#[from] satvis_refresh::RefreshError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] satvis_telemetry::TelemetryError),

    #[error("Backend unreachable at {0}")]
    Unreachable(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;
