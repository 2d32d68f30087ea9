//! Main application orchestration.
//!
//! Lifecycle of `watch`:
//! 1. Check that the backend answers `/api/status` with `success: true`
//! 2. Initial load (one manual refresh)
//! 3. Auto refresh if enabled
//! 4. On shutdown signal, stop the timer and drop in-flight results

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::export::{default_export_filename, write_export};
use crate::summary::{DashboardSummary, SummarySink};
use chrono::Utc;
use satvis_core::HealthReport;
use satvis_refresh::{RefreshController, RefreshSink};
use satvis_transport::ApiClient;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Main application.
pub struct Application {
    config: AppConfig,
    client: ApiClient,
    summary: Arc<SummarySink>,
    controller: RefreshController<ApiClient>,
}

impl Application {
    /// Create a new application. No request is issued yet.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;
        let client = ApiClient::new(&config.transport)?;
        let summary = Arc::new(SummarySink::new());
        let sink: Arc<dyn RefreshSink> = summary.clone();
        let controller = RefreshController::new(client.clone(), sink, &config.refresh)?;

        Ok(Self {
            config,
            client,
            summary,
            controller,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn controller(&self) -> &RefreshController<ApiClient> {
        &self.controller
    }

    pub fn summary(&self) -> &SummarySink {
        &self.summary
    }

    /// One manual refresh; returns the summary of the new cache.
    pub async fn refresh_once(&self) -> AppResult<DashboardSummary> {
        let snapshot = self.controller.refresh_now().await?;
        Ok(DashboardSummary::from_snapshot(&snapshot))
    }

    pub async fn health(&self) -> HealthReport {
        let report = self.client.health_check().await;
        let unhealthy = report.values().filter(|h| !h.is_healthy()).count();
        info!(endpoints = report.len(), unhealthy, "Health check finished");
        report
    }

    /// Ask the backend to generate test data, then refresh.
    pub async fn generate(&self) -> AppResult<DashboardSummary> {
        let result = self.client.generate_test_data(&self.config.generate).await;
        if !result.is_success() {
            let message = result.error().unwrap_or("unknown error").to_string();
            error!(error = %message, "Test data generation failed");
            return Err(AppError::Request(message));
        }
        info!("Test data generated");
        self.refresh_once().await
    }

    /// Refresh, then write the cache as JSON.
    ///
    /// Without `output` the file is `satellite_data_<YYYY-MM-DD>.json` in the
    /// working directory. Returns the written path.
    pub async fn export(&self, output: Option<PathBuf>) -> AppResult<PathBuf> {
        let snapshot = self.controller.refresh_now().await?;
        let now = Utc::now();
        let path = output.unwrap_or_else(|| PathBuf::from(default_export_filename(now)));
        write_export(&snapshot, now, &path)?;
        info!(path = %path.display(), version = snapshot.version, "Cache exported");
        Ok(path)
    }

    /// Run until Ctrl-C.
    pub async fn run(&self) -> AppResult<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl-C");
            }
        })
        .await
    }

    /// Run until `shutdown` resolves.
    pub async fn run_until(&self, shutdown: impl Future<Output = ()>) -> AppResult<()> {
        info!(base_url = %self.client.base_url(), "Checking backend connection");
        if !self.client.check_connection().await {
            return Err(AppError::Unreachable(self.client.base_url().to_string()));
        }

        // A failed initial load is reported through the sink; polling still starts.
        if let Err(e) = self.controller.refresh_now().await {
            warn!(error = %e, "Initial load failed");
        }

        if self.config.refresh.enabled {
            self.controller.start(self.config.refresh.interval())?;
        } else {
            info!("Auto refresh disabled");
        }

        shutdown.await;
        info!("Shutdown requested");
        self.controller.shutdown();
        Ok(())
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("base_url", &self.client.base_url())
            .field("controller", &self.controller)
            .finish()
    }
}
