//! Dashboard summary derived from the cache.
//!
//! This is the status bar of the dashboard: backend online, visible
//! satellites, aircraft count and last update time.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use satvis_core::Category;
use satvis_refresh::{CacheSnapshot, RefreshSink};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// Status request of the last refresh succeeded.
    pub online: bool,
    pub visible_satellites: usize,
    pub aircraft_count: usize,
    /// Categories whose last request failed.
    pub failed_categories: Vec<Category>,
    pub last_update: Option<DateTime<Utc>>,
    pub version: u64,
}

impl DashboardSummary {
    pub fn from_snapshot(snapshot: &CacheSnapshot) -> Self {
        let online = snapshot
            .status
            .as_ref()
            .map(|r| r.is_success())
            .unwrap_or(false);

        let visible_satellites = payload(snapshot, Category::Satellite)
            .and_then(|data| data.get("satellites"))
            .and_then(Value::as_array)
            .map(|sats| sats.iter().filter(|s| is_visible(s)).count())
            .unwrap_or(0);

        let aircraft_count = payload(snapshot, Category::Trajectory)
            .and_then(|data| data.get("trajectories"))
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0);

        let failed_categories = Category::ALL
            .into_iter()
            .filter(|c| snapshot.get(*c).is_some_and(|r| !r.is_success()))
            .collect();

        Self {
            online,
            visible_satellites,
            aircraft_count,
            failed_categories,
            last_update: snapshot.last_update,
            version: snapshot.version,
        }
    }
}

fn payload(snapshot: &CacheSnapshot, category: Category) -> Option<&Value> {
    snapshot.get(category).and_then(|r| r.data())
}

/// Accepts `visible` or `is_visible`, as bool or 0/1.
fn is_visible(satellite: &Value) -> bool {
    match satellite.get("visible").or_else(|| satellite.get("is_visible")) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().is_some_and(|v| v != 0),
        _ => false,
    }
}

/// Sink that keeps the latest summary and logs every refresh.
#[derive(Debug, Default)]
pub struct SummarySink {
    latest: RwLock<Option<DashboardSummary>>,
    last_error: RwLock<Option<String>>,
}

impl SummarySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<DashboardSummary> {
        self.latest.read().clone()
    }

    /// Message of the most recent failed refresh, cleared by the next success.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }
}

impl RefreshSink for SummarySink {
    fn on_refresh_complete(&self, snapshot: &CacheSnapshot) {
        let summary = DashboardSummary::from_snapshot(snapshot);
        info!(
            online = summary.online,
            visible_satellites = summary.visible_satellites,
            aircraft_count = summary.aircraft_count,
            failed = ?summary.failed_categories,
            version = summary.version,
            "Dashboard updated"
        );
        *self.latest.write() = Some(summary);
        *self.last_error.write() = None;
    }

    fn on_refresh_error(&self, message: &str) {
        warn!(error = %message, "Refresh failed, showing cached data");
        *self.last_error.write() = Some(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satvis_core::ApiResult;
    use serde_json::json;

    fn snapshot() -> CacheSnapshot {
        CacheSnapshot {
            status: Some(ApiResult::ok(json!({ "success": true }))),
            satellite: Some(ApiResult::ok(json!({
                "satellites": [
                    { "id": "C01", "visible": true },
                    { "id": "C02", "visible": false },
                    { "id": "C03", "is_visible": 1 },
                    { "id": "C04" }
                ]
            }))),
            trajectory: Some(ApiResult::ok(json!({
                "trajectories": [{ "id": 1 }, { "id": 2 }, { "id": 3 }]
            }))),
            analysis: Some(ApiResult::failed("HTTP 500: Internal Server Error")),
            last_update: Some(Utc::now()),
            version: 7,
        }
    }

    #[test]
    fn test_summary_from_snapshot() {
        let summary = DashboardSummary::from_snapshot(&snapshot());
        assert!(summary.online);
        assert_eq!(summary.visible_satellites, 2);
        assert_eq!(summary.aircraft_count, 3);
        assert_eq!(summary.failed_categories, vec![Category::Analysis]);
        assert_eq!(summary.version, 7);
    }

    #[test]
    fn test_summary_offline_when_status_failed() {
        let mut snap = snapshot();
        snap.status = Some(ApiResult::failed("request timed out after 10000ms"));
        let summary = DashboardSummary::from_snapshot(&snap);
        assert!(!summary.online);
        assert_eq!(
            summary.failed_categories,
            vec![Category::Status, Category::Analysis]
        );
    }

    #[test]
    fn test_summary_of_empty_cache() {
        let summary = DashboardSummary::from_snapshot(&CacheSnapshot::default());
        assert_eq!(summary, DashboardSummary::default());
    }

    #[test]
    fn test_sink_tracks_latest_and_error() {
        let sink = SummarySink::new();
        assert!(sink.latest().is_none());

        sink.on_refresh_error("batch failed: x");
        assert_eq!(sink.last_error().as_deref(), Some("batch failed: x"));

        sink.on_refresh_complete(&snapshot());
        assert_eq!(sink.latest().unwrap().aircraft_count, 3);
        assert!(sink.last_error().is_none());
    }
}
