//! JSON export of the cached category results.

use crate::error::AppResult;
use chrono::{DateTime, Utc};
use satvis_core::ApiResult;
use satvis_refresh::CacheSnapshot;
use serde::Serialize;
use std::path::Path;

/// Exported document: export time plus the four cached results.
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub timestamp: DateTime<Utc>,
    pub satellite: Option<&'a ApiResult>,
    pub trajectory: Option<&'a ApiResult>,
    pub analysis: Option<&'a ApiResult>,
    pub status: Option<&'a ApiResult>,
}

impl<'a> ExportDocument<'a> {
    pub fn new(snapshot: &'a CacheSnapshot, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            satellite: snapshot.satellite.as_ref(),
            trajectory: snapshot.trajectory.as_ref(),
            analysis: snapshot.analysis.as_ref(),
            status: snapshot.status.as_ref(),
        }
    }
}

/// `satellite_data_<YYYY-MM-DD>.json`
pub fn default_export_filename(at: DateTime<Utc>) -> String {
    format!("satellite_data_{}.json", at.format("%Y-%m-%d"))
}

/// Write `snapshot` as pretty-printed JSON to `path`.
pub fn write_export(snapshot: &CacheSnapshot, at: DateTime<Utc>, path: &Path) -> AppResult<()> {
    let document = ExportDocument::new(snapshot, at);
    let content = serde_json::to_string_pretty(&document)?;
    std::fs::write(path, content)?;
    Ok(())
}
