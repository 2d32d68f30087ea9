//! Category cache.
//!
//! Holds the most recent result per category as one immutable snapshot.
//! A swap replaces the whole snapshot, so readers see either the previous
//! group or the new one, never a mix.

use crate::error::{RefreshError, RefreshResult};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use satvis_core::{ApiResult, Category};
use serde::Serialize;
use std::sync::Arc;

/// Cached results of one refresh, plus bookkeeping.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheSnapshot {
    pub status: Option<ApiResult>,
    pub satellite: Option<ApiResult>,
    pub trajectory: Option<ApiResult>,
    pub analysis: Option<ApiResult>,
    /// Time of the swap that produced this snapshot.
    pub last_update: Option<DateTime<Utc>>,
    /// Number of swaps so far (0 = never refreshed).
    pub version: u64,
}

impl CacheSnapshot {
    pub fn get(&self, category: Category) -> Option<&ApiResult> {
        match category {
            Category::Status => self.status.as_ref(),
            Category::Satellite => self.satellite.as_ref(),
            Category::Trajectory => self.trajectory.as_ref(),
            Category::Analysis => self.analysis.as_ref(),
        }
    }

    /// True until the first swap.
    pub fn is_empty(&self) -> bool {
        self.version == 0
    }
}

/// Shared cache handle. Only the refresh controller swaps it.
#[derive(Debug, Default)]
pub struct DataCache {
    current: RwLock<Arc<CacheSnapshot>>,
}

impl DataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot. Cheap; later swaps do not affect it.
    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        Arc::clone(&self.current.read())
    }

    pub fn version(&self) -> u64 {
        self.current.read().version
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.current.read().last_update
    }

    /// Replace all four slots with `results` (in [`Category::ALL`] order).
    pub(crate) fn swap(&self, results: Vec<ApiResult>) -> RefreshResult<Arc<CacheSnapshot>> {
        let expected = Category::ALL.len();
        if results.len() != expected {
            return Err(RefreshError::MisalignedBatch {
                expected,
                actual: results.len(),
            });
        }

        let mut slots = results.into_iter();
        let mut current = self.current.write();
        let next = Arc::new(CacheSnapshot {
            status: slots.next(),
            satellite: slots.next(),
            trajectory: slots.next(),
            analysis: slots.next(),
            last_update: Some(Utc::now()),
            version: current.version + 1,
        });
        *current = Arc::clone(&next);
        Ok(next)
    }
}
