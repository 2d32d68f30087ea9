//! Refresh notification sinks.

use crate::cache::CacheSnapshot;
use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

/// Receiver of refresh outcomes.
///
/// Called synchronously after each cycle, outside the controller's locks.
#[cfg_attr(test, mockall::automock)]
pub trait RefreshSink: Send + Sync {
    /// A cycle produced a new cache snapshot.
    fn on_refresh_complete(&self, snapshot: &CacheSnapshot);

    /// A cycle failed; the cache kept its previous value.
    fn on_refresh_error(&self, message: &str);
}

/// Event published by [`BroadcastSink`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RefreshEvent {
    Updated { snapshot: CacheSnapshot },
    Failed { message: String, timestamp_ms: i64 },
}

/// Publishes refresh outcomes on a broadcast channel.
///
/// Sending with no subscribers is not an error.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<RefreshEvent>,
}

impl BroadcastSink {
    /// `capacity` is the number of events a slow subscriber may lag behind;
    /// it is raised to 1 when zero.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.tx.subscribe()
    }

    fn publish(&self, event: RefreshEvent) {
        match self.tx.send(event) {
            Ok(n) => trace!(receivers = n, "Refresh event sent"),
            Err(_) => trace!("No refresh event receivers"),
        }
    }
}

impl RefreshSink for BroadcastSink {
    fn on_refresh_complete(&self, snapshot: &CacheSnapshot) {
        self.publish(RefreshEvent::Updated {
            snapshot: snapshot.clone(),
        });
    }

    fn on_refresh_error(&self, message: &str) {
        self.publish(RefreshEvent::Failed {
            message: message.to_string(),
            timestamp_ms: Utc::now().timestamp_millis(),
        });
    }
}
