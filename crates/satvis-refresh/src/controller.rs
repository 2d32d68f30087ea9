//! Refresh controller.
//!
//! States: `Idle` (no timer) and `Polling` (one timer task). Starting while
//! polling replaces the timer; there is never more than one live timer.
//!
//! Results are applied under the controller lock after checking that no
//! `stop()` or `shutdown()` happened while the batch was in flight, so a late
//! batch never reaches the cache. Manual refreshes are covered too: `stop()`
//! bumps a stop epoch that every cycle captures before fetching.

use crate::cache::{CacheSnapshot, DataCache};
use crate::config::RefreshConfig;
use crate::error::{RefreshError, RefreshResult};
use crate::sink::RefreshSink;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use satvis_core::{ApiResult, BatchResult, RequestSpec};
use satvis_telemetry::Metrics;
use satvis_transport::BatchFetcher;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Polling state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshPhase {
    Idle,
    Polling,
}

/// What started a refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Tick,
    Manual,
}

impl Trigger {
    fn as_str(&self) -> &'static str {
        match self {
            Trigger::Tick => "tick",
            Trigger::Manual => "manual",
        }
    }
}

/// Handle of the running timer task.
struct Timer {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Timer {
    fn cancel(self) {
        self.token.cancel();
        self.handle.abort();
    }
}

struct ControllerState {
    interval: Duration,
    timer: Option<Timer>,
    /// Incremented by every `stop()`.
    stop_epoch: u64,
}

struct Shared<F> {
    fetcher: F,
    requests: Vec<RequestSpec>,
    cache: DataCache,
    sink: Arc<dyn RefreshSink>,
    state: Mutex<ControllerState>,
    /// Cancelled on teardown.
    closed: CancellationToken,
}

/// Drives periodic batch fetches and owns the category cache.
pub struct RefreshController<F: BatchFetcher> {
    shared: Arc<Shared<F>>,
}

impl<F: BatchFetcher> RefreshController<F> {
    /// Create an idle controller. Call [`start`](Self::start) (or
    /// [`set_enabled`](Self::set_enabled)) to begin polling.
    pub fn new(
        fetcher: F,
        sink: Arc<dyn RefreshSink>,
        config: &RefreshConfig,
    ) -> RefreshResult<Self> {
        let interval = config.interval();
        if interval.is_zero() {
            return Err(RefreshError::InvalidInterval);
        }

        Ok(Self {
            shared: Arc::new(Shared {
                fetcher,
                requests: RequestSpec::full_refresh(),
                cache: DataCache::new(),
                sink,
                state: Mutex::new(ControllerState {
                    interval,
                    timer: None,
                    stop_epoch: 0,
                }),
                closed: CancellationToken::new(),
            }),
        })
    }

    /// Read access to the cache.
    pub fn cache(&self) -> &DataCache {
        &self.shared.cache
    }

    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        self.shared.cache.snapshot()
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.shared.cache.last_update()
    }

    pub fn phase(&self) -> RefreshPhase {
        if self.shared.state.lock().timer.is_some() {
            RefreshPhase::Polling
        } else {
            RefreshPhase::Idle
        }
    }

    pub fn interval(&self) -> Duration {
        self.shared.state.lock().interval
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.closed.is_cancelled()
    }

    /// Start polling every `interval`. The first tick fires one interval
    /// from now. Any running timer is cancelled first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, interval: Duration) -> RefreshResult<()> {
        if interval.is_zero() {
            return Err(RefreshError::InvalidInterval);
        }
        if self.is_shut_down() {
            return Err(RefreshError::ShutDown);
        }
        let mut state = self.shared.state.lock();
        self.start_locked(&mut state, interval);
        Ok(())
    }

    fn start_locked(&self, state: &mut ControllerState, interval: Duration) {
        if let Some(timer) = state.timer.take() {
            debug!("Replacing active refresh timer");
            timer.cancel();
        }

        state.interval = interval;
        let token = CancellationToken::new();
        let handle = tokio::spawn(run_ticker(
            Arc::clone(&self.shared),
            token.clone(),
            interval,
        ));
        state.timer = Some(Timer { token, handle });

        info!(interval_ms = interval.as_millis() as u64, "Auto refresh started");
    }

    /// Stop polling. Batches already in flight, manual ones included, are
    /// discarded when they settle. The timer part is a no-op when idle.
    pub fn stop(&self) {
        let mut state = self.shared.state.lock();
        state.stop_epoch += 1;
        if let Some(timer) = state.timer.take() {
            timer.cancel();
            info!("Auto refresh stopped");
        }
    }

    /// Auto refresh toggle: start with the current interval, or stop.
    pub fn set_enabled(&self, enabled: bool) -> RefreshResult<()> {
        if enabled {
            let interval = self.interval();
            self.start(interval)
        } else {
            self.stop();
            Ok(())
        }
    }

    /// Change the interval. While polling the timer is restarted with the
    /// new value; while idle the value is kept for the next start.
    pub fn set_interval(&self, interval: Duration) -> RefreshResult<()> {
        if interval.is_zero() {
            return Err(RefreshError::InvalidInterval);
        }
        let mut state = self.shared.state.lock();
        if state.timer.is_some() && !self.is_shut_down() {
            self.start_locked(&mut state, interval);
        } else {
            state.interval = interval;
        }
        Ok(())
    }

    /// Run one fetch-and-swap now, outside the timer cadence.
    ///
    /// The timer, if any, keeps its schedule.
    pub async fn refresh_now(&self) -> RefreshResult<Arc<CacheSnapshot>> {
        if self.is_shut_down() {
            return Err(RefreshError::ShutDown);
        }

        let shared = &self.shared;
        let epoch = shared.stop_epoch();
        let batch = tokio::select! {
            _ = shared.closed.cancelled() => {
                Metrics::refresh(Trigger::Manual.as_str(), "discarded");
                return Err(RefreshError::Discarded);
            }
            batch = shared.fetcher.fetch_batch(&shared.requests) => batch,
        };
        shared.complete(Trigger::Manual, batch, epoch, None)
    }

    /// Teardown: stop the timer and drop any in-flight result.
    pub fn shutdown(&self) {
        if !self.shared.closed.is_cancelled() {
            debug!("Refresh controller shutting down");
        }
        self.shared.closed.cancel();
        self.stop();
    }
}

impl<F: BatchFetcher> Drop for RefreshController<F> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<F: BatchFetcher> std::fmt::Debug for RefreshController<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshController")
            .field("phase", &self.phase())
            .field("interval", &self.interval())
            .field("version", &self.shared.cache.version())
            .finish()
    }
}

impl<F: BatchFetcher> Shared<F> {
    fn stop_epoch(&self) -> u64 {
        self.state.lock().stop_epoch
    }

    /// Apply a settled batch and notify the sink.
    ///
    /// `epoch` is the stop epoch read before the fetch started. `timer` is the
    /// token of the tick that produced the batch; `None` for manual refreshes.
    fn complete(
        &self,
        trigger: Trigger,
        batch: BatchResult,
        epoch: u64,
        timer: Option<&CancellationToken>,
    ) -> RefreshResult<Arc<CacheSnapshot>> {
        let outcome = {
            let state = self.state.lock();
            if self.closed.is_cancelled()
                || state.stop_epoch != epoch
                || timer.is_some_and(|t| t.is_cancelled())
            {
                debug!(trigger = trigger.as_str(), "Discarding late refresh result");
                Metrics::refresh(trigger.as_str(), "discarded");
                return Err(RefreshError::Discarded);
            }
            evaluate(batch).and_then(|results| self.cache.swap(results))
        };

        match &outcome {
            Ok(snapshot) => {
                Metrics::refresh(trigger.as_str(), "updated");
                if let Some(ts) = snapshot.last_update {
                    Metrics::cache_swapped(ts.timestamp());
                }
                debug!(
                    trigger = trigger.as_str(),
                    version = snapshot.version,
                    "Cache updated"
                );
                self.sink.on_refresh_complete(snapshot);
            }
            Err(e) => {
                Metrics::refresh(trigger.as_str(), "failed");
                warn!(trigger = trigger.as_str(), error = %e, "Refresh failed");
                self.sink.on_refresh_error(&e.to_string());
            }
        }
        outcome
    }
}

/// Decide whether a settled batch is worth caching.
fn evaluate(batch: BatchResult) -> RefreshResult<Vec<ApiResult>> {
    if !batch.is_success() {
        return Err(RefreshError::BatchFailed(
            batch.error().unwrap_or("unknown error").to_string(),
        ));
    }
    if !batch.data().is_empty() && batch.data().iter().all(|r| !r.is_success()) {
        let first = batch
            .data()
            .iter()
            .find_map(ApiResult::error)
            .unwrap_or("unknown error")
            .to_string();
        return Err(RefreshError::AllRequestsFailed(first));
    }
    Ok(batch.into_data())
}

async fn run_ticker<F: BatchFetcher>(
    shared: Arc<Shared<F>>,
    token: CancellationToken,
    period: Duration,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let epoch = shared.stop_epoch();
        let batch = tokio::select! {
            _ = token.cancelled() => break,
            batch = shared.fetcher.fetch_batch(&shared.requests) => batch,
        };

        // Failures are already logged and passed to the sink; the next tick retries.
        let _ = shared.complete(Trigger::Tick, batch, epoch, Some(&token));
    }

    debug!("Refresh ticker exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MockRefreshSink;
    use satvis_core::Category;
    use serde_json::json;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Mode {
        AllOk,
        AllFail,
        FirstFails,
        Reject,
    }

    /// Fetcher with a fixed latency and a switchable outcome.
    struct ScriptedFetcher {
        calls: AtomicUsize,
        delay: Duration,
        mode: Mutex<Mode>,
    }

    impl ScriptedFetcher {
        fn new(delay: Duration, mode: Mode) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                delay,
                mode: Mutex::new(mode),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn set_mode(&self, mode: Mode) {
            *self.mode.lock() = mode;
        }
    }

    impl BatchFetcher for ScriptedFetcher {
        fn fetch_batch(
            &self,
            requests: &[RequestSpec],
        ) -> impl Future<Output = BatchResult> + Send {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let count = requests.len();
            let delay = self.delay;
            let mode = *self.mode.lock();
            async move {
                tokio::time::sleep(delay).await;
                match mode {
                    Mode::AllOk => BatchResult::completed(
                        (0..count)
                            .map(|i| ApiResult::ok(json!({ "call": call, "index": i })))
                            .collect(),
                    ),
                    Mode::AllFail => BatchResult::completed(
                        (0..count)
                            .map(|_| ApiResult::failed("request timed out after 10000ms"))
                            .collect(),
                    ),
                    Mode::FirstFails => BatchResult::completed(
                        (0..count)
                            .map(|i| {
                                if i == 0 {
                                    ApiResult::failed("HTTP 500: Internal Server Error")
                                } else {
                                    ApiResult::ok(json!({ "call": call, "index": i }))
                                }
                            })
                            .collect(),
                    ),
                    Mode::Reject => BatchResult::rejected("unknown request type: bogus"),
                }
            }
        }
    }

    /// Sink that counts notifications.
    #[derive(Default)]
    struct RecordingSink {
        completes: AtomicUsize,
        errors: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        fn completes(&self) -> usize {
            self.completes.load(Ordering::SeqCst)
        }

        fn errors(&self) -> Vec<String> {
            self.errors.lock().clone()
        }
    }

    impl RefreshSink for RecordingSink {
        fn on_refresh_complete(&self, _snapshot: &CacheSnapshot) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_refresh_error(&self, message: &str) {
            self.errors.lock().push(message.to_string());
        }
    }

    fn config(interval_ms: u64) -> RefreshConfig {
        RefreshConfig {
            enabled: true,
            interval_ms,
        }
    }

    fn setup(
        delay: Duration,
        mode: Mode,
    ) -> (
        RefreshController<Arc<ScriptedFetcher>>,
        Arc<ScriptedFetcher>,
        Arc<RecordingSink>,
    ) {
        let fetcher = ScriptedFetcher::new(delay, mode);
        let sink = Arc::new(RecordingSink::default());
        let controller =
            RefreshController::new(Arc::clone(&fetcher), sink.clone(), &config(5_000)).unwrap();
        (controller, fetcher, sink)
    }

    #[test]
    fn test_zero_interval_rejected() {
        let fetcher = ScriptedFetcher::new(Duration::ZERO, Mode::AllOk);
        let sink = Arc::new(RecordingSink::default());
        let err = RefreshController::new(fetcher, sink, &config(0)).unwrap_err();
        assert_eq!(err, RefreshError::InvalidInterval);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_state() {
        let (controller, fetcher, _sink) = setup(Duration::ZERO, Mode::AllOk);
        assert_eq!(controller.phase(), RefreshPhase::Idle);
        assert_eq!(controller.interval(), Duration::from_secs(5));
        assert!(controller.snapshot().is_empty());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_keeps_single_timer() {
        let (controller, fetcher, sink) = setup(Duration::from_millis(10), Mode::AllOk);

        controller.start(Duration::from_secs(5)).unwrap();
        controller.start(Duration::from_secs(5)).unwrap();
        assert_eq!(controller.phase(), RefreshPhase::Polling);

        tokio::time::sleep(Duration::from_secs(12)).await;

        assert_eq!(fetcher.calls(), 2);
        assert_eq!(sink.completes(), 2);
        assert_eq!(controller.snapshot().version, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_ticks() {
        let (controller, fetcher, _sink) = setup(Duration::from_millis(10), Mode::AllOk);

        controller.start(Duration::from_secs(1)).unwrap();
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(fetcher.calls(), 2);

        controller.stop();
        assert_eq!(controller.phase(), RefreshPhase::Idle);
        controller.stop();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_result_after_stop_discarded() {
        let (controller, fetcher, sink) = setup(Duration::from_secs(2), Mode::AllOk);

        controller.start(Duration::from_secs(1)).unwrap();
        // Tick at 1s, batch in flight until 3s.
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(fetcher.calls(), 1);

        controller.stop();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(controller.snapshot().version, 0);
        assert_eq!(sink.completes(), 0);
        assert!(sink.errors().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_in_flight_at_stop_discarded() {
        let (controller, _fetcher, sink) = setup(Duration::from_secs(2), Mode::AllOk);

        controller.start(Duration::from_secs(5)).unwrap();
        let (result, _) = tokio::join!(controller.refresh_now(), async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            controller.stop();
        });

        assert_eq!(result.unwrap_err(), RefreshError::Discarded);
        assert_eq!(controller.phase(), RefreshPhase::Idle);
        assert_eq!(controller.snapshot().version, 0);
        assert_eq!(sink.completes(), 0);
        assert!(sink.errors().is_empty());

        // A refresh issued after the stop is applied normally.
        let snapshot = controller.refresh_now().await.unwrap();
        assert_eq!(snapshot.version, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_tick_keeps_cache() {
        let (controller, fetcher, sink) = setup(Duration::from_millis(10), Mode::AllOk);

        let first = controller.refresh_now().await.unwrap();
        assert_eq!(first.version, 1);

        fetcher.set_mode(Mode::AllFail);
        controller.start(Duration::from_secs(5)).unwrap();
        tokio::time::sleep(Duration::from_secs(6)).await;
        controller.stop();

        let errors = sink.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("all requests failed"));

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.version, 1);
        assert!(snapshot.get(Category::Satellite).unwrap().is_success());
        assert_eq!(sink.completes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_end_polling() {
        let (controller, fetcher, sink) = setup(Duration::from_millis(10), Mode::Reject);

        controller.start(Duration::from_secs(1)).unwrap();
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(sink.errors().len(), 3);
        assert_eq!(controller.phase(), RefreshPhase::Polling);

        fetcher.set_mode(Mode::AllOk);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(sink.completes(), 1);
        assert_eq!(controller.snapshot().version, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_failure_swaps_cache() {
        let (controller, _fetcher, sink) = setup(Duration::from_millis(10), Mode::FirstFails);

        let snapshot = controller.refresh_now().await.unwrap();

        assert_eq!(snapshot.version, 1);
        assert!(!snapshot.get(Category::Status).unwrap().is_success());
        assert!(snapshot.get(Category::Analysis).unwrap().is_success());
        assert_eq!(sink.completes(), 1);
        assert!(sink.errors().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_now_keeps_timer_schedule() {
        let (controller, fetcher, _sink) = setup(Duration::from_millis(10), Mode::AllOk);

        controller.start(Duration::from_secs(5)).unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
        controller.refresh_now().await.unwrap();
        assert_eq!(fetcher.calls(), 1);

        // The tick still fires at 5s, not 3s + 5s.
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(controller.phase(), RefreshPhase::Polling);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_interval_restarts_timer() {
        let (controller, fetcher, _sink) = setup(Duration::from_millis(10), Mode::AllOk);

        controller.start(Duration::from_secs(10)).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        controller.set_interval(Duration::from_secs(2)).unwrap();
        assert_eq!(controller.interval(), Duration::from_secs(2));

        // New ticks at 3s and 5s.
        tokio::time::sleep(Duration::from_millis(4_500)).await;
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_interval_while_idle() {
        let (controller, fetcher, _sink) = setup(Duration::from_millis(10), Mode::AllOk);

        controller.set_interval(Duration::from_secs(1)).unwrap();
        assert_eq!(controller.phase(), RefreshPhase::Idle);
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(fetcher.calls(), 0);

        controller.set_enabled(true).unwrap();
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(fetcher.calls(), 1);

        controller.set_enabled(false).unwrap();
        assert_eq!(controller.phase(), RefreshPhase::Idle);
        assert_eq!(
            controller.set_interval(Duration::ZERO),
            Err(RefreshError::InvalidInterval)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_discards_in_flight_refresh() {
        let (controller, _fetcher, sink) = setup(Duration::from_secs(2), Mode::AllOk);

        let (result, _) = tokio::join!(controller.refresh_now(), async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            controller.shutdown();
        });

        assert_eq!(result.unwrap_err(), RefreshError::Discarded);
        assert_eq!(controller.snapshot().version, 0);
        assert_eq!(sink.completes(), 0);

        assert_eq!(
            controller.start(Duration::from_secs(1)),
            Err(RefreshError::ShutDown)
        );
        assert_eq!(
            controller.refresh_now().await.unwrap_err(),
            RefreshError::ShutDown
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_timer() {
        let (controller, fetcher, _sink) = setup(Duration::from_millis(10), Mode::AllOk);

        controller.start(Duration::from_secs(1)).unwrap();
        controller.shutdown();
        assert_eq!(controller.phase(), RefreshPhase::Idle);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_rejected_batch_notifies_error_once() {
        let fetcher = ScriptedFetcher::new(Duration::ZERO, Mode::Reject);
        let mut sink = MockRefreshSink::new();
        sink.expect_on_refresh_complete().never();
        sink.expect_on_refresh_error()
            .withf(|message: &str| message == "batch failed: unknown request type: bogus")
            .times(1)
            .return_const(());

        let controller = RefreshController::new(fetcher, Arc::new(sink), &config(5_000)).unwrap();
        let err = controller.refresh_now().await.unwrap_err();

        assert!(matches!(err, RefreshError::BatchFailed(_)));
        assert!(controller.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_successful_refresh_notifies_complete_once() {
        let fetcher = ScriptedFetcher::new(Duration::ZERO, Mode::AllOk);
        let mut sink = MockRefreshSink::new();
        sink.expect_on_refresh_complete()
            .withf(|snapshot: &CacheSnapshot| snapshot.version == 1)
            .times(1)
            .return_const(());
        sink.expect_on_refresh_error().never();

        let controller = RefreshController::new(fetcher, Arc::new(sink), &config(5_000)).unwrap();
        let snapshot = controller.refresh_now().await.unwrap();

        assert_eq!(snapshot.version, 1);
        assert!(controller.last_update().is_some());
    }

    #[test]
    fn test_evaluate_empty_batch_is_ok() {
        assert!(evaluate(BatchResult::completed(Vec::new())).is_ok());
    }
}
