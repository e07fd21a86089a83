//! Refresh lifecycle for one owner-scoped session
//!
//! Timer ticks and change notifications both funnel into
//! [`SyncHandle::request_refresh`]. At most one fetch is in flight; a
//! request that arrives while fetching is remembered and served by a single
//! follow-up fetch once the current one resolves. Shutdown bumps the session
//! epoch, so any result still in flight is dropped on arrival.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::source::{FetchError, TransactionSource};
use crate::error::{ReportError, ReportResult};
use crate::models::RawTransaction;
use crate::reports::{ReportEngine, ReportSnapshot, SessionContext};

/// What asked for a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshCause {
    Timer,
    DataChanged,
    Manual,
}

/// What happened to a refresh request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A fetch was started
    Started,
    /// A fetch is in flight; one follow-up is queued
    Coalesced,
    /// The session has been shut down
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPhase {
    #[default]
    Idle,
    Fetching,
}

/// Observable state of a session
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub phase: SyncPhase,
    /// The last fetch failed; the data shown is from an earlier fetch
    pub stale: bool,
    pub last_error: Option<String>,
    /// Session generation; bumped on shutdown
    pub epoch: u64,
    /// Fetches that resolved, successfully or not
    pub completed_fetches: u64,
    pub last_refreshed: Option<DateTime<Utc>>,
    pub closed: bool,
}

#[derive(Debug, Default)]
struct RefreshState {
    in_flight: bool,
    pending: Option<RefreshCause>,
    epoch: u64,
    closed: bool,
}

struct Shared {
    context: Arc<SessionContext>,
    source: Arc<dyn TransactionSource>,
    state: Mutex<RefreshState>,
    snapshots: watch::Sender<Arc<ReportSnapshot>>,
    status: watch::Sender<SyncStatus>,
    runtime: Handle,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn request_refresh(self: &Arc<Self>, cause: RefreshCause) -> RefreshOutcome {
        let mut state = self.lock();
        if state.closed {
            return RefreshOutcome::Closed;
        }
        if state.in_flight {
            debug!(?cause, "refresh coalesced into follow-up fetch");
            state.pending = Some(cause);
            return RefreshOutcome::Coalesced;
        }

        state.in_flight = true;
        self.status.send_modify(|s| s.phase = SyncPhase::Fetching);
        self.start_fetch(state.epoch, cause);
        RefreshOutcome::Started
    }

    fn start_fetch(self: &Arc<Self>, epoch: u64, cause: RefreshCause) {
        let shared = Arc::clone(self);
        self.runtime.spawn(async move {
            debug!(?cause, epoch, "fetching transactions");
            let source = Arc::clone(&shared.source);
            let owner = shared.context.owner_key().to_string();

            // A panicking source must still resolve the in-flight slot
            let fetch = shared
                .runtime
                .spawn(async move { source.fetch_transactions(&owner).await });
            let result = match fetch.await {
                Ok(result) => result,
                Err(err) if err.is_panic() => Err(FetchError::new("fetch task panicked")),
                Err(_) => Err(FetchError::new("fetch task was cancelled")),
            };
            shared.finish_fetch(epoch, result);
        });
    }

    fn finish_fetch(self: &Arc<Self>, epoch: u64, result: Result<Vec<RawTransaction>, FetchError>) {
        let mut state = self.lock();
        if state.closed || state.epoch != epoch {
            warn!(epoch, current = state.epoch, "discarding fetch result from a closed session");
            return;
        }

        let follow_up = state.pending.take();
        let completed = self.status.borrow().completed_fetches + 1;

        match result {
            Ok(raw) => {
                let snapshot = ReportSnapshot::build(&self.context, &raw, completed);
                info!(
                    records = snapshot.transactions.len(),
                    excluded = snapshot.excluded_foreign,
                    fetch = completed,
                    "refresh complete"
                );
                let refreshed_at = snapshot.refreshed_at;
                self.snapshots.send_replace(Arc::new(snapshot));
                self.status.send_modify(|s| {
                    s.stale = false;
                    s.last_error = None;
                    s.last_refreshed = refreshed_at;
                });
            }
            Err(err) => {
                warn!(error = %err, fetch = completed, "fetch failed; keeping previous data");
                self.status.send_modify(|s| {
                    s.stale = true;
                    s.last_error = Some(err.to_string());
                });
            }
        }

        match follow_up {
            Some(cause) => {
                self.status.send_modify(|s| s.completed_fetches = completed);
                self.start_fetch(epoch, cause);
            }
            None => {
                state.in_flight = false;
                self.status.send_modify(|s| {
                    s.completed_fetches = completed;
                    s.phase = SyncPhase::Idle;
                });
            }
        }
    }

    /// Returns false if the session was already closed
    fn close(&self) -> bool {
        let mut state = self.lock();
        if state.closed {
            return false;
        }
        state.closed = true;
        state.epoch += 1;
        state.pending = None;
        state.in_flight = false;

        let epoch = state.epoch;
        self.status.send_modify(|s| {
            s.epoch = epoch;
            s.phase = SyncPhase::Idle;
            s.closed = true;
        });
        true
    }
}

/// Starts owner-scoped refresh sessions
pub struct SyncController;

impl SyncController {
    /// Start a session polling at the configured interval
    ///
    /// Must be called from within a tokio runtime. The first fetch starts
    /// immediately.
    pub fn spawn(
        context: SessionContext,
        source: Arc<dyn TransactionSource>,
    ) -> ReportResult<SyncHandle> {
        let interval = Duration::from_secs(context.settings.poll_interval_secs.max(1));
        Self::spawn_with_interval(context, source, interval)
    }

    /// Start a session with an explicit poll interval
    pub fn spawn_with_interval(
        context: SessionContext,
        source: Arc<dyn TransactionSource>,
        interval: Duration,
    ) -> ReportResult<SyncHandle> {
        let runtime = Handle::try_current().map_err(|e| {
            ReportError::Config(format!("sync controller needs a tokio runtime: {}", e))
        })?;

        let (snapshots, _) = watch::channel(Arc::new(ReportSnapshot::empty()));
        let (status, _) = watch::channel(SyncStatus::default());

        let shared = Arc::new(Shared {
            context: Arc::new(context),
            source,
            state: Mutex::new(RefreshState::default()),
            snapshots,
            status,
            runtime,
        });

        let timer = spawn_timer(&shared, interval);
        Ok(SyncHandle { shared, timer })
    }
}

fn spawn_timer(shared: &Arc<Shared>, period: Duration) -> JoinHandle<()> {
    let weak = Arc::downgrade(shared);
    shared.runtime.spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(shared) = weak.upgrade() else {
                break;
            };
            if shared.request_refresh(RefreshCause::Timer) == RefreshOutcome::Closed {
                break;
            }
        }
    })
}

/// Owner of a running session
///
/// Dropping the handle shuts the session down.
pub struct SyncHandle {
    shared: Arc<Shared>,
    timer: JoinHandle<()>,
}

impl SyncHandle {
    /// Single entry point for every refresh trigger
    pub fn request_refresh(&self, cause: RefreshCause) -> RefreshOutcome {
        self.shared.request_refresh(cause)
    }

    /// Signal that data changed somewhere else
    pub fn notify_changed(&self) -> RefreshOutcome {
        self.request_refresh(RefreshCause::DataChanged)
    }

    /// Cloneable notifier for external collaborators
    pub fn change_notifier(&self) -> ChangeNotifier {
        ChangeNotifier {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Engine reading the latest published snapshot
    pub fn engine(&self) -> ReportEngine {
        ReportEngine::from_watch(
            Arc::clone(&self.shared.context),
            self.shared.snapshots.subscribe(),
        )
    }

    pub fn status(&self) -> SyncStatus {
        self.shared.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.shared.status.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }

    /// Stop the timer and drop any result still in flight
    pub fn shutdown(&self) {
        if self.shared.close() {
            self.timer.abort();
            info!("sync session shut down");
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Weak handle used to signal "data changed"
///
/// Signals sent after the session is gone are rejected.
#[derive(Clone)]
pub struct ChangeNotifier {
    shared: Weak<Shared>,
}

impl ChangeNotifier {
    pub fn notify(&self) -> ReportResult<RefreshOutcome> {
        let shared = self.shared.upgrade().ok_or(ReportError::SyncStopped)?;
        match shared.request_refresh(RefreshCause::DataChanged) {
            RefreshOutcome::Closed => Err(ReportError::SyncStopped),
            outcome => Ok(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::{mpsc, Semaphore};

    /// Source that blocks every fetch until a permit is released
    struct GatedSource {
        gate: Semaphore,
        calls: AtomicUsize,
        fail: AtomicBool,
        started: mpsc::UnboundedSender<usize>,
    }

    impl GatedSource {
        fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<usize>) {
            let (started, rx) = mpsc::unbounded_channel();
            let source = Arc::new(Self {
                gate: Semaphore::new(0),
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
                started,
            });
            (source, rx)
        }

        fn release(&self) {
            self.gate.add_permits(1);
        }
    }

    #[async_trait]
    impl TransactionSource for GatedSource {
        async fn fetch_transactions(
            &self,
            _owner_email: &str,
        ) -> Result<Vec<RawTransaction>, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let _ = self.started.send(call);
            self.gate
                .acquire()
                .await
                .map_err(|e| FetchError::new(e.to_string()))?
                .forget();

            if self.fail.load(Ordering::SeqCst) {
                return Err(FetchError::new("backend unavailable"));
            }
            Ok(serde_json::from_value(json!([
                {"amount": 40, "kind": "expense", "category": "Food", "occurredAt": "2024-01-02"}
            ]))
            .unwrap())
        }
    }

    /// Source that panics on its first call and succeeds afterwards
    struct PanicOnceSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TransactionSource for PanicOnceSource {
        async fn fetch_transactions(
            &self,
            _owner_email: &str,
        ) -> Result<Vec<RawTransaction>, FetchError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("source blew up");
            }
            Ok(serde_json::from_value(json!([
                {"amount": 15, "kind": "expense", "category": "Travel", "occurredAt": "2024-03-01"}
            ]))
            .unwrap())
        }
    }

    fn context() -> SessionContext {
        SessionContext::new(Some("a@example.com".into()), Settings::default())
    }

    async fn wait_for_fetches(handle: &SyncHandle, count: u64) -> SyncStatus {
        let mut status = handle.subscribe_status();
        let seen = status
            .wait_for(|s| s.completed_fetches >= count && s.phase == SyncPhase::Idle)
            .await
            .unwrap();
        seen.clone()
    }

    #[tokio::test]
    async fn test_notifications_during_fetch_coalesce() {
        let (source, mut started) = GatedSource::new();
        let handle = SyncController::spawn(context(), source.clone()).unwrap();

        // The timer's first tick starts a fetch immediately
        assert_eq!(started.recv().await, Some(1));
        assert_eq!(handle.status().phase, SyncPhase::Fetching);

        assert_eq!(handle.notify_changed(), RefreshOutcome::Coalesced);
        assert_eq!(handle.notify_changed(), RefreshOutcome::Coalesced);

        source.release();
        assert_eq!(started.recv().await, Some(2));
        source.release();

        let status = wait_for_fetches(&handle, 2).await;
        assert_eq!(status.completed_fetches, 2);
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert!(started.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_data() {
        let (source, _started) = GatedSource::new();
        source.release();
        let handle = SyncController::spawn(context(), source.clone()).unwrap();
        let engine = handle.engine();

        wait_for_fetches(&handle, 1).await;
        assert_eq!(engine.get_category_totals()["Food"], 40.0);
        assert!(!handle.status().stale);

        source.fail.store(true, Ordering::SeqCst);
        assert_eq!(handle.request_refresh(RefreshCause::Manual), RefreshOutcome::Started);
        source.release();

        let status = wait_for_fetches(&handle, 2).await;
        assert!(status.stale);
        assert_eq!(status.last_error.as_deref(), Some("backend unavailable"));
        assert_eq!(engine.get_category_totals()["Food"], 40.0);
        assert_eq!(engine.snapshot().epoch, 1);
    }

    #[tokio::test]
    async fn test_shutdown_discards_late_result() {
        let (source, mut started) = GatedSource::new();
        let handle = SyncController::spawn(context(), source.clone()).unwrap();
        let engine = handle.engine();
        let notifier = handle.change_notifier();

        assert_eq!(started.recv().await, Some(1));
        handle.shutdown();
        assert!(handle.is_closed());
        assert_eq!(handle.notify_changed(), RefreshOutcome::Closed);
        assert!(matches!(notifier.notify(), Err(ReportError::SyncStopped)));

        source.release();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(!engine.snapshot().is_loaded());
        let status = handle.status();
        assert_eq!(status.completed_fetches, 0);
        assert_eq!(status.epoch, 1);
        assert!(status.closed);
    }

    #[tokio::test]
    async fn test_notifier_after_drop_is_rejected() {
        let (source, _started) = GatedSource::new();
        let handle = SyncController::spawn(context(), source).unwrap();
        let notifier = handle.change_notifier();
        drop(handle);

        assert!(matches!(notifier.notify(), Err(ReportError::SyncStopped)));
    }

    #[tokio::test]
    async fn test_notifier_triggers_refresh() {
        let (source, mut started) = GatedSource::new();
        source.release();
        let handle = SyncController::spawn(context(), source.clone()).unwrap();
        wait_for_fetches(&handle, 1).await;
        assert_eq!(started.recv().await, Some(1));

        let notifier = handle.change_notifier();
        assert_eq!(notifier.notify().unwrap(), RefreshOutcome::Started);
        assert_eq!(started.recv().await, Some(2));
        source.release();
        wait_for_fetches(&handle, 2).await;
    }

    #[tokio::test]
    async fn test_panicking_source_marks_stale_and_recovers() {
        let source = Arc::new(PanicOnceSource {
            calls: AtomicUsize::new(0),
        });
        let handle = SyncController::spawn(context(), source.clone()).unwrap();
        let engine = handle.engine();

        let status = wait_for_fetches(&handle, 1).await;
        assert!(status.stale);
        assert_eq!(status.last_error.as_deref(), Some("fetch task panicked"));
        assert!(!engine.snapshot().is_loaded());

        assert_eq!(handle.notify_changed(), RefreshOutcome::Started);
        let status = wait_for_fetches(&handle, 2).await;
        assert!(!status.stale);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(engine.get_category_totals()["Travel"], 15.0);
    }

    #[test]
    fn test_spawn_requires_runtime() {
        let (source, _started) = GatedSource::new();
        let result = SyncController::spawn(context(), source);
        assert!(matches!(result, Err(ReportError::Config(_))));
    }
}
