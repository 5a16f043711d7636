//! Shared dispatch state and the admission decision.
//!
//! Every mutation of the signal store, the rate limiter and the in-flight
//! guard happens under the one mutex in [`DispatchGate`]. The lock is only
//! ever held for short synchronous sections, never across an await.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::trace;

use super::config::{SourceSettings, MIN_WIFI_OBSERVATIONS};
use super::guard::InFlightGuard;
use super::rate_limit::RateLimiter;
use crate::signal::{CellObservation, SignalSnapshot, SignalStore, WifiObservation};

/// Arbiter state machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No dispatch in flight.
    Idle,
    /// A dispatch has been admitted and has not finished.
    Dispatching,
}

/// Result of a trigger or an observation update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A dispatch was admitted and handed to the worker.
    Dispatched,
    /// The arbiter is not started.
    NotRunning,
    /// A dispatch is already in flight; the trigger was dropped.
    InFlight,
    /// The minimum interval since the last dispatch has not elapsed.
    RateLimited,
    /// Too few observations to resolve a position.
    Ineligible,
    /// The update was for a source disabled in the current configuration.
    SourceDisabled,
    /// The worker went away before it could accept the job.
    WorkerUnavailable,
}

/// Whether a snapshot carries enough signal for a lookup.
///
/// Any cell is enough; Wi-Fi alone needs at least two access points.
pub fn is_eligible(snapshot: &SignalSnapshot) -> bool {
    snapshot.cell_count() > 0 || snapshot.wifi_count() >= MIN_WIFI_OBSERVATIONS
}

/// A unit of work for the lookup worker.
pub(super) struct DispatchJob {
    pub(super) snapshot: SignalSnapshot,
    pub(super) ticket: DispatchTicket,
}

/// Proof of admission for one dispatch.
///
/// Dropping the ticket ends the dispatch: the guard is cleared, the limiter
/// stamped and the phase returns to idle. This runs on every exit path,
/// including a job that is never accepted by the worker or a panic.
pub(super) struct DispatchTicket {
    gate: Arc<DispatchGate>,
}

impl Drop for DispatchTicket {
    fn drop(&mut self) {
        self.gate.complete(Instant::now());
    }
}

struct GateState {
    store: SignalStore,
    limiter: RateLimiter,
    guard: InFlightGuard,
    sources: SourceSettings,
    jobs: Option<mpsc::Sender<DispatchJob>>,
}

pub(super) struct DispatchGate {
    state: Mutex<GateState>,
    phase: watch::Sender<Phase>,
    min_interval: Duration,
}

impl DispatchGate {
    pub(super) fn new(min_interval: Duration, sources: SourceSettings) -> Self {
        let (phase, _) = watch::channel(Phase::Idle);
        Self {
            state: Mutex::new(GateState {
                store: SignalStore::new(),
                limiter: RateLimiter::new(),
                guard: InFlightGuard::new(),
                sources,
                jobs: None,
            }),
            phase,
            min_interval,
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Connect a worker. Jobs are only admitted while one is attached.
    pub(super) fn attach(&self, jobs: mpsc::Sender<DispatchJob>) {
        self.lock().jobs = Some(jobs);
    }

    pub(super) fn detach(&self) {
        self.lock().jobs = None;
    }

    pub(super) fn is_attached(&self) -> bool {
        self.lock().jobs.is_some()
    }

    /// Replace the Wi-Fi half. Returns false if Wi-Fi is disabled.
    pub(super) fn update_wifi(&self, observations: Vec<WifiObservation>) -> bool {
        let mut state = self.lock();
        if !state.sources.use_wifi {
            return false;
        }
        let snapshot = state.store.update_wifi(observations);
        trace!(wifis = snapshot.wifi_count(), "Wi-Fi observations updated");
        true
    }

    /// Replace the cell half. Returns false if cells are disabled.
    pub(super) fn update_cells(&self, observations: Vec<CellObservation>) -> bool {
        let mut state = self.lock();
        if !state.sources.use_cells {
            return false;
        }
        let snapshot = state.store.update_cells(observations);
        trace!(cells = snapshot.cell_count(), "Cell observations updated");
        true
    }

    pub(super) fn set_sources(&self, sources: SourceSettings) {
        let mut state = self.lock();
        if !sources.use_wifi {
            state.store.clear_wifi();
        }
        if !sources.use_cells {
            state.store.clear_cells();
        }
        state.sources = sources;
    }

    pub(super) fn sources(&self) -> SourceSettings {
        self.lock().sources
    }

    pub(super) fn snapshot(&self) -> SignalSnapshot {
        self.lock().store.snapshot()
    }

    pub(super) fn last_dispatch(&self) -> Option<Instant> {
        self.lock().limiter.last_dispatch()
    }

    /// Decide whether a dispatch may start at `now`.
    ///
    /// On admission the guard is occupied, the snapshot captured and a job
    /// returned together with the worker's queue. Rejections change nothing.
    pub(super) fn admit(
        self: &Arc<Self>,
        now: Instant,
    ) -> Result<(DispatchJob, mpsc::Sender<DispatchJob>), TriggerOutcome> {
        let mut state = self.lock();

        let Some(jobs) = state.jobs.clone() else {
            return Err(TriggerOutcome::NotRunning);
        };

        if state.guard.is_occupied() {
            trace!("Dispatch in flight, trigger dropped");
            return Err(TriggerOutcome::InFlight);
        }

        if !state.limiter.permits(now, self.min_interval) {
            trace!(
                remaining_ms = state.limiter.remaining(now, self.min_interval).as_millis() as u64,
                "Trigger inside minimum interval"
            );
            return Err(TriggerOutcome::RateLimited);
        }

        let snapshot = state.store.snapshot();
        if !is_eligible(&snapshot) {
            trace!(
                wifis = snapshot.wifi_count(),
                cells = snapshot.cell_count(),
                "Not enough observations for a lookup"
            );
            return Err(TriggerOutcome::Ineligible);
        }

        let acquired = state.guard.try_acquire();
        debug_assert!(acquired, "guard checked free under the same lock");
        self.phase.send_replace(Phase::Dispatching);

        let ticket = DispatchTicket {
            gate: Arc::clone(self),
        };
        Ok((DispatchJob { snapshot, ticket }, jobs))
    }

    fn complete(&self, now: Instant) {
        let mut state = self.lock();
        state.guard.release();
        state.limiter.stamp(now);
        self.phase.send_replace(Phase::Idle);
    }

    pub(super) fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    pub(super) fn subscribe_phase(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }
}
