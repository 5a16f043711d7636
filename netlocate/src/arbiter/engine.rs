//! The lookup arbiter.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use super::config::{ArbiterConfig, SourceSettings};
use super::dispatch::DispatchContext;
use super::error::ArbiterError;
use super::gate::{DispatchGate, Phase, TriggerOutcome};
use super::worker::{self, WorkerHandle};
use crate::lookup::{AsyncHttpClient, RequestEncoder};
use crate::report::Reporter;
use crate::session::Reloadable;
use crate::signal::{CellObservation, SignalSnapshot, WifiObservation};

/// Decides when observations are looked up and runs the lookups.
///
/// Producers call [`update_wifi`](Arbiter::update_wifi) and
/// [`update_cells`](Arbiter::update_cells) from any thread; each update may
/// trigger a dispatch. A dispatch is admitted only when the arbiter is
/// running, no dispatch is in flight, the minimum interval has elapsed since
/// the previous one finished, and the snapshot has at least one cell or two
/// access points. Admitted dispatches run on a worker task so triggering
/// never blocks the producer.
///
/// # Example
///
/// ```ignore
/// let reporter = ChannelReporter::new();
/// let mut fixes = reporter.subscribe();
/// let arbiter = Arbiter::new(AsyncReqwestClient::new()?, reporter, ArbiterConfig::default())?;
/// arbiter.start()?;
///
/// arbiter.update_wifi(scan_results);
/// let fix = fixes.recv().await?;
/// ```
pub struct Arbiter<C, R> {
    gate: Arc<DispatchGate>,
    context: Arc<DispatchContext<C, R>>,
    worker: Mutex<Option<WorkerHandle>>,
}

impl<C, R> Arbiter<C, R>
where
    C: AsyncHttpClient + 'static,
    R: Reporter + 'static,
{
    /// Create a stopped arbiter.
    ///
    /// # Errors
    ///
    /// Fails if a configured endpoint is not a valid URL.
    pub fn new(client: C, reporter: R, config: ArbiterConfig) -> Result<Self, ArbiterError> {
        let encoder = RequestEncoder::new(&config.endpoints)?;

        Ok(Self {
            gate: Arc::new(DispatchGate::new(config.min_interval, config.sources)),
            context: Arc::new(DispatchContext {
                client,
                reporter,
                encoder,
            }),
            worker: Mutex::new(None),
        })
    }

    fn worker_slot(&self) -> MutexGuard<'_, Option<WorkerHandle>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start the worker on the current tokio runtime and begin accepting triggers.
    ///
    /// # Errors
    ///
    /// - [`ArbiterError::AlreadyRunning`] if started twice
    /// - [`ArbiterError::NoRuntime`] if called outside a tokio runtime
    pub fn start(&self) -> Result<(), ArbiterError> {
        let mut slot = self.worker_slot();
        if slot.is_some() {
            return Err(ArbiterError::AlreadyRunning);
        }

        tokio::runtime::Handle::try_current()
            .map_err(|e| ArbiterError::NoRuntime(e.to_string()))?;

        let (tx, rx) = mpsc::channel(1);
        *slot = Some(worker::spawn(Arc::clone(&self.context), rx));
        self.gate.attach(tx);

        info!("Location arbiter started");
        Ok(())
    }

    /// Stop accepting triggers and shut the worker down.
    ///
    /// A dispatch already in flight is not cancelled; await the returned
    /// handle to wait for it. Returns `None` if the arbiter was not running.
    pub fn stop(&self) -> Option<JoinHandle<()>> {
        let handle = self.worker_slot().take()?;
        self.gate.detach();
        handle.cancel.cancel();

        info!("Location arbiter stopped");
        Some(handle.join)
    }

    pub fn is_running(&self) -> bool {
        self.gate.is_attached()
    }

    /// Replace the visible access points and trigger a lookup.
    ///
    /// Ignored when Wi-Fi is disabled.
    pub fn update_wifi<I>(&self, observations: I) -> TriggerOutcome
    where
        I: IntoIterator<Item = WifiObservation>,
    {
        if !self.gate.update_wifi(observations.into_iter().collect()) {
            trace!("Wi-Fi source disabled, update ignored");
            return TriggerOutcome::SourceDisabled;
        }
        self.trigger()
    }

    /// Replace the visible cells and trigger a lookup.
    ///
    /// Ignored when cells are disabled.
    pub fn update_cells<I>(&self, observations: I) -> TriggerOutcome
    where
        I: IntoIterator<Item = CellObservation>,
    {
        if !self.gate.update_cells(observations.into_iter().collect()) {
            trace!("Cell source disabled, update ignored");
            return TriggerOutcome::SourceDisabled;
        }
        self.trigger()
    }

    /// Try to start a dispatch for the current snapshot.
    ///
    /// Never blocks on the network. Anything other than
    /// [`TriggerOutcome::Dispatched`] leaves all state untouched.
    pub fn trigger(&self) -> TriggerOutcome {
        let (job, jobs) = match self.gate.admit(Instant::now()) {
            Ok(admitted) => admitted,
            Err(outcome) => return outcome,
        };

        match jobs.try_send(job) {
            Ok(()) => {
                debug!("Dispatch admitted");
                TriggerOutcome::Dispatched
            }
            Err(e) => {
                // Dropping the rejected job releases the guard.
                warn!(error = %e, "Lookup worker did not accept dispatch");
                TriggerOutcome::WorkerUnavailable
            }
        }
    }

    /// Apply new source toggles; takes effect on the next trigger.
    pub fn reload_configuration(&self, sources: SourceSettings) {
        self.gate.set_sources(sources);
        info!(
            use_wifi = sources.use_wifi,
            use_cells = sources.use_cells,
            "Source configuration reloaded"
        );
    }

    pub fn sources(&self) -> SourceSettings {
        self.gate.sources()
    }

    /// Current signal snapshot.
    pub fn snapshot(&self) -> SignalSnapshot {
        self.gate.snapshot()
    }

    pub fn phase(&self) -> Phase {
        self.gate.phase()
    }

    /// Watch phase transitions.
    pub fn subscribe_phase(&self) -> watch::Receiver<Phase> {
        self.gate.subscribe_phase()
    }

    /// When the last dispatch attempt finished, if any has.
    pub fn last_dispatch(&self) -> Option<Instant> {
        self.gate.last_dispatch()
    }

    /// Wait until no dispatch is in flight.
    pub async fn wait_idle(&self) {
        let mut phase = self.subscribe_phase();
        let _ = phase.wait_for(|p| *p == Phase::Idle).await;
    }

    /// The reporter estimates are delivered to.
    pub fn reporter(&self) -> &R {
        &self.context.reporter
    }
}

impl<C, R> Reloadable for Arbiter<C, R>
where
    C: AsyncHttpClient + 'static,
    R: Reporter + 'static,
{
    fn reload_configuration(&self, sources: SourceSettings) {
        Arbiter::reload_configuration(self, sources);
    }
}

impl<C, R> Drop for Arbiter<C, R> {
    fn drop(&mut self) {
        let slot = self
            .worker
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.take() {
            handle.cancel.cancel();
        }
    }
}
