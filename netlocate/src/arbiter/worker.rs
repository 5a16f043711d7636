//! Lookup worker task.
//!
//! The worker owns the receiving end of a one-slot job queue. The admission
//! gate guarantees at most one job exists at a time, so the worker never
//! has more than one dispatch running. Each job runs in its own task so a
//! panicking dispatch is contained and the worker keeps serving.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::dispatch::{DispatchContext, DispatchOutcome};
use super::gate::DispatchJob;
use crate::lookup::AsyncHttpClient;
use crate::report::Reporter;

/// Handle to a running worker.
pub(super) struct WorkerHandle {
    pub(super) cancel: CancellationToken,
    pub(super) join: JoinHandle<()>,
}

/// Spawn the worker on the current tokio runtime.
pub(super) fn spawn<C, R>(
    context: Arc<DispatchContext<C, R>>,
    jobs: mpsc::Receiver<DispatchJob>,
) -> WorkerHandle
where
    C: AsyncHttpClient + 'static,
    R: Reporter + 'static,
{
    let cancel = CancellationToken::new();
    let join = tokio::spawn(run(context, jobs, cancel.clone()));
    WorkerHandle { cancel, join }
}

async fn run<C, R>(
    context: Arc<DispatchContext<C, R>>,
    mut jobs: mpsc::Receiver<DispatchJob>,
    cancel: CancellationToken,
) where
    C: AsyncHttpClient + 'static,
    R: Reporter + 'static,
{
    info!("Lookup worker started");

    loop {
        let job = tokio::select! {
            _ = cancel.cancelled() => break,
            job = jobs.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };

        let context = Arc::clone(&context);
        let dispatch = tokio::spawn(async move {
            let DispatchJob { snapshot, ticket } = job;
            debug!(
                wifis = snapshot.wifi_count(),
                cells = snapshot.cell_count(),
                "Dispatch started"
            );
            let outcome = context.dispatch(&snapshot).await;
            drop(ticket);
            outcome
        });

        // Not raced against cancellation: a started dispatch runs to completion.
        match dispatch.await {
            Ok(DispatchOutcome::Reported(source)) => {
                debug!(source = %source, "Dispatch finished with estimate");
            }
            Ok(DispatchOutcome::Unresolved(_)) => {
                debug!("Dispatch finished without estimate");
            }
            Err(e) if e.is_panic() => {
                error!(error = %e, "Dispatch task panicked");
            }
            Err(e) => {
                debug!(error = %e, "Dispatch task cancelled");
            }
        }
    }

    info!("Lookup worker stopped");
}
