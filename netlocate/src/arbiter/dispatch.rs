//! The lookup sequence run for one admitted dispatch.
//!
//! Wi-Fi is tried first when the snapshot has enough access points. Cell is
//! tried only when Wi-Fi was skipped or did not produce an estimate. At most
//! one estimate is reported per dispatch.

use tracing::{debug, warn};

use super::config::MIN_WIFI_OBSERVATIONS;
use crate::lookup::{resolve, AsyncHttpClient, LookupError, LookupRequest, RequestEncoder, SourceKind};
use crate::report::Reporter;
use crate::signal::SignalSnapshot;

/// Everything a dispatch needs besides the snapshot.
pub(super) struct DispatchContext<C, R> {
    pub(super) client: C,
    pub(super) reporter: R,
    pub(super) encoder: RequestEncoder,
}

/// How a dispatch ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// An estimate from this source was reported.
    Reported(SourceKind),
    /// Nothing was reported; carries the last failure, if any lookup ran.
    Unresolved(Option<LookupError>),
}

impl<C: AsyncHttpClient, R: Reporter> DispatchContext<C, R> {
    /// Run the Wi-Fi then Cell lookup sequence for a captured snapshot.
    pub(super) async fn dispatch(&self, snapshot: &SignalSnapshot) -> DispatchOutcome {
        let mut last_error = None;

        if snapshot.wifi_count() >= MIN_WIFI_OBSERVATIONS {
            if let Some(request) = self.encoder.encode_wifi(snapshot) {
                match self.attempt(&request).await {
                    Ok(()) => return DispatchOutcome::Reported(SourceKind::Wifi),
                    Err(e) => last_error = Some(e),
                }
            }
        }

        if let Some(request) = self.encoder.encode_cells(snapshot) {
            match self.attempt(&request).await {
                Ok(()) => return DispatchOutcome::Reported(SourceKind::Cell),
                Err(e) => last_error = Some(e),
            }
        }

        if let Some(e) = &last_error {
            debug!(error = %e, "No position resolved this cycle");
        }
        DispatchOutcome::Unresolved(last_error)
    }

    async fn attempt(&self, request: &LookupRequest) -> Result<(), LookupError> {
        match resolve(&self.client, request).await {
            Ok(estimate) => {
                self.reporter.report(estimate);
                Ok(())
            }
            Err(e) => {
                if e.is_miss() {
                    debug!(source = %request.source, error = %e, "Lookup missed");
                } else {
                    warn!(
                        source = %request.source,
                        payload = %request.payload,
                        error = %e,
                        "Lookup failed"
                    );
                }
                Err(e)
            }
        }
    }
}
