//! Location estimates and the consumer-facing sink.
//!
//! The engine hands every resolved fix to a [`Reporter`]. Delivery is
//! fire-and-forget: the reporter cannot reject an estimate and the engine
//! never retries or buffers.

use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::broadcast;

use crate::lookup::SourceKind;

/// Provider label attached to every estimate produced by this engine.
pub const PROVIDER: &str = "mylnikov-geo";

/// Default capacity of the [`ChannelReporter`] broadcast channel.
pub const DEFAULT_REPORT_CAPACITY: usize = 16;

/// A resolved position fix.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationEstimate {
    /// Always [`PROVIDER`].
    pub provider: &'static str,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Accuracy radius in meters (non-negative).
    pub accuracy: f64,
    /// Which lookup produced this fix.
    pub source: SourceKind,
    /// Wall-clock time the response was parsed.
    pub resolved_at: SystemTime,
}

/// Sink for resolved estimates.
pub trait Reporter: Send + Sync {
    /// Forward an estimate to the consumer.
    fn report(&self, estimate: LocationEstimate);
}

impl<R: Reporter + ?Sized> Reporter for Arc<R> {
    fn report(&self, estimate: LocationEstimate) {
        (**self).report(estimate);
    }
}

/// Reporter that broadcasts estimates to any number of subscribers.
///
/// Estimates sent while nobody is subscribed are dropped.
#[derive(Clone)]
pub struct ChannelReporter {
    tx: broadcast::Sender<LocationEstimate>,
}

impl ChannelReporter {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPORT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to estimates reported from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LocationEstimate> {
        self.tx.subscribe()
    }
}

impl Default for ChannelReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for ChannelReporter {
    fn report(&self, estimate: LocationEstimate) {
        tracing::debug!(
            provider = estimate.provider,
            source = %estimate.source,
            latitude = estimate.latitude,
            longitude = estimate.longitude,
            accuracy = estimate.accuracy,
            "Reporting location"
        );

        if self.tx.send(estimate).is_err() {
            tracing::trace!("No location subscribers, estimate dropped");
        }
    }
}
