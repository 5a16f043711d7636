//! Request arbitration.
//!
//! The arbiter sits between signal producers and the lookup service. It
//! keeps the latest observations, decides when a lookup may run and runs it
//! off the caller's thread.
//!
//! # Dispatch lifecycle
//!
//! ```text
//! update_wifi / update_cells / trigger
//!     │
//!     ▼
//! DispatchGate::admit ── running? ── in flight? ── interval? ── eligible?
//!     │                      (any "no" drops the trigger unchanged)
//!     ▼
//! Phase::Dispatching ──► worker ──► Wi-Fi lookup ──(miss/error)──► Cell lookup
//!                                        │                              │
//!                                        └──────── Reporter ◄───────────┘
//!     ▼
//! ticket dropped: guard cleared, limiter stamped, Phase::Idle
//! ```
//!
//! The minimum interval is measured from the end of the previous dispatch,
//! so a slow lookup pushes the next one back.

mod config;
mod dispatch;
mod engine;
mod error;
mod gate;
mod guard;
mod rate_limit;
mod worker;

pub use config::{ArbiterConfig, SourceSettings, DEFAULT_MIN_INTERVAL, MIN_WIFI_OBSERVATIONS};
pub use dispatch::DispatchOutcome;
pub use engine::Arbiter;
pub use error::ArbiterError;
pub use gate::{is_eligible, Phase, TriggerOutcome};
pub use guard::InFlightGuard;
pub use rate_limit::RateLimiter;
