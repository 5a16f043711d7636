//! Radio observations and the snapshot store.
//!
//! The platform scanning subsystem hands the engine sets of observations;
//! this module defines those values and the [`SignalStore`] that keeps the
//! latest set of each kind.
//!
//! # Components
//!
//! - [`WifiObservation`], [`CellObservation`], [`RadioType`] - immutable observation values
//! - [`SignalSnapshot`] - the latest radio environment, unique per identity
//! - [`SignalStore`] - replaces one half of the snapshot per update
//! - `asu` - optional dBm to ASU conversion, not used by lookups

mod asu;
mod store;
mod types;

pub use store::SignalStore;
pub use types::{
    CellIdentity, CellObservation, RadioType, RadioTypeParseError, SignalSnapshot,
    WifiObservation,
};
