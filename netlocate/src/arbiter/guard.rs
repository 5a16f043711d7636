//! Single-flight admission token.

/// Occupied while a dispatch is in flight.
///
/// Set when a dispatch is admitted and cleared when its
/// [`DispatchTicket`](super::gate::DispatchTicket) is dropped. Anything that
/// finds it occupied is turned away; there is no queue.
#[derive(Debug, Default)]
pub struct InFlightGuard {
    occupied: bool,
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Occupy the guard. Returns false if it was already occupied.
    pub fn try_acquire(&mut self) -> bool {
        if self.occupied {
            return false;
        }
        self.occupied = true;
        true
    }

    pub fn release(&mut self) {
        self.occupied = false;
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied
    }
}
