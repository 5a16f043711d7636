//! Session registry for configuration reloads.
//!
//! A host that changes its settings while an arbiter is running needs a way
//! to reach that arbiter. The registry holds at most one active session and
//! forwards reloads to it; with no session registered a reload is a no-op.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::arbiter::SourceSettings;

/// A running component that accepts new source settings.
pub trait Reloadable: Send + Sync {
    /// Apply new source toggles. Takes effect on the next trigger.
    fn reload_configuration(&self, sources: SourceSettings);
}

/// Holds the currently active session, if any.
#[derive(Default)]
pub struct SessionRegistry {
    active: RwLock<Option<Arc<dyn Reloadable>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `session` the active session, replacing any previous one.
    pub fn register(&self, session: Arc<dyn Reloadable>) {
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        if active.is_some() {
            info!("Replacing active location session");
        } else {
            debug!("Location session registered");
        }
        *active = Some(session);
    }

    /// Remove `session` if it is the active one.
    ///
    /// Returns false when a different session (or none) is active; that
    /// session is left in place.
    pub fn unregister(&self, session: &Arc<dyn Reloadable>) -> bool {
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        match active.as_ref() {
            Some(current) if Arc::ptr_eq(current, session) => {
                *active = None;
                debug!("Location session unregistered");
                true
            }
            _ => false,
        }
    }

    /// Forward new settings to the active session.
    ///
    /// Returns false if no session is registered.
    pub fn reload_configuration(&self, sources: SourceSettings) -> bool {
        // Clone out so the reload runs without the registry lock held.
        let session = self
            .active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        match session {
            Some(session) => {
                session.reload_configuration(sources);
                true
            }
            None => {
                debug!("No active location session, reload ignored");
                false
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSession {
        reloads: Mutex<Vec<SourceSettings>>,
    }

    impl Reloadable for RecordingSession {
        fn reload_configuration(&self, sources: SourceSettings) {
            self.reloads.lock().unwrap().push(sources);
        }
    }

    #[test]
    fn test_reload_without_session_is_noop() {
        let registry = SessionRegistry::new();
        assert!(!registry.is_active());
        assert!(!registry.reload_configuration(SourceSettings::default()));
    }

    #[test]
    fn test_reload_reaches_registered_session() {
        let registry = SessionRegistry::new();
        let session = Arc::new(RecordingSession::default());
        registry.register(session.clone());

        assert!(registry.is_active());
        assert!(registry.reload_configuration(SourceSettings::new(false, true)));
        assert_eq!(
            *session.reloads.lock().unwrap(),
            vec![SourceSettings::new(false, true)]
        );
    }

    #[test]
    fn test_register_replaces_previous_session() {
        let registry = SessionRegistry::new();
        let first = Arc::new(RecordingSession::default());
        let second = Arc::new(RecordingSession::default());
        registry.register(first.clone());
        registry.register(second.clone());

        registry.reload_configuration(SourceSettings::new(true, false));

        assert!(first.reloads.lock().unwrap().is_empty());
        assert_eq!(second.reloads.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_unregister_only_removes_same_session() {
        let registry = SessionRegistry::new();
        let active: Arc<dyn Reloadable> = Arc::new(RecordingSession::default());
        let stale: Arc<dyn Reloadable> = Arc::new(RecordingSession::default());
        registry.register(Arc::clone(&active));

        assert!(!registry.unregister(&stale));
        assert!(registry.is_active());

        assert!(registry.unregister(&active));
        assert!(!registry.is_active());
        assert!(!registry.reload_configuration(SourceSettings::default()));
    }
}
