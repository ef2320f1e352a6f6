//! Session lifecycle over the local store.

use std::sync::Arc;

use shopfront_core::{CustomerId, Session};
use shopfront_events::{EventBus, InMemoryEventBus, SessionChanged};

use crate::local::{LocalStore, StoreError};

/// Owns session persistence plus the sign-in/out notification bus.
///
/// The acting owner is resolved here, at one edge: a stored session yields
/// that customer's id, anything else yields the guest sentinel.
#[derive(Debug)]
pub struct SessionManager {
    store: LocalStore,
    bus: Arc<InMemoryEventBus<SessionChanged>>,
}

impl SessionManager {
    pub fn new(store: LocalStore) -> Self {
        Self {
            store,
            bus: Arc::new(InMemoryEventBus::new()),
        }
    }

    /// Bus carrying sign-in/out notifications.
    pub fn bus(&self) -> Arc<InMemoryEventBus<SessionChanged>> {
        Arc::clone(&self.bus)
    }

    pub fn current(&self) -> Option<Session> {
        self.store.load_session()
    }

    /// The customer every cart and order call acts for.
    pub fn owner(&self) -> CustomerId {
        self.current()
            .map(|session| session.owner())
            .unwrap_or(CustomerId::GUEST)
    }

    /// Bearer token for authenticated calls, when signed in.
    pub fn token(&self) -> Option<String> {
        self.current().map(|session| session.token)
    }

    /// Persist a fresh session and announce the sign-in.
    pub fn sign_in(&self, session: Session) -> Result<(), StoreError> {
        let customer = session.owner();
        self.store.save_session(&session)?;
        self.bus.publish(SessionChanged::signed_in(customer));
        Ok(())
    }

    /// Drop the stored session and announce the sign-out. Signing out while
    /// already signed out still persists (and announces) the signed-out
    /// state.
    pub fn sign_out(&self) -> Result<(), StoreError> {
        self.store.clear_session()?;
        self.bus.publish(SessionChanged::signed_out());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use shopfront_core::UserProfile;
    use shopfront_events::SessionEvent;

    use super::*;

    fn manager() -> (tempfile::TempDir, SessionManager) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path().join("shopfront")).unwrap();
        (dir, SessionManager::new(store))
    }

    fn session_for(id: u64) -> Session {
        Session {
            token: format!("token-{id}"),
            profile: UserProfile {
                id: CustomerId::new(id),
                username: format!("user{id}"),
            },
        }
    }

    #[test]
    fn owner_defaults_to_guest() {
        let (_dir, manager) = manager();
        assert_eq!(manager.owner(), CustomerId::GUEST);
        assert!(manager.token().is_none());
    }

    #[test]
    fn sign_in_switches_the_owner_and_token() {
        let (_dir, manager) = manager();
        manager.sign_in(session_for(9)).unwrap();

        assert_eq!(manager.owner(), CustomerId::new(9));
        assert_eq!(manager.token(), Some("token-9".to_string()));

        manager.sign_out().unwrap();
        assert_eq!(manager.owner(), CustomerId::GUEST);
    }

    #[test]
    fn sign_in_and_out_publish_session_events() {
        let (_dir, manager) = manager();
        let events: Arc<Mutex<Vec<SessionEvent>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&events);
        let _guard = manager
            .bus()
            .subscribe(Box::new(move |change: &SessionChanged| {
                sink.lock().unwrap().push(change.event());
            }));

        manager.sign_in(session_for(3)).unwrap();
        manager.sign_out().unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                SessionEvent::SignedIn {
                    customer: CustomerId::new(3)
                },
                SessionEvent::SignedOut,
            ]
        );
    }
}
