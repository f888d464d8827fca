//! Session manager
//!
//! Owns the signed-in identity and keeps it mirrored in the session store.
//!
//! - Restores the snapshot on construction; a malformed one is discarded
//! - Sign-in and sign-up wait out a simulated round trip, with the busy flag raised
//! - Sign-out is immediate and idempotent
//!
//! Identity updates are last-write-wins when sign-in calls overlap.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::directory::{looks_like_email, Authenticator};
use crate::error::{Result, SessionError};
use crate::identity::{Identity, SignupRequest};
use crate::storage::SessionStore;

pub const DEFAULT_STORAGE_KEY: &str = "bugBountyUser";
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(1000);
pub const DEFAULT_RESET_LATENCY: Duration = Duration::from_millis(2000);

/// Tunables for a session manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Key the identity snapshot lives under
    pub storage_key: String,
    /// Simulated round trip for sign-in and sign-up
    pub latency: Duration,
    /// Simulated round trip for password reset requests
    pub reset_latency: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            latency: DEFAULT_LATENCY,
            reset_latency: DEFAULT_RESET_LATENCY,
        }
    }
}

/// What consumers observe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    identity: Option<Identity>,
    in_flight: usize,
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }
}

pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    authenticator: Arc<dyn Authenticator>,
    settings: SessionSettings,
    state: watch::Sender<SessionState>,
}

/// Lowers the busy flag when an operation finishes, however it finishes.
struct BusyGuard<'a> {
    state: &'a watch::Sender<SessionState>,
}

impl<'a> BusyGuard<'a> {
    fn raise(state: &'a watch::Sender<SessionState>) -> Self {
        state.send_modify(|s| s.in_flight += 1);
        Self { state }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.state
            .send_modify(|s| s.in_flight = s.in_flight.saturating_sub(1));
    }
}

impl SessionManager {
    /// Build a manager and restore any persisted identity.
    ///
    /// The manager is only handed out once the restore has finished, so
    /// nobody observes a half-initialized session.
    pub fn restore(
        store: Arc<dyn SessionStore>,
        authenticator: Arc<dyn Authenticator>,
        settings: SessionSettings,
    ) -> Result<Self> {
        let identity = load_snapshot(store.as_ref(), &settings.storage_key)?;
        match &identity {
            Some(identity) => info!("Restored session for {}", identity.email),
            None => debug!("No persisted session under '{}'", settings.storage_key),
        }

        let (state, _) = watch::channel(SessionState {
            identity,
            in_flight: 0,
        });

        Ok(Self {
            store,
            authenticator,
            settings,
            state,
        })
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn current(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().is_busy()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that sees every identity and busy-flag change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Sign in with email and password.
    ///
    /// Returns `Ok(false)` for unknown emails and wrong passwords; the
    /// current identity is left untouched in that case.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<bool> {
        let _busy = BusyGuard::raise(&self.state);
        debug!("Signing in {}", email);

        tokio::time::sleep(self.settings.latency).await;

        let Some(identity) = self.authenticator.verify(email, password).await else {
            info!("Sign-in rejected for {}", email);
            return Ok(false);
        };

        self.establish(identity)?;
        Ok(true)
    }

    /// Create an account and sign it in. Always succeeds unless the store fails.
    pub async fn register(&self, request: &SignupRequest) -> Result<bool> {
        let _busy = BusyGuard::raise(&self.state);
        debug!("Signing up {} as {}", request.email, request.role);

        tokio::time::sleep(self.settings.latency).await;

        let identity = self.authenticator.enroll(request).await;
        self.establish(identity)?;
        Ok(true)
    }

    /// Sign out. Safe to call with nobody signed in.
    pub fn end_session(&self) -> Result<()> {
        self.store.remove(&self.settings.storage_key)?;

        let mut previous = None;
        self.state.send_if_modified(|s| {
            previous = s.identity.take();
            previous.is_some()
        });

        if let Some(identity) = previous {
            info!("Signed out {}", identity.email);
        }
        Ok(())
    }

    /// Identity for pages that need a signed-in user
    pub fn require_identity(&self) -> Result<Identity> {
        let state = self.state.borrow();
        if state.is_busy() {
            return Err(SessionError::Busy);
        }
        state.identity.clone().ok_or(SessionError::NotSignedIn)
    }

    /// Ask for a password reset link. Nothing is sent; only the address is checked.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        tokio::time::sleep(self.settings.reset_latency).await;

        if !looks_like_email(email) {
            return Err(SessionError::InvalidEmail);
        }

        info!("Password reset requested for {}", email);
        Ok(())
    }

    fn establish(&self, identity: Identity) -> Result<()> {
        let snapshot = serde_json::to_string(&identity)?;
        self.store.set(&self.settings.storage_key, &snapshot)?;

        info!("Signed in {} ({})", identity.email, identity.role());
        self.state.send_modify(|s| s.identity = Some(identity));
        Ok(())
    }
}

/// Read the persisted identity. Unparseable or inconsistent snapshots are
/// dropped from the store and treated as no session.
fn load_snapshot(store: &dyn SessionStore, key: &str) -> Result<Option<Identity>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    match serde_json::from_str::<Identity>(&raw) {
        Ok(identity) if identity.is_consistent() => Ok(Some(identity)),
        Ok(identity) => {
            warn!(
                "Discarding session snapshot for {}: fields do not match role {}",
                identity.email,
                identity.role()
            );
            store.remove(key)?;
            Ok(None)
        }
        Err(e) => {
            warn!("Discarding malformed session snapshot: {}", e);
            store.remove(key)?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{MockDirectory, SHARED_PASSWORD};
    use crate::identity::Role;
    use crate::storage::MemoryStore;
    use std::sync::atomic::{AtomicBool, Ordering};

    const HACKER_EMAIL: &str = "hacker@example.com";
    const COMPANY_EMAIL: &str = "security@techcorp.com";

    /// Memory store whose writes can be switched to fail
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_set: AtomicBool,
        fail_remove: AtomicBool,
    }

    impl SessionStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            if self.fail_set.load(Ordering::SeqCst) {
                return Err(SessionError::Storage(rusqlite::Error::QueryReturnedNoRows));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            if self.fail_remove.load(Ordering::SeqCst) {
                return Err(SessionError::Storage(rusqlite::Error::QueryReturnedNoRows));
            }
            self.inner.remove(key)
        }
    }

    fn manager_over(store: Arc<FlakyStore>) -> SessionManager {
        SessionManager::restore(store, Arc::new(MockDirectory::new()), instant_settings()).unwrap()
    }

    fn instant_settings() -> SessionSettings {
        SessionSettings {
            latency: Duration::ZERO,
            reset_latency: Duration::ZERO,
            ..SessionSettings::default()
        }
    }

    fn manager_with(store: Arc<MemoryStore>, settings: SessionSettings) -> SessionManager {
        SessionManager::restore(store, Arc::new(MockDirectory::new()), settings).unwrap()
    }

    fn snapshot(store: &MemoryStore) -> Option<Identity> {
        store
            .get(DEFAULT_STORAGE_KEY)
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    #[tokio::test]
    async fn test_restore_without_snapshot() {
        let manager = manager_with(Arc::new(MemoryStore::new()), instant_settings());
        assert!(manager.current().is_none());
        assert!(!manager.is_busy());
    }

    #[tokio::test]
    async fn test_restore_with_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let identity = Identity::company("7", "Acme", "a@acme.com", Some("Acme Inc".into()));
        store
            .set(DEFAULT_STORAGE_KEY, &serde_json::to_string(&identity).unwrap())
            .unwrap();

        let manager = manager_with(store, instant_settings());
        assert_eq!(manager.current(), Some(identity));
        assert!(!manager.is_busy());
    }

    #[tokio::test]
    async fn test_restore_discards_malformed_snapshot() {
        let store = Arc::new(MemoryStore::new());
        store.set(DEFAULT_STORAGE_KEY, "{not json").unwrap();

        let manager = manager_with(store.clone(), instant_settings());
        assert!(manager.current().is_none());
        assert_eq!(store.get(DEFAULT_STORAGE_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_discards_inconsistent_snapshot() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                DEFAULT_STORAGE_KEY,
                r#"{"id":"1","username":"x","email":"x@x.com","role":"hacker","companyName":"Acme"}"#,
            )
            .unwrap();

        let manager = manager_with(store.clone(), instant_settings());
        assert!(manager.current().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_authenticate_success_persists() {
        let store = Arc::new(MemoryStore::new());
        let manager = manager_with(store.clone(), instant_settings());

        assert!(manager.authenticate(HACKER_EMAIL, SHARED_PASSWORD).await.unwrap());

        let current = manager.current().unwrap();
        assert_eq!(current.role(), Role::Hacker);
        assert_eq!(snapshot(&store), Some(current));
        assert!(!manager.is_busy());
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password_keeps_identity() {
        let store = Arc::new(MemoryStore::new());
        let manager = manager_with(store.clone(), instant_settings());

        assert!(!manager.authenticate(HACKER_EMAIL, "wrong").await.unwrap());
        assert!(manager.current().is_none());
        assert!(store.is_empty());
        assert!(!manager.is_busy());

        assert!(manager
            .authenticate("security@techcorp.com", SHARED_PASSWORD)
            .await
            .unwrap());
        let before = manager.current();

        assert!(!manager
            .authenticate("unknown@example.com", SHARED_PASSWORD)
            .await
            .unwrap());
        assert_eq!(manager.current(), before);
        assert_eq!(snapshot(&store), before);
    }

    #[tokio::test]
    async fn test_register_hacker() {
        let store = Arc::new(MemoryStore::new());
        let manager = manager_with(store.clone(), instant_settings());

        let request = SignupRequest::hacker("x", "x@x.com", "p");
        assert!(manager.register(&request).await.unwrap());

        let current = manager.current().unwrap();
        assert!(!current.id.is_empty());
        assert_eq!(current.reputation, Some(0));
        assert_eq!(current.total_bounties, Some(0));
        assert!(current.company_name.is_none());
        assert_eq!(snapshot(&store), Some(current));
        assert!(!manager.is_busy());
    }

    #[tokio::test]
    async fn test_register_company() {
        let manager = manager_with(Arc::new(MemoryStore::new()), instant_settings());

        let request = SignupRequest::company("Acme", "a@acme.com", "Acme Inc", "p");
        assert!(manager.register(&request).await.unwrap());

        let current = manager.current().unwrap();
        assert_eq!(current.company_name.as_deref(), Some("Acme Inc"));
        assert!(current.reputation.is_none());
        assert!(current.total_bounties.is_none());
    }

    #[tokio::test]
    async fn test_end_session_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let manager = manager_with(store.clone(), instant_settings());
        manager.authenticate(HACKER_EMAIL, SHARED_PASSWORD).await.unwrap();

        manager.end_session().unwrap();
        assert!(manager.current().is_none());
        assert_eq!(store.get(DEFAULT_STORAGE_KEY).unwrap(), None);

        manager.end_session().unwrap();
        assert!(manager.current().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_while_in_flight() {
        let manager = Arc::new(manager_with(
            Arc::new(MemoryStore::new()),
            SessionSettings::default(),
        ));
        let mut rx = manager.subscribe();

        let start = tokio::time::Instant::now();
        let task = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.authenticate(HACKER_EMAIL, SHARED_PASSWORD).await })
        };

        rx.wait_for(|s| s.is_busy()).await.unwrap();
        assert!(manager.is_busy());
        assert!(matches!(manager.require_identity(), Err(SessionError::Busy)));

        assert!(task.await.unwrap().unwrap());
        assert!(start.elapsed() >= DEFAULT_LATENCY);
        assert!(!manager.is_busy());
        assert_eq!(manager.require_identity().unwrap().email, HACKER_EMAIL);
    }

    #[tokio::test]
    async fn test_subscribers_see_sign_in_and_out() {
        let manager = manager_with(Arc::new(MemoryStore::new()), instant_settings());
        let rx = manager.subscribe();

        manager.authenticate(HACKER_EMAIL, SHARED_PASSWORD).await.unwrap();
        assert_eq!(
            rx.borrow().identity().map(|i| i.email.clone()),
            Some(HACKER_EMAIL.to_string())
        );

        manager.end_session().unwrap();
        assert!(rx.borrow().identity().is_none());
        assert!(!rx.borrow().is_busy());
    }

    #[tokio::test]
    async fn test_require_identity_when_signed_out() {
        let manager = manager_with(Arc::new(MemoryStore::new()), instant_settings());
        assert!(matches!(
            manager.require_identity(),
            Err(SessionError::NotSignedIn)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_password_reset() {
        let manager = manager_with(Arc::new(MemoryStore::new()), SessionSettings::default());

        let start = tokio::time::Instant::now();
        assert!(matches!(
            manager.request_password_reset("nobody").await,
            Err(SessionError::InvalidEmail)
        ));
        assert!(start.elapsed() >= DEFAULT_RESET_LATENCY);

        assert!(matches!(manager.request_password_reset("").await, Err(SessionError::InvalidEmail)));
        manager.request_password_reset("a@b.c").await.unwrap();
        assert!(manager.current().is_none());
    }

    #[tokio::test]
    async fn test_failed_sign_out_keeps_session() {
        let store = Arc::new(FlakyStore::default());
        let manager = manager_over(store.clone());
        manager.authenticate(HACKER_EMAIL, SHARED_PASSWORD).await.unwrap();

        store.fail_remove.store(true, Ordering::SeqCst);
        assert!(matches!(manager.end_session(), Err(SessionError::Storage(_))));
        assert_eq!(
            manager.current().map(|i| i.email),
            Some(HACKER_EMAIL.to_string())
        );
        assert!(store.get(DEFAULT_STORAGE_KEY).unwrap().is_some());

        // Memory and storage agree after a restart
        let restarted = manager_over(store.clone());
        assert_eq!(restarted.current(), manager.current());

        store.fail_remove.store(false, Ordering::SeqCst);
        manager.end_session().unwrap();
        assert!(manager.current().is_none());
        assert!(store.get(DEFAULT_STORAGE_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_failure_clears_busy_and_keeps_identity() {
        let store = Arc::new(FlakyStore::default());
        let manager = manager_over(store.clone());
        store.fail_set.store(true, Ordering::SeqCst);

        assert!(matches!(
            manager.authenticate(HACKER_EMAIL, SHARED_PASSWORD).await,
            Err(SessionError::Storage(_))
        ));
        assert!(!manager.is_busy());
        assert!(manager.current().is_none());

        let request = SignupRequest::hacker("x", "x@x.com", "p");
        assert!(matches!(
            manager.register(&request).await,
            Err(SessionError::Storage(_))
        ));
        assert!(!manager.is_busy());
        assert!(manager.current().is_none());

        store.fail_set.store(false, Ordering::SeqCst);
        manager.authenticate(HACKER_EMAIL, SHARED_PASSWORD).await.unwrap();
        let before = manager.current();

        store.fail_set.store(true, Ordering::SeqCst);
        assert!(manager
            .authenticate(COMPANY_EMAIL, SHARED_PASSWORD)
            .await
            .is_err());
        assert!(!manager.is_busy());
        assert_eq!(manager.current(), before);
        assert_eq!(
            store
                .get(DEFAULT_STORAGE_KEY)
                .unwrap()
                .map(|raw| serde_json::from_str::<Identity>(&raw).unwrap()),
            before
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_sign_ins_last_write_wins() {
        let store = Arc::new(MemoryStore::new());
        let manager = Arc::new(manager_with(store.clone(), SessionSettings::default()));
        let mut rx = manager.subscribe();

        let first = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.authenticate(HACKER_EMAIL, SHARED_PASSWORD).await })
        };
        rx.wait_for(|s| s.is_busy()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(500)).await;
        let second = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.authenticate(COMPANY_EMAIL, SHARED_PASSWORD).await })
        };

        assert!(first.await.unwrap().unwrap());
        // The second call is still in flight
        assert!(manager.is_busy());
        assert_eq!(
            manager.current().map(|i| i.email),
            Some(HACKER_EMAIL.to_string())
        );

        assert!(second.await.unwrap().unwrap());
        assert!(!manager.is_busy());
        let current = manager.current().unwrap();
        assert_eq!(current.role(), Role::Company);
        assert_eq!(snapshot(&store), Some(current));
    }
}
