//! Session provider handed to consumers
//!
//! Pages receive a `SessionContext` instead of reaching for global state.
//! An unestablished context refuses to hand out a session.

use std::sync::Arc;

use crate::directory::Authenticator;
use crate::error::{Result, SessionError};
use crate::session::{SessionManager, SessionSettings};
use crate::storage::SessionStore;

#[derive(Clone, Default)]
pub struct SessionContext {
    manager: Option<Arc<SessionManager>>,
}

impl SessionContext {
    /// Context with no provider behind it
    pub fn uninitialized() -> Self {
        Self { manager: None }
    }

    pub fn establish(manager: SessionManager) -> Self {
        Self {
            manager: Some(Arc::new(manager)),
        }
    }

    /// Restore the persisted session and wrap it in a context
    pub fn provide(
        store: Arc<dyn SessionStore>,
        authenticator: Arc<dyn Authenticator>,
        settings: SessionSettings,
    ) -> Result<Self> {
        let manager = SessionManager::restore(store, authenticator, settings)?;
        Ok(Self::establish(manager))
    }

    pub fn is_established(&self) -> bool {
        self.manager.is_some()
    }

    /// The session manager, or `NoProvider` if none was established
    pub fn session(&self) -> Result<&Arc<SessionManager>> {
        self.manager.as_ref().ok_or(SessionError::NoProvider)
    }
}

impl From<Arc<SessionManager>> for SessionContext {
    fn from(manager: Arc<SessionManager>) -> Self {
        Self {
            manager: Some(manager),
        }
    }
}
