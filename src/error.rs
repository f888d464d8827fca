//! Session errors
//!
//! A rejected sign-in is not an error: `authenticate` returns `Ok(false)`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The session was requested from a context nobody established
    #[error("session accessed outside of a session provider")]
    NoProvider,

    #[error("no identity is signed in")]
    NotSignedIn,

    #[error("a sign-in request is still in flight")]
    Busy,

    #[error("please enter a valid email address")]
    InvalidEmail,

    #[error("session store error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("session snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
