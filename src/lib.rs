//! Bounty Session - Sign-in lifecycle for the bug bounty marketplace client
//!
//! Owns the signed-in account (a hacker or a company), keeps it in a durable
//! key/value store across restarts, and exposes the busy flag pages use
//! while a sign-in is in flight.
//!
//! # How it works
//!
//! 1. A `SessionContext` is established once, restoring any persisted identity
//! 2. Pages ask the context for the `SessionManager`
//! 3. Sign-in checks the demo directory after a simulated round trip
//! 4. Sign-up always mints a fresh account with role defaults
//! 5. Sign-out clears the identity and the stored snapshot
//!
//! # Demo accounts
//!
//! - `hacker@example.com` (hacker)
//! - `security@techcorp.com` (company)
//!
//! Both accept the password `password123`. Nothing here is real security.

pub mod config;
pub mod context;
pub mod directory;
pub mod error;
pub mod identity;
pub mod session;
pub mod storage;

pub use config::Config;
pub use context::SessionContext;
pub use directory::{Authenticator, MockDirectory, SHARED_PASSWORD};
pub use error::{Result, SessionError};
pub use identity::{Identity, Role, SignupRequest, SocialLinks};
pub use session::{SessionManager, SessionSettings, SessionState};
pub use storage::{MemoryStore, SessionStore, SqliteStore};
