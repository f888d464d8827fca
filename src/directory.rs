//! Credential directory
//!
//! - `Authenticator` seam between the session manager and whatever checks credentials
//! - `MockDirectory` with the two demo accounts and their shared password
//! - Email sanity check used by the password reset flow

use async_trait::async_trait;
use tracing::debug;

use crate::identity::{Identity, Role, SignupRequest, SocialLinks};

/// Password accepted for every demo account
pub const SHARED_PASSWORD: &str = "password123";

/// Stock avatar for hackers created through sign-up
pub const HACKER_AVATAR: &str =
    "https://images.pexels.com/photos/220453/pexels-photo-220453.jpeg?auto=compress&cs=tinysrgb&w=150";

/// Stock avatar for companies created through sign-up
pub const COMPANY_AVATAR: &str =
    "https://images.pexels.com/photos/3184464/pexels-photo-3184464.jpeg?auto=compress&cs=tinysrgb&w=150";

/// Checks credentials and mints new accounts.
///
/// The session manager owns latency and busy tracking, so implementations
/// only answer the question.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Identity for the credentials, or `None` if they do not match
    async fn verify(&self, email: &str, password: &str) -> Option<Identity>;

    /// Create an account for the sign-up request
    async fn enroll(&self, request: &SignupRequest) -> Identity;
}

/// Fixed in-memory directory of demo accounts
#[derive(Debug, Clone)]
pub struct MockDirectory {
    identities: Vec<Identity>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self {
            identities: seed_identities(),
        }
    }

    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }
}

impl Default for MockDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Authenticator for MockDirectory {
    async fn verify(&self, email: &str, password: &str) -> Option<Identity> {
        let Some(found) = self.identities.iter().find(|i| i.email == email) else {
            debug!("No demo account for {}", email);
            return None;
        };

        if password != SHARED_PASSWORD {
            debug!("Password mismatch for {}", email);
            return None;
        }

        Some(found.clone())
    }

    async fn enroll(&self, request: &SignupRequest) -> Identity {
        let id = generate_identity_id();
        match request.role {
            Role::Hacker => Identity::hacker(id, &request.username, &request.email)
                .with_avatar(HACKER_AVATAR),
            Role::Company => Identity::company(
                id,
                &request.username,
                &request.email,
                request.company_name.clone(),
            )
            .with_avatar(COMPANY_AVATAR),
        }
    }
}

/// The two demo accounts: one hacker, one company
pub fn seed_identities() -> Vec<Identity> {
    vec![
        Identity::hacker("1", "hackmaster", "hacker@example.com")
            .with_avatar("https://images.pexels.com/photos/2379004/pexels-photo-2379004.jpeg?auto=compress&cs=tinysrgb&w=150")
            .with_bio("Ethical hacker with 5+ years of experience in web security")
            .with_standing(2850, 125000)
            .with_social_links(SocialLinks {
                twitter: Some("@hackmaster".to_string()),
                github: Some("hackmaster".to_string()),
                linkedin: None,
            }),
        Identity::company(
            "2",
            "TechCorp",
            "security@techcorp.com",
            Some("TechCorp Solutions".to_string()),
        )
        .with_avatar("https://images.pexels.com/photos/3184291/pexels-photo-3184291.jpeg?auto=compress&cs=tinysrgb&w=150"),
    ]
}

/// Millisecond timestamp, rendered in decimal
pub fn generate_identity_id() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

/// Minimal address check: non-empty and contains '@'
pub fn looks_like_email(email: &str) -> bool {
    !email.is_empty() && email.contains('@')
}
