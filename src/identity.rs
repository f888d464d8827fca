//! Signed-in principal
//!
//! - `Identity` snapshot (the JSON stored under the session key)
//! - `Role` of the account (hacker or company)
//! - `SignupRequest` submitted by the sign-up form

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of account. Fixed for the lifetime of an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Hacker,
    Company,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Hacker => "hacker",
            Role::Company => "company",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hacker" => Ok(Role::Hacker),
            "company" => Ok(Role::Company),
            other => Err(format!(
                "unknown role '{}' (expected 'hacker' or 'company')",
                other
            )),
        }
    }
}

/// Social handles shown on a profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

/// The signed-in principal.
///
/// `reputation` and `total_bounties` only exist for hackers, `company_name`
/// only for companies. The role has no setter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub username: String,
    pub email: String,
    role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reputation: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_bounties: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_links: Option<SocialLinks>,
}

impl Identity {
    /// New hacker account, starting with zero reputation and bounties
    pub fn hacker(
        id: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: email.into(),
            role: Role::Hacker,
            avatar: None,
            bio: None,
            reputation: Some(0),
            total_bounties: Some(0),
            company_name: None,
            social_links: None,
        }
    }

    /// New company account
    pub fn company(
        id: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
        company_name: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: email.into(),
            role: Role::Company,
            avatar: None,
            bio: None,
            reputation: None,
            total_bounties: None,
            company_name,
            social_links: None,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    pub fn with_social_links(mut self, links: SocialLinks) -> Self {
        self.social_links = Some(links);
        self
    }

    /// Set hacker standing. Ignored for companies.
    pub fn with_standing(mut self, reputation: u32, total_bounties: u64) -> Self {
        if self.role == Role::Hacker {
            self.reputation = Some(reputation);
            self.total_bounties = Some(total_bounties);
        }
        self
    }

    /// Whether the role-specific fields match the role.
    ///
    /// Snapshots read back from storage are not trusted to hold this.
    pub fn is_consistent(&self) -> bool {
        match self.role {
            Role::Hacker => self.company_name.is_none(),
            Role::Company => self.reputation.is_none() && self.total_bounties.is_none(),
        }
    }

    /// One-line summary for the dashboard header: points for hackers,
    /// company name for companies.
    pub fn standing(&self) -> String {
        match self.role {
            Role::Hacker => format!("{} pts", self.reputation.unwrap_or(0)),
            Role::Company => self.company_name.clone().unwrap_or_default(),
        }
    }
}

/// Sign-up form submission
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub company_name: Option<String>,
    pub password: String,
}

impl SignupRequest {
    pub fn hacker(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            role: Role::Hacker,
            company_name: None,
            password: password.into(),
        }
    }

    pub fn company(
        username: impl Into<String>,
        email: impl Into<String>,
        company_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            role: Role::Company,
            company_name: Some(company_name.into()),
            password: password.into(),
        }
    }
}

// Keeps the password out of logs.
impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("company_name", &self.company_name)
            .field("password", &"<redacted>")
            .finish()
    }
}
