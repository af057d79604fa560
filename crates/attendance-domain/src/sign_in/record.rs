use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::session::Session;
use crate::shared::DomainError;

/// Persisted proof that a session's attendance was registered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInRecord {
    pub session: Session,
    #[serde(rename = "timestamp")]
    pub signed_in_at: DateTime<Utc>,
}

impl SignInRecord {
    pub fn new(session: Session, signed_in_at: DateTime<Local>) -> Self {
        Self {
            session,
            signed_in_at: signed_in_at.with_timezone(&Utc),
        }
    }
}

/// How a sign-in is keyed in the store, and therefore how long the
/// "already signed in" fact lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignInScope {
    /// Keyed by session label alone; a window can be signed once until reset
    #[default]
    Lifetime,
    /// Keyed by local calendar date and session label; resets every day
    Daily,
}

impl SignInScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignInScope::Lifetime => "lifetime",
            SignInScope::Daily => "daily",
        }
    }

    pub fn key_for(&self, session: Session, at: &DateTime<Local>) -> SignInKey {
        match self {
            SignInScope::Lifetime => SignInKey(session.as_str().to_string()),
            SignInScope::Daily => SignInKey(format!(
                "{}:{}",
                at.date_naive().format("%Y-%m-%d"),
                session.as_str()
            )),
        }
    }
}

impl fmt::Display for SignInScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignInScope {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lifetime" => Ok(SignInScope::Lifetime),
            "daily" => Ok(SignInScope::Daily),
            _ => Err(DomainError::InvalidInput(format!(
                "Unknown sign-in scope: {s}"
            ))),
        }
    }
}

/// Primary key of the sign-in table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignInKey(String);

impl SignInKey {
    pub fn from_string(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignInKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
