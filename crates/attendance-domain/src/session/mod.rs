use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::DomainError;

#[cfg(test)]
mod session_test;

/// First hour of the afternoon window
pub const AFTERNOON_STARTS_AT: u32 = 12;
/// First hour of the night window
pub const NIGHT_STARTS_AT: u32 = 18;

/// One of the three fixed daily attendance windows.
///
/// Variants are declared in day order so the derived `Ord` reads
/// `Morning < Afternoon < Night`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Session {
    Morning,
    Afternoon,
    Night,
}

impl Session {
    pub const ALL: [Session; 3] = [Session::Morning, Session::Afternoon, Session::Night];

    pub fn as_str(&self) -> &'static str {
        match self {
            Session::Morning => "morning",
            Session::Afternoon => "afternoon",
            Session::Night => "night",
        }
    }

    /// Session active at the given local wall-clock time
    pub fn at<T: Timelike>(time: &T) -> Self {
        classify_hour(time.hour())
    }

    /// Whether this window opens later in the day than `other`
    pub fn is_later_than(&self, other: Session) -> bool {
        *self > other
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Session {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "morning" => Ok(Session::Morning),
            "afternoon" => Ok(Session::Afternoon),
            "night" => Ok(Session::Night),
            _ => Err(DomainError::InvalidInput(format!("Unknown session: {s}"))),
        }
    }
}

/// Map a local hour-of-day to its attendance window.
///
/// Boundary hours belong to the window that starts at them. Hours past 23
/// are treated as night.
pub fn classify_hour(hour: u32) -> Session {
    if hour < AFTERNOON_STARTS_AT {
        Session::Morning
    } else if hour < NIGHT_STARTS_AT {
        Session::Afternoon
    } else {
        Session::Night
    }
}
