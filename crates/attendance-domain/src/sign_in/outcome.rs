use serde::{Deserialize, Serialize};

use crate::session::Session;

pub const PERSISTENCE_FAILURE_MESSAGE: &str = "Sign-in could not be recorded. Please try again.";

/// The single answer delivered for a sign-in request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub success: bool,
    pub message: String,
}

impl Reply {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Terminal state of one pass through the sign-in gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInOutcome {
    Committed { session: Session },
    /// Requested window opens later today
    FutureSession { requested: Session },
    /// Requested window is not the active one and is not in the future
    OutsideWindow { current: Session },
    Duplicate { session: Session },
    PersistenceFailure,
}

impl SignInOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SignInOutcome::Committed { .. })
    }

    pub fn reply(&self) -> Reply {
        match self {
            SignInOutcome::Committed { session } => Reply::success(format!(
                "Successfully signed in for the {session} session."
            )),
            SignInOutcome::FutureSession { requested } => Reply::failure(format!(
                "You can't sign in for a future session. Please wait until the {requested} session."
            )),
            SignInOutcome::OutsideWindow { current } => Reply::failure(format!(
                "You can only sign in for the {current} session at this time."
            )),
            SignInOutcome::Duplicate { session } => Reply::failure(format!(
                "You have already signed in for the {session} session."
            )),
            SignInOutcome::PersistenceFailure => Reply::failure(PERSISTENCE_FAILURE_MESSAGE),
        }
    }
}

impl From<SignInOutcome> for Reply {
    fn from(outcome: SignInOutcome) -> Self {
        outcome.reply()
    }
}

/// Temporal eligibility: a request is only valid for the active window
pub fn check_window(requested: Session, current: Session) -> Result<(), SignInOutcome> {
    if requested == current {
        Ok(())
    } else if requested.is_later_than(current) {
        Err(SignInOutcome::FutureSession { requested })
    } else {
        Err(SignInOutcome::OutsideWindow { current })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_window_is_eligible() {
        for session in Session::ALL {
            assert!(check_window(session, session).is_ok());
        }
    }

    #[test]
    fn test_later_window_is_future() {
        let outcome = check_window(Session::Night, Session::Morning).unwrap_err();
        assert_eq!(
            outcome.reply().message,
            "You can't sign in for a future session. Please wait until the night session."
        );
    }

    #[test]
    fn test_earlier_window_names_current() {
        let outcome = check_window(Session::Morning, Session::Night).unwrap_err();
        assert_eq!(
            outcome,
            SignInOutcome::OutsideWindow {
                current: Session::Night
            }
        );
        assert_eq!(
            outcome.reply().message,
            "You can only sign in for the night session at this time."
        );
    }

    #[test]
    fn test_only_committed_is_success() {
        let committed = SignInOutcome::Committed {
            session: Session::Afternoon,
        };
        assert!(committed.is_success());
        assert_eq!(
            Reply::from(committed),
            Reply::success("Successfully signed in for the afternoon session.")
        );

        let duplicate = SignInOutcome::Duplicate {
            session: Session::Afternoon,
        };
        assert!(!duplicate.is_success());
        assert_eq!(
            duplicate.reply().message,
            "You have already signed in for the afternoon session."
        );
        assert!(!SignInOutcome::PersistenceFailure.reply().success);
    }
}
