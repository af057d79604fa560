use attendance_domain::session::Session;
use attendance_domain::sign_in::{Reply, SignInOutcome, SignInRecord};

/// Ask to register attendance for `session`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignInCommand {
    pub session: Session,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInCommandResult {
    pub outcome: SignInOutcome,
    /// Set only when the outcome is `Committed`
    pub record: Option<SignInRecord>,
}

impl SignInCommandResult {
    pub fn rejected(outcome: SignInOutcome) -> Self {
        Self {
            outcome,
            record: None,
        }
    }

    pub fn reply(&self) -> Reply {
        self.outcome.reply()
    }
}
