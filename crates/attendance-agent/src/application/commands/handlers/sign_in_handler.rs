use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::application::commands::command_handler::CommandHandler;
use crate::application::commands::sign_in_commands::{SignInCommand, SignInCommandResult};
use attendance_domain::clock::Clock;
use attendance_domain::session::Session;
use attendance_domain::shared::DomainError;
use attendance_domain::sign_in::{check_window, SignInOutcome, SignInRecord, SignInScope, SignInStore};

/// Decides whether a sign-in request is accepted.
///
/// A request passes through classification, the window check and the
/// duplicate check before anything is written. Every path ends in exactly
/// one [`SignInOutcome`]; store failures are folded into
/// `PersistenceFailure` instead of being returned as errors.
///
/// The `exists` probe and the `insert` are separate suspension points, so
/// two requests for the same window can both pass the probe. The store's
/// insert-if-absent is therefore the authority: a `Conflict` from `insert`
/// is reported as a duplicate.
pub struct SignInGate {
    store: Arc<dyn SignInStore>,
    clock: Arc<dyn Clock>,
    scope: SignInScope,
}

impl SignInGate {
    pub fn new(store: Arc<dyn SignInStore>, clock: Arc<dyn Clock>, scope: SignInScope) -> Self {
        Self {
            store,
            clock,
            scope,
        }
    }

    pub fn scope(&self) -> SignInScope {
        self.scope
    }

    /// Sign in for a session named by a raw wire label.
    ///
    /// A label that names no session can never be the current window, so it
    /// is answered like any other out-of-window request, without touching
    /// the store.
    pub async fn request_sign_in_label(&self, label: &str) -> SignInCommandResult {
        match label.parse::<Session>() {
            Ok(requested) => self.request_sign_in(requested).await,
            Err(_) => {
                let current = Session::at(&self.clock.now());
                info!(requested = label, current = %current, "Sign-in rejected: unknown session");
                SignInCommandResult::rejected(SignInOutcome::OutsideWindow { current })
            }
        }
    }

    pub async fn request_sign_in(&self, requested: Session) -> SignInCommandResult {
        let now = self.clock.now();
        let current = Session::at(&now);
        debug!(
            requested = %requested,
            current = %current,
            at = %now.format("%H:%M:%S"),
            "Classified sign-in request"
        );

        if let Err(rejection) = check_window(requested, current) {
            info!(requested = %requested, current = %current, "Sign-in rejected: outside window");
            return SignInCommandResult::rejected(rejection);
        }

        let key = self.scope.key_for(current, &now);

        match self.store.exists(&key).await {
            Ok(true) => {
                info!(key = %key, "Sign-in rejected: already recorded");
                return SignInCommandResult::rejected(SignInOutcome::Duplicate { session: current });
            }
            Ok(false) => {}
            Err(e) => {
                error!(key = %key, error = %e, "Sign-in existence check failed");
                return SignInCommandResult::rejected(SignInOutcome::PersistenceFailure);
            }
        }

        let record = SignInRecord::new(current, now);
        debug!(key = %key, "Recording sign-in");

        match self.store.insert(&key, &record).await {
            Ok(()) => {
                info!(key = %key, session = %current, "Sign-in committed");
                SignInCommandResult {
                    outcome: SignInOutcome::Committed { session: current },
                    record: Some(record),
                }
            }
            Err(DomainError::Conflict(_)) => {
                info!(key = %key, "Sign-in rejected: lost insert race");
                SignInCommandResult::rejected(SignInOutcome::Duplicate { session: current })
            }
            Err(e) => {
                error!(key = %key, error = %e, "Sign-in write failed");
                SignInCommandResult::rejected(SignInOutcome::PersistenceFailure)
            }
        }
    }
}

#[async_trait]
impl CommandHandler<SignInCommand> for SignInGate {
    type Result = SignInCommandResult;

    async fn handle(&self, cmd: SignInCommand) -> Result<Self::Result, DomainError> {
        Ok(self.request_sign_in(cmd.session).await)
    }
}
