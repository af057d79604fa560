use std::sync::Arc;
use tracing::{info, warn};

use attendance_domain::ledger::AttendanceLedger;
use attendance_domain::shared::UserId;
use attendance_domain::sign_in::SignInRecord;

/// Mirrors committed local sign-ins to the remote attendance ledger.
///
/// Runs after the caller has been answered; failures are logged and never
/// reach the reply.
pub struct LedgerSyncService {
    ledger: Arc<dyn AttendanceLedger>,
    user_id: UserId,
}

impl LedgerSyncService {
    pub fn new(ledger: Arc<dyn AttendanceLedger>, user_id: UserId) -> Self {
        Self { ledger, user_id }
    }

    /// Returns whether the ledger accepted the record
    pub async fn sync(&self, record: &SignInRecord) -> bool {
        match self.ledger.record(&self.user_id, record).await {
            Ok(receipt) => {
                info!(
                    user_id = %self.user_id,
                    session = %record.session,
                    records = receipt.record_count,
                    "Sign-in mirrored to ledger: {}",
                    receipt.message
                );
                true
            }
            Err(e) => {
                warn!(
                    user_id = %self.user_id,
                    session = %record.session,
                    error = %e,
                    "Ledger sync failed"
                );
                false
            }
        }
    }
}
