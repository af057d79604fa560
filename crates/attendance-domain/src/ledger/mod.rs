use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::shared::{DomainError, UserId};
use crate::sign_in::SignInRecord;

/// What the remote attendance ledger answered for a recorded sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReceipt {
    pub message: String,
    /// Number of records the ledger now holds for the user
    pub record_count: usize,
}

/// Remote attendance ledger the agent mirrors committed sign-ins to
#[async_trait]
pub trait AttendanceLedger: Send + Sync {
    async fn record(
        &self,
        user_id: &UserId,
        record: &SignInRecord,
    ) -> Result<LedgerReceipt, DomainError>;
}
