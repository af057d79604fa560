use async_trait::async_trait;

use attendance_domain::shared::DomainError;

/// Handles a single command type
#[async_trait]
pub trait CommandHandler<C>: Send + Sync {
    type Result: Send;

    async fn handle(&self, cmd: C) -> Result<Self::Result, DomainError>;
}
