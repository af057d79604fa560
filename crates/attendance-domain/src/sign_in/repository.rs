use async_trait::async_trait;

use super::{SignInKey, SignInRecord};
use crate::shared::DomainError;

/// Durable store holding at most one sign-in record per key
#[async_trait]
pub trait SignInStore: Send + Sync {
    async fn exists(&self, key: &SignInKey) -> Result<bool, DomainError>;

    /// Atomic insert-if-absent.
    ///
    /// Fails with [`DomainError::Conflict`] when a record already exists for
    /// `key`; the stored record is never overwritten.
    async fn insert(&self, key: &SignInKey, record: &SignInRecord) -> Result<(), DomainError>;

    async fn find(&self, key: &SignInKey) -> Result<Option<SignInRecord>, DomainError>;

    async fn find_all(&self) -> Result<Vec<(SignInKey, SignInRecord)>, DomainError>;

    /// Remove every record; returns how many were removed
    async fn clear(&self) -> Result<u64, DomainError>;
}
