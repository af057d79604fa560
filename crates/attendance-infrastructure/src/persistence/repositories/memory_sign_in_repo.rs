use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use attendance_domain::shared::DomainError;
use attendance_domain::sign_in::{SignInKey, SignInRecord, SignInStore};

/// Process-local `SignInStore`; contents are lost when the agent exits
#[derive(Default)]
pub struct InMemorySignInStore {
    records: Mutex<HashMap<SignInKey, SignInRecord>>,
}

impl InMemorySignInStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl SignInStore for InMemorySignInStore {
    async fn exists(&self, key: &SignInKey) -> Result<bool, DomainError> {
        Ok(self.records.lock().await.contains_key(key))
    }

    async fn insert(&self, key: &SignInKey, record: &SignInRecord) -> Result<(), DomainError> {
        let mut records = self.records.lock().await;
        if records.contains_key(key) {
            return Err(DomainError::Conflict(key.to_string()));
        }
        records.insert(key.clone(), record.clone());
        Ok(())
    }

    async fn find(&self, key: &SignInKey) -> Result<Option<SignInRecord>, DomainError> {
        Ok(self.records.lock().await.get(key).cloned())
    }

    async fn find_all(&self) -> Result<Vec<(SignInKey, SignInRecord)>, DomainError> {
        let records = self.records.lock().await;
        let mut entries: Vec<_> = records
            .iter()
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect();
        entries.sort_by_key(|(_, record)| record.signed_in_at);
        Ok(entries)
    }

    async fn clear(&self) -> Result<u64, DomainError> {
        let mut records = self.records.lock().await;
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }
}
