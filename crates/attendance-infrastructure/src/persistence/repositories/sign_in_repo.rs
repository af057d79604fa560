use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;
use tracing::debug;

use attendance_domain::shared::DomainError;
use attendance_domain::sign_in::{SignInKey, SignInRecord, SignInStore};

use crate::persistence::SqliteRepositoryBase;

#[derive(FromRow)]
struct SignInRow {
    key: String,
    session: String,
    signed_in_at: DateTime<Utc>,
}

impl SignInRow {
    fn into_entry(self) -> Result<(SignInKey, SignInRecord), DomainError> {
        let session = self.session.parse().map_err(|_| {
            DomainError::Serialization(format!(
                "Stored sign-in {} has unknown session '{}'",
                self.key, self.session
            ))
        })?;

        Ok((
            SignInKey::from_string(&self.key),
            SignInRecord {
                session,
                signed_in_at: self.signed_in_at,
            },
        ))
    }
}

/// `SignInStore` backed by the `sign_ins` SQLite table
pub struct SqliteSignInStore {
    base: SqliteRepositoryBase,
}

impl SqliteSignInStore {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }
}

#[async_trait]
impl SignInStore for SqliteSignInStore {
    async fn exists(&self, key: &SignInKey) -> Result<bool, DomainError> {
        let query = "SELECT 1 FROM sign_ins WHERE key = ?1";

        let row: Option<(i64,)> = self
            .base
            .fetch_optional(sqlx::query_as(query).bind(key.as_str()), "Check sign-in")
            .await?;

        Ok(row.is_some())
    }

    async fn insert(&self, key: &SignInKey, record: &SignInRecord) -> Result<(), DomainError> {
        // OR IGNORE keeps the first writer; a zero row count is the collision signal
        let query = r#"
            INSERT OR IGNORE INTO sign_ins (key, session, signed_in_at)
            VALUES (?1, ?2, ?3)
        "#;

        let result = self
            .base
            .execute(
                sqlx::query(query)
                    .bind(key.as_str())
                    .bind(record.session.as_str())
                    .bind(record.signed_in_at),
                "Insert sign-in",
            )
            .await?;

        if result.rows_affected() == 0 {
            debug!(key = %key, "Sign-in insert collided with existing record");
            return Err(DomainError::Conflict(key.to_string()));
        }

        Ok(())
    }

    async fn find(&self, key: &SignInKey) -> Result<Option<SignInRecord>, DomainError> {
        let query = "SELECT key, session, signed_in_at FROM sign_ins WHERE key = ?1";

        let row: Option<SignInRow> = self
            .base
            .fetch_optional(sqlx::query_as(query).bind(key.as_str()), "Find sign-in")
            .await?;

        row.map(|r| r.into_entry().map(|(_, record)| record))
            .transpose()
    }

    async fn find_all(&self) -> Result<Vec<(SignInKey, SignInRecord)>, DomainError> {
        let query = "SELECT key, session, signed_in_at FROM sign_ins ORDER BY signed_in_at ASC";

        let rows: Vec<SignInRow> = self
            .base
            .fetch_all(sqlx::query_as(query), "List sign-ins")
            .await?;

        rows.into_iter().map(SignInRow::into_entry).collect()
    }

    async fn clear(&self) -> Result<u64, DomainError> {
        let result = self
            .base
            .execute(sqlx::query("DELETE FROM sign_ins"), "Clear sign-ins")
            .await?;

        Ok(result.rows_affected())
    }
}
