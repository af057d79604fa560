use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use attendance_domain::ledger::{AttendanceLedger, LedgerReceipt};
use attendance_domain::shared::{DomainError, UserId};
use attendance_domain::sign_in::SignInRecord;

const USER_AGENT: &str = concat!("attendance-agent/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordAttendanceBody<'a> {
    user_id: &'a UserId,
    record: &'a SignInRecord,
}

#[derive(Debug, Deserialize)]
struct RecordAttendanceResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    records: Vec<serde_json::Value>,
}

/// `<base>/api/attendance`, keeping any path prefix on the base URL
pub fn attendance_endpoint(base_url: &Url) -> Result<Url, DomainError> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("api/attendance")
        .map_err(|e| DomainError::InvalidInput(format!("Invalid ledger URL {}: {}", base_url, e)))
}

/// Client for the remote attendance ledger
pub struct HttpAttendanceLedger {
    client: Client,
    endpoint: Url,
    retry_config: RetryConfig,
}

impl HttpAttendanceLedger {
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, DomainError> {
        Self::with_retry_config(base_url, timeout, RetryConfig::default())
    }

    pub fn with_retry_config(
        base_url: &Url,
        timeout: Duration,
        retry_config: RetryConfig,
    ) -> Result<Self, DomainError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DomainError::Infrastructure(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: attendance_endpoint(base_url)?,
            retry_config,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post_once(
        &self,
        body: &RecordAttendanceBody<'_>,
    ) -> Result<RecordAttendanceResponse, DomainError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| DomainError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &text));
        }

        response
            .json::<RecordAttendanceResponse>()
            .await
            .map_err(|e| DomainError::Serialization(format!("Invalid ledger response: {}", e)))
    }
}

/// 5xx and 429 are worth retrying; any other 4xx is the request's fault
fn classify_status(status: StatusCode, body: &str) -> DomainError {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        DomainError::ExternalService(format!("Ledger returned {}: {}", status, body))
    } else {
        DomainError::InvalidInput(format!("Ledger rejected record ({}): {}", status, body))
    }
}

#[async_trait]
impl AttendanceLedger for HttpAttendanceLedger {
    async fn record(
        &self,
        user_id: &UserId,
        record: &SignInRecord,
    ) -> Result<LedgerReceipt, DomainError> {
        let body = RecordAttendanceBody { user_id, record };
        let mut attempt = 0;
        let mut backoff_ms = self.retry_config.initial_backoff_ms;

        loop {
            attempt += 1;

            match self.post_once(&body).await {
                Ok(response) => {
                    if attempt > 1 {
                        debug!("Ledger sync succeeded after {} attempts", attempt);
                    }
                    return Ok(LedgerReceipt {
                        message: response.message,
                        record_count: response.records.len(),
                    });
                }
                Err(e) if attempt <= self.retry_config.max_retries && e.is_recoverable() => {
                    warn!(
                        "Ledger sync failed (attempt {}/{}): {}. Retrying in {}ms...",
                        attempt, self.retry_config.max_retries, e, backoff_ms
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms = (backoff_ms * 2).min(self.retry_config.max_backoff_ms);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
