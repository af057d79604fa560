use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use super::protocol::AgentRequest;
use super::reply_channel::ReplyChannel;
use crate::application::commands::handlers::SignInGate;
use crate::application::services::{LedgerSyncService, NotificationService};
use attendance_domain::session::Session;
use attendance_domain::shared::{DomainError, RequestId};
use attendance_domain::sign_in::Reply;

/// Request queued for the dispatcher together with its reply path
struct Inbound {
    request: AgentRequest,
    reply: ReplyChannel,
}

/// Routes decoded requests to the sign-in gate or the notification surface
pub struct RequestDispatcher {
    gate: Arc<SignInGate>,
    notification_service: Arc<NotificationService>,
    ledger_sync: Option<Arc<LedgerSyncService>>,
}

impl RequestDispatcher {
    pub fn new(gate: Arc<SignInGate>, notification_service: Arc<NotificationService>) -> Self {
        Self {
            gate,
            notification_service,
            ledger_sync: None,
        }
    }

    pub fn with_ledger_sync(mut self, ledger_sync: Arc<LedgerSyncService>) -> Self {
        self.ledger_sync = Some(ledger_sync);
        self
    }

    /// Handle one request to completion.
    ///
    /// Sign-in requests always produce exactly one reply on `reply`. Push
    /// requests are fire-and-forget and the channel is closed unanswered.
    pub async fn dispatch(&self, request: AgentRequest, reply: ReplyChannel) {
        let request_id = reply.request_id().clone();
        debug!(request_id = %request_id, action = request.action(), "Dispatching request");

        match request {
            AgentRequest::SignIn { session } => {
                let result = self.gate.request_sign_in_label(&session).await;
                reply.send(result.reply());

                // Sync only after the caller has its answer
                if let (Some(ledger_sync), Some(record)) = (&self.ledger_sync, result.record) {
                    ledger_sync.sync(&record).await;
                }
            }
            AgentRequest::TestPush => {
                drop(reply);
                if let Err(e) = self.notification_service.send_test_push().await {
                    warn!(request_id = %request_id, "Test push not shown: {}", e);
                }
            }
            AgentRequest::Push => {
                drop(reply);
                if let Err(e) = self.notification_service.send_sign_in_reminder().await {
                    warn!(request_id = %request_id, "Push reminder not shown: {}", e);
                }
            }
        }
    }

    /// Start the dispatch loop.
    ///
    /// Requests are taken in arrival order and each runs on its own task, so
    /// their store calls may interleave. When every [`AgentHandle`] is
    /// dropped the loop stops accepting work and waits up to `shutdown_grace`
    /// for in-flight requests.
    pub fn spawn(
        self: Arc<Self>,
        queue_size: usize,
        shutdown_grace: Duration,
    ) -> (AgentHandle, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Inbound>(queue_size);

        let task = tokio::spawn(async move {
            let mut in_flight = JoinSet::new();

            while let Some(Inbound { request, reply }) = rx.recv().await {
                let dispatcher = Arc::clone(&self);
                in_flight.spawn(async move { dispatcher.dispatch(request, reply).await });

                // Reap finished tasks so the set does not grow unbounded
                while let Some(result) = in_flight.try_join_next() {
                    log_join_result(result);
                }
            }

            info!(pending = in_flight.len(), "Request queue closed, draining");
            let drained = tokio::time::timeout(shutdown_grace, async {
                while let Some(result) = in_flight.join_next().await {
                    log_join_result(result);
                }
            })
            .await;

            if drained.is_err() {
                warn!(
                    aborted = in_flight.len(),
                    "Shutdown grace elapsed, aborting in-flight requests"
                );
                in_flight.abort_all();
            }
        });

        (AgentHandle { tx }, task)
    }
}

fn log_join_result(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        if e.is_panic() {
            error!("Request task panicked: {}", e);
        }
    }
}

/// Cloneable front door to a running dispatcher
#[derive(Clone)]
pub struct AgentHandle {
    tx: mpsc::Sender<Inbound>,
}

impl AgentHandle {
    /// Queue a request and return the receiving end of its reply channel.
    ///
    /// The receiver resolves to an error when the request gets no reply.
    pub async fn submit(
        &self,
        request_id: RequestId,
        request: AgentRequest,
    ) -> Result<oneshot::Receiver<Reply>, DomainError> {
        let (reply, rx) = ReplyChannel::new(request_id);
        self.tx
            .send(Inbound { request, reply })
            .await
            .map_err(|_| DomainError::Infrastructure("Dispatcher is not running".to_string()))?;
        Ok(rx)
    }

    pub async fn sign_in(&self, session: Session) -> Result<Reply, DomainError> {
        let rx = self
            .submit(RequestId::new(), AgentRequest::from(session))
            .await?;
        rx.await.map_err(|_| {
            DomainError::Infrastructure("Sign-in request ended without a reply".to_string())
        })
    }

    pub async fn test_push(&self) -> Result<(), DomainError> {
        self.submit(RequestId::new(), AgentRequest::TestPush)
            .await
            .map(drop)
    }

    pub async fn push(&self) -> Result<(), DomainError> {
        self.submit(RequestId::new(), AgentRequest::Push)
            .await
            .map(drop)
    }
}
