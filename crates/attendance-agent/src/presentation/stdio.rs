//! JSON-lines host: requests arrive one per line on the input, replies and
//! notifications leave one per line on the output.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use super::dispatcher::AgentHandle;
use super::protocol::{decode_line, OutboundMessage};
use attendance_domain::notification::{NotificationDisplay, NotificationMessage};
use attendance_domain::shared::{DomainError, RequestId};
use attendance_domain::sign_in::Reply;

const OUTBOUND_BUFFER: usize = 256;

enum Outbound {
    Line(OutboundMessage),
    Close,
}

/// Shows notifications by writing them to the host output
#[derive(Clone)]
pub struct StdioNotificationDisplay {
    tx: mpsc::Sender<Outbound>,
}

#[async_trait]
impl NotificationDisplay for StdioNotificationDisplay {
    async fn display(&self, message: &NotificationMessage) -> Result<(), DomainError> {
        self.tx
            .send(Outbound::Line(OutboundMessage::notification(message.clone())))
            .await
            .map_err(|_| DomainError::Infrastructure("Host output is closed".to_string()))
    }
}

/// Owns the output writer task
pub struct StdioHost<W> {
    tx: mpsc::Sender<Outbound>,
    writer: JoinHandle<std::io::Result<W>>,
}

impl<W> StdioHost<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn start(output: W) -> (Self, StdioNotificationDisplay) {
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        let writer = tokio::spawn(write_outbound(output, rx));
        let display = StdioNotificationDisplay { tx: tx.clone() };
        (Self { tx, writer }, display)
    }

    /// Read requests until `input` ends, then wait for the dispatcher to
    /// drain and every pending reply to be written. Returns the output.
    pub async fn serve<R>(
        self,
        input: R,
        handle: AgentHandle,
        dispatcher_task: JoinHandle<()>,
    ) -> std::io::Result<W>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut pending = PendingReplies::new(self.tx.clone());

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let message = match decode_line(line) {
                Ok(message) => message,
                Err(e) => {
                    warn!("Ignoring inbound message: {}", e);
                    continue;
                }
            };

            let expects_reply = message.request.expects_reply();
            let request_id = message.id.clone().unwrap_or_default();
            let rx = match handle.submit(request_id, message.request).await {
                Ok(rx) => rx,
                Err(e) => {
                    warn!("Dropping request: {}", e);
                    break;
                }
            };

            if expects_reply {
                pending.track(message.id, rx);
            }
        }

        info!("Input closed, shutting down");
        drop(handle);
        if let Err(e) = dispatcher_task.await {
            warn!("Dispatcher task ended abnormally: {}", e);
        }
        pending.finish().await;

        let _ = self.tx.send(Outbound::Close).await;
        self.writer
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?
    }
}

/// Forwarders that write each reply once the dispatcher produces it
struct PendingReplies {
    tx: mpsc::Sender<Outbound>,
    tasks: JoinSet<()>,
}

impl PendingReplies {
    fn new(tx: mpsc::Sender<Outbound>) -> Self {
        Self {
            tx,
            tasks: JoinSet::new(),
        }
    }

    fn track(&mut self, echo_id: Option<RequestId>, rx: oneshot::Receiver<Reply>) {
        let tx = self.tx.clone();
        self.tasks.spawn(async move {
            match rx.await {
                Ok(reply) => {
                    let _ = tx
                        .send(Outbound::Line(OutboundMessage::reply(echo_id.as_ref(), reply)))
                        .await;
                }
                Err(_) => debug!("Request finished without a reply"),
            }
        });

        // Reap written replies so the set does not grow unbounded
        while let Some(result) = self.tasks.try_join_next() {
            if let Err(e) = result {
                warn!("Reply forwarder failed: {}", e);
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.tasks.len()
    }

    async fn finish(mut self) {
        while self.tasks.join_next().await.is_some() {}
    }
}

async fn write_outbound<W>(mut output: W, mut rx: mpsc::Receiver<Outbound>) -> std::io::Result<W>
where
    W: AsyncWrite + Unpin,
{
    while let Some(outbound) = rx.recv().await {
        let message = match outbound {
            Outbound::Line(message) => message,
            Outbound::Close => break,
        };

        let mut line = match message.to_line() {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to encode outbound message: {}", e);
                continue;
            }
        };
        line.push('\n');

        output.write_all(line.as_bytes()).await?;
        output.flush().await?;
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_written_replies_are_reaped() {
        let (tx, mut rx) = mpsc::channel(OUTBOUND_BUFFER);
        let mut pending = PendingReplies::new(tx);

        for n in 0..50 {
            let (reply_tx, reply_rx) = oneshot::channel();
            let _ = reply_tx.send(Reply::success(format!("reply {n}")));
            pending.track(Some(RequestId::from_string(&n.to_string())), reply_rx);
        }

        // Let every forwarder run to completion
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        pending.track(None, reply_rx);
        assert_eq!(pending.len(), 1);

        let _ = reply_tx.send(Reply::failure("You have already signed in for the night session."));
        pending.finish().await;

        let mut written = 0;
        while let Ok(Outbound::Line(_)) = rx.try_recv() {
            written += 1;
        }
        assert_eq!(written, 51);
    }

    #[tokio::test]
    async fn test_unanswered_request_writes_nothing() {
        let (tx, mut rx) = mpsc::channel(OUTBOUND_BUFFER);
        let mut pending = PendingReplies::new(tx);

        let (reply_tx, reply_rx) = oneshot::channel::<Reply>();
        pending.track(None, reply_rx);
        drop(reply_tx);
        pending.finish().await;

        assert!(rx.try_recv().is_err());
    }
}
