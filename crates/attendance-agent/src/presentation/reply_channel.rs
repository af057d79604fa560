use tokio::sync::oneshot;
use tracing::debug;

use attendance_domain::shared::RequestId;
use attendance_domain::sign_in::Reply;

/// Single-use path back to whoever issued a request.
///
/// `send` consumes the channel, so a second reply cannot be written. Dropping
/// the channel unsent closes it, which the caller observes as "no reply".
#[derive(Debug)]
pub struct ReplyChannel {
    request_id: RequestId,
    tx: oneshot::Sender<Reply>,
}

impl ReplyChannel {
    pub fn new(request_id: RequestId) -> (Self, oneshot::Receiver<Reply>) {
        let (tx, rx) = oneshot::channel();
        (Self { request_id, tx }, rx)
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Deliver the reply. If the caller has already gone away the reply is
    /// dropped; there is no retry.
    pub fn send(self, reply: Reply) {
        if self.tx.send(reply).is_err() {
            debug!(request_id = %self.request_id, "Caller closed reply channel, reply dropped");
        }
    }
}
