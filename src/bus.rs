//! Request/response channel between two isolated contexts.
//!
//! Each context runs its own event loop; the only way across is a message
//! carrying a one-shot reply slot. Channels are independent of each other:
//! replies come back in request order on one channel, but nothing is ordered
//! across channels.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelError {
    /// The peer context is gone or was never installed.
    #[error("peer context is not present")]
    Closed,
    /// The peer context did not answer within the bounded wait.
    #[error("peer context did not respond within {0:?}")]
    Timeout(Duration),
}

struct Envelope<Req, Rsp> {
    request: Req,
    reply: oneshot::Sender<Rsp>,
}

pub struct Client<Req, Rsp> {
    tx: mpsc::UnboundedSender<Envelope<Req, Rsp>>,
}

impl<Req, Rsp> Clone for Client<Req, Rsp> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<Req, Rsp> Client<Req, Rsp> {
    pub async fn request(&self, request: Req) -> Result<Rsp, ChannelError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Envelope {
                request,
                reply: reply_tx,
            })
            .map_err(|_| ChannelError::Closed)?;
        reply_rx.await.map_err(|_| ChannelError::Closed)
    }

    /// Like [`request`](Self::request) but fails fast instead of hanging
    /// when the peer never picks up the envelope.
    pub async fn request_timeout(&self, request: Req, wait: Duration) -> Result<Rsp, ChannelError> {
        match time::timeout(wait, self.request(request)).await {
            Ok(result) => result,
            Err(_) => Err(ChannelError::Timeout(wait)),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub struct Inbox<Req, Rsp> {
    rx: mpsc::UnboundedReceiver<Envelope<Req, Rsp>>,
}

impl<Req, Rsp> Inbox<Req, Rsp> {
    /// Next pending request, or `None` once every client is gone.
    pub async fn next(&mut self) -> Option<(Req, Responder<Rsp>)> {
        self.rx
            .recv()
            .await
            .map(|envelope| (envelope.request, Responder(envelope.reply)))
    }
}

/// Reply slot for a single request. Dropping it without sending surfaces as
/// [`ChannelError::Closed`] on the client side.
pub struct Responder<Rsp>(oneshot::Sender<Rsp>);

impl<Rsp> Responder<Rsp> {
    pub fn send(self, response: Rsp) {
        // Client may have given up already; that is its problem, not ours.
        let _ = self.0.send(response);
    }
}

pub fn pair<Req, Rsp>() -> (Client<Req, Rsp>, Inbox<Req, Rsp>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Client { tx }, Inbox { rx })
}
