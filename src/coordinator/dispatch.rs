//! Command dispatch loop.
//!
//! One task drains the coordinator's inbox and matches every command
//! exhaustively; adding a command type is a compile error until it is
//! handled. Requests from different clients interleave arbitrarily, but each
//! is handled to completion against the shared state before the next.

use log::debug;

use crate::bus::{self, Client};
use crate::protocol::{Command, CommandResult, Reply};

use super::controller::RecordingCoordinator;

pub type CoordinatorClient = Client<Command, CommandResult>;

impl RecordingCoordinator {
    /// Installs the command loop and returns a client for it.
    ///
    /// Idempotent: the coordinator can be re-entered several times within
    /// one process lifetime, and repeated calls hand back the client of the
    /// already-running loop instead of installing a second listener.
    pub fn serve(&self) -> CoordinatorClient {
        let mut slot = self.client_slot.lock().unwrap();
        if let Some(existing) = slot.as_ref() {
            if !existing.is_closed() {
                return existing.clone();
            }
        }

        let (client, mut inbox) = bus::pair();
        let coordinator = self.clone();
        tokio::spawn(async move {
            while let Some((command, responder)) = inbox.next().await {
                debug!("handling command {command:?}");
                responder.send(coordinator.handle(command).await);
            }
        });

        *slot = Some(client.clone());
        client
    }

    async fn handle(&self, command: Command) -> CommandResult {
        match command {
            Command::GetState => Ok(Reply::State(self.snapshot().await)),
            Command::Start { target_id } => {
                self.start(&target_id).await?;
                Ok(Reply::ack())
            }
            Command::Stop => {
                let session = self.stop().await?;
                Ok(Reply::Stopped {
                    success: true,
                    session,
                })
            }
            Command::Reset => {
                self.reset().await;
                Ok(Reply::ack())
            }
            Command::AddStep { step, context } => {
                self.add_step(step, &context).await;
                // Accepted or dropped, the reporter gets an ack either way.
                Ok(Reply::ack())
            }
            Command::GetSession => Ok(Reply::Session(self.session().await)),
        }
    }
}
