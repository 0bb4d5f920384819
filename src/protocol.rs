//! Wire envelopes for the cross-context protocol.
//!
//! Every request is a `{type, payload}` envelope and every response is either
//! the success payload or `{error}`. The tags are the original protocol
//! strings, so a surface written against the old message shapes keeps working.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coordinator::{Session, StateSnapshot};
use crate::error::CommandError;
use crate::settings::HandoffSettings;

/// Page context of whoever reported a step. Refreshed onto the session on
/// every accepted step so single-page-app navigation keeps the metadata
/// current.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReporterContext {
    pub page_url: String,
    pub page_title: String,
}

/// Commands accepted by the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    GetState,
    #[serde(rename_all = "camelCase")]
    Start {
        target_id: String,
    },
    Stop,
    Reset,
    /// The step travels as raw JSON: a malformed step is dropped with a log
    /// line rather than failing the command, because the reporting agent
    /// cannot usefully act on a rejection.
    AddStep {
        step: Value,
        context: ReporterContext,
    },
    GetSession,
}

/// Success payloads, one per command.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Reply {
    State(StateSnapshot),
    Ack {
        success: bool,
    },
    #[serde(rename_all = "camelCase")]
    Stopped {
        success: bool,
        session: Session,
    },
    Session(Option<Session>),
}

impl Reply {
    pub fn ack() -> Self {
        Reply::Ack { success: true }
    }
}

pub type CommandResult = Result<Reply, CommandError>;

/// Wire form of a command result: the success payload as-is, or `{error}`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResponseEnvelope {
    Ok(Reply),
    Err { error: String },
}

impl From<CommandResult> for ResponseEnvelope {
    fn from(result: CommandResult) -> Self {
        match result {
            Ok(reply) => ResponseEnvelope::Ok(reply),
            Err(err) => ResponseEnvelope::Err {
                error: err.to_string(),
            },
        }
    }
}

/// Commands accepted by a page observer agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObserverCommand {
    Arm,
    Disarm,
    IsArmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ObserverReply {
    Ack { success: bool },
    Armed { armed: bool },
}

/// One-way notifications fanned out to whatever surfaces are listening.
/// Delivery is best-effort: no listener means the broadcast is dropped.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Broadcast {
    StateChanged {
        state: StateSnapshot,
    },
    /// Handoff of a completed session to the generation stage.
    GenerationRequested {
        session: Session,
        config: HandoffSettings,
    },
}
