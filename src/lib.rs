//! Core recording engine for Smart Page Scribe.
//!
//! Captures a user's interaction sequence on a live document and hands the
//! finished session to a downstream generation stage. Three kinds of
//! contexts cooperate, each on its own event loop with no shared memory:
//!
//! - the [`coordinator::RecordingCoordinator`], the one privileged service
//!   owning the canonical recording state and the active session;
//! - a [`observer::ObserverAgent`] per recorded page, translating raw clicks
//!   and URL changes into locator-bearing steps while armed;
//! - ephemeral UI surfaces, which issue commands through a
//!   [`coordinator::CoordinatorClient`] and listen to best-effort
//!   [`protocol::Broadcast`]s.
//!
//! Everything crosses between contexts as a message: commands carry a
//! one-shot reply, broadcasts are droppable, and screenshot capture plus the
//! generation handoff run as detached tasks whose failures never surface to
//! a caller.

pub mod bus;
pub mod capture;
pub mod coordinator;
pub mod error;
pub mod observer;
pub mod protocol;
pub mod settings;

pub use capture::{CaptureBackend, UnavailableCapture};
pub use coordinator::{
    CoordinatorClient, RecordingCoordinator, RecordingState, Session, StateSnapshot, Step,
    TargetDirectory, TargetInfo,
};
pub use error::CommandError;
pub use observer::{ClickEvent, Element, ObserverAgent, ObserverHandle, PageContext, PageEvent};
pub use protocol::{
    Broadcast, Command, CommandResult, ObserverCommand, ObserverReply, Reply, ReporterContext,
    ResponseEnvelope,
};
pub use settings::{HandoffSettings, ObserverSettings, RecorderSettings, SettingsStore};
