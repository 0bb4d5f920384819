use thiserror::Error;

/// Failures a lifecycle command can return to its caller.
///
/// These are the only errors that cross a context boundary; they travel as a
/// structured `{error}` envelope, never as a panic or a raw string. Dropped
/// steps and failed screenshots are deliberately not here; those are
/// swallowed with a log line.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("recording already in progress")]
    AlreadyRecording,

    #[error("no recording in progress")]
    NotRecording,

    #[error("target {0} is not reachable")]
    TargetUnreachable(String),

    /// The target is a privileged page recording cannot attach to.
    #[error("recording is not available on {0} pages")]
    RestrictedTarget(String),

    /// The page observer never acknowledged the command. Remedy: reload the
    /// target page so the observer gets injected again.
    #[error("page observer is not ready; reload the page and try again")]
    AgentNotReady,
}
