mod controller;
mod dispatch;
mod handoff;
mod session;
mod state;
mod targets;

pub use controller::RecordingCoordinator;
pub use dispatch::CoordinatorClient;
pub use session::{Session, Step};
pub use state::{RecordingState, StateSnapshot};
pub use targets::{restricted_scheme, TargetDirectory, TargetInfo, RESTRICTED_SCHEMES};
