//! Handoff of a completed session to the external generation stage.
//!
//! Fire-and-forget: the stop command has already returned by the time this
//! runs, and no outcome here changes the stopped state. The session must
//! still exist and still be stopped when the handoff fires; a reset racing
//! in between cancels it via that guard, not via any explicit token.

use std::sync::Arc;

use log::{info, warn};
use tokio::sync::{broadcast, Mutex};

use crate::protocol::Broadcast;
use crate::settings::SettingsStore;

use super::state::{CoordinatorInner, RecordingState};

pub(crate) fn spawn(
    inner: Arc<Mutex<CoordinatorInner>>,
    settings: Arc<SettingsStore>,
    events: broadcast::Sender<Broadcast>,
) {
    tokio::spawn(run(inner, settings, events));
}

async fn run(
    inner: Arc<Mutex<CoordinatorInner>>,
    settings: Arc<SettingsStore>,
    events: broadcast::Sender<Broadcast>,
) {
    let config = settings.handoff();
    if config.api_key.is_empty() {
        warn!("no API key configured, skipping generation handoff");
        return;
    }
    if !config.smart_description {
        info!("smart description disabled, skipping generation handoff");
        return;
    }

    let session = {
        let mut guard = inner.lock().await;
        if guard.state != RecordingState::Stopped {
            return;
        }
        let Some(session) = guard.session.as_mut() else {
            return;
        };
        session.config = Some(config.clone());
        session.clone()
    };

    if events
        .send(Broadcast::GenerationRequested { session, config })
        .is_err()
    {
        // No surface is listening right now; one that opens later can query
        // the session and pick the work up itself.
        info!("no listener for generation handoff");
    }
}
