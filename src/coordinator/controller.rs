use std::sync::{Arc, Mutex as StdMutex};

use chrono::Utc;
use log::{debug, info, warn};
use serde_json::Value;
use tokio::sync::{broadcast, Mutex};

use crate::capture::CaptureBackend;
use crate::error::CommandError;
use crate::protocol::{Broadcast, ObserverCommand, ReporterContext};
use crate::settings::SettingsStore;

use super::dispatch::CoordinatorClient;
use super::handoff;
use super::session::{Session, Step};
use super::state::{CoordinatorInner, RecordingState, StateSnapshot, TargetBinding};
use super::targets::{restricted_scheme, TargetDirectory};

/// The long-lived service owning the canonical recording state.
///
/// Cheap to clone; clones share the single state instance. Every command is
/// atomic against that state: handlers re-check it after each await, so a
/// reset landing mid-command never leaves a half-applied transition.
#[derive(Clone)]
pub struct RecordingCoordinator {
    inner: Arc<Mutex<CoordinatorInner>>,
    targets: Arc<TargetDirectory>,
    capture: Arc<dyn CaptureBackend>,
    settings: Arc<SettingsStore>,
    events: broadcast::Sender<Broadcast>,
    pub(crate) client_slot: Arc<StdMutex<Option<CoordinatorClient>>>,
}

impl RecordingCoordinator {
    pub fn new(
        targets: Arc<TargetDirectory>,
        capture: Arc<dyn CaptureBackend>,
        settings: Arc<SettingsStore>,
    ) -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            inner: Arc::new(Mutex::new(CoordinatorInner::default())),
            targets,
            capture,
            settings,
            events,
            client_slot: Arc::new(StdMutex::new(None)),
        }
    }

    /// Subscribes a surface to state broadcasts. Surfaces come and go; a
    /// lagging or absent receiver drops notifications without affecting the
    /// coordinator.
    pub fn subscribe(&self) -> broadcast::Receiver<Broadcast> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> StateSnapshot {
        self.inner.lock().await.snapshot()
    }

    pub async fn session(&self) -> Option<Session> {
        self.inner.lock().await.session.clone()
    }

    /// Starts recording against a registered target.
    ///
    /// Validates reachability and the restricted-scheme list before touching
    /// state, then transitions and arms the target's observer. If arming
    /// fails the transition rolls back: a session must never outlive a
    /// failed arm.
    pub async fn start(&self, target_id: &str) -> Result<(), CommandError> {
        let Some((info, observer)) = self.targets.resolve(target_id) else {
            return Err(CommandError::TargetUnreachable(target_id.to_string()));
        };
        if info.url.is_empty() {
            return Err(CommandError::TargetUnreachable(target_id.to_string()));
        }
        if let Some(scheme) = restricted_scheme(&info.url) {
            return Err(CommandError::RestrictedTarget(scheme.to_string()));
        }
        // No agent was ever loaded into this target.
        let Some(observer) = observer else {
            return Err(CommandError::AgentNotReady);
        };

        let session_id = {
            let mut inner = self.inner.lock().await;
            if inner.state != RecordingState::Idle {
                return Err(CommandError::AlreadyRecording);
            }
            let session = Session::new(info.url.clone(), info.title.clone());
            let session_id = session.session_id.clone();
            inner.state = RecordingState::Recording;
            inner.session = Some(session);
            inner.binding = Some(TargetBinding {
                target_id: target_id.to_string(),
                observer: observer.clone(),
            });
            session_id
        };

        let wait = self.settings.observer_command_timeout();
        match observer.command(ObserverCommand::Arm, wait).await {
            Ok(_) => {
                info!("recording started on {target_id} ({})", info.url);
                self.broadcast_state().await;
                Ok(())
            }
            Err(err) => {
                warn!("failed to arm observer on {target_id}: {err}");
                // Roll back, unless someone already reset or restarted while
                // the arm was in flight.
                let mut inner = self.inner.lock().await;
                let ours = inner
                    .session
                    .as_ref()
                    .is_some_and(|session| session.session_id == session_id);
                if ours {
                    inner.clear();
                }
                Err(CommandError::AgentNotReady)
            }
        }
    }

    /// Stops the active recording and hands the finished session off.
    ///
    /// Disarm is best-effort: once the preconditions hold, stopping always
    /// succeeds. The generation handoff runs detached and cannot affect the
    /// returned result.
    pub async fn stop(&self) -> Result<Session, CommandError> {
        let stopped_at = Utc::now();

        let (session, binding) = {
            let mut inner = self.inner.lock().await;
            if inner.state != RecordingState::Recording {
                return Err(CommandError::NotRecording);
            }
            let Some(session) = inner.session.as_mut() else {
                // State said recording with no session; repair to idle.
                inner.clear();
                return Err(CommandError::NotRecording);
            };
            session.end_time = Some(stopped_at);
            let session = session.clone();
            inner.state = RecordingState::Stopped;
            (session, inner.binding.clone())
        };

        if let Some(binding) = binding {
            let wait = self.settings.observer_command_timeout();
            if let Err(err) = binding.observer.command(ObserverCommand::Disarm, wait).await {
                warn!("failed to disarm observer on {}: {err}", binding.target_id);
            }
        }

        info!(
            "recording {} stopped with {} steps",
            session.session_id,
            session.steps.len()
        );
        self.broadcast_state().await;

        handoff::spawn(
            self.inner.clone(),
            self.settings.clone(),
            self.events.clone(),
        );

        Ok(session)
    }

    /// Unconditionally returns to idle, abandoning any session. Idempotent.
    pub async fn reset(&self) {
        {
            let mut inner = self.inner.lock().await;
            inner.clear();
        }
        self.broadcast_state().await;
    }

    /// Accepts a step reported by the armed observer.
    ///
    /// Never fails toward the caller: steps arriving outside a recording and
    /// steps missing their discriminant are dropped with a log line, because
    /// the reporting agent cannot act on a rejection anyway.
    pub async fn add_step(&self, raw: Value, context: &ReporterContext) {
        let step: Step = match serde_json::from_value(raw) {
            Ok(step) => step,
            Err(err) => {
                warn!("dropping malformed step: {err}");
                return;
            }
        };

        let capture_target = {
            let mut guard = self.inner.lock().await;
            let inner = &mut *guard;
            if inner.state != RecordingState::Recording {
                debug!("ignoring step outside an active recording");
                return;
            }
            let Some(session) = inner.session.as_mut() else {
                debug!("ignoring step without a session");
                return;
            };
            session.steps.push(step);
            session.page_url = context.page_url.clone();
            session.page_title = context.page_title.clone();
            inner
                .binding
                .as_ref()
                .map(|binding| binding.target_id.clone())
        };

        if let Some(target_id) = capture_target {
            self.capture_screenshot_async(target_id);
        }
        self.broadcast_state().await;
    }

    /// Schedules a screenshot of the bound target on a detached task and
    /// attaches it to whatever step is last once it lands. Left the
    /// recording state or switched targets in the meantime: the frame is
    /// discarded silently.
    fn capture_screenshot_async(&self, target_id: String) {
        let inner = self.inner.clone();
        let backend = self.capture.clone();

        tokio::spawn(async move {
            let grab_target = target_id.clone();
            let frame =
                match tokio::task::spawn_blocking(move || backend.capture_visible(&grab_target))
                    .await
                {
                    Ok(Ok(frame)) => frame,
                    Ok(Err(err)) => {
                        debug!("screenshot capture failed for {target_id}: {err:#}");
                        return;
                    }
                    Err(err) => {
                        debug!("screenshot capture worker died for {target_id}: {err}");
                        return;
                    }
                };

            let mut guard = inner.lock().await;
            if guard.state != RecordingState::Recording {
                return;
            }
            let same_target = guard
                .binding
                .as_ref()
                .is_some_and(|binding| binding.target_id == target_id);
            if !same_target {
                return;
            }
            if let Some(step) = guard
                .session
                .as_mut()
                .and_then(|session| session.steps.last_mut())
            {
                step.attach_screenshot(frame);
            }
        });
    }

    pub(crate) async fn broadcast_state(&self) {
        let snapshot = self.snapshot().await;
        // No surface listening is the normal case, not an error.
        let _ = self.events.send(Broadcast::StateChanged { state: snapshot });
    }
}
