//! Page observer agent: the in-document context that turns raw events into
//! steps.
//!
//! The agent owns a local armed flag the coordinator never sees directly; a
//! fresh `IS_ARMED` query is the only way to learn it. While armed it
//! debounces clicks, generates selectors, tracks a single last-known-URL
//! cursor, and reports steps to the coordinator over its own channel.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use log::{info, warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::bus::{self, ChannelError, Client, Inbox};
use crate::coordinator::{CoordinatorClient, Step};
use crate::protocol::{Command, ObserverCommand, ObserverReply, ReporterContext};
use crate::settings::ObserverSettings;

use super::dom::Element;
use super::page::PageContext;
use super::selector::element_selector;

/// A raw document event delivered into the agent's event loop.
pub enum PageEvent {
    Click(ClickEvent),
    UrlChanged { url: String },
}

/// Capture-phase click, before any dedup.
pub struct ClickEvent {
    pub target: Element,
    pub x: f64,
    pub y: f64,
}

/// Handle the rest of the system uses to talk to one agent. Commands get a
/// bounded wait; events are fire-and-forget like DOM listeners.
#[derive(Clone)]
pub struct ObserverHandle {
    commands: Client<ObserverCommand, ObserverReply>,
    events: mpsc::UnboundedSender<PageEvent>,
    cancel: CancellationToken,
}

impl ObserverHandle {
    pub async fn command(
        &self,
        command: ObserverCommand,
        wait: std::time::Duration,
    ) -> Result<ObserverReply, ChannelError> {
        self.commands.request_timeout(command, wait).await
    }

    pub fn deliver(&self, event: PageEvent) {
        // The agent may already be gone; raw events are droppable.
        let _ = self.events.send(event);
    }

    /// Tears the agent task down, as if its document was unloaded.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

pub struct ObserverAgent {
    page: Arc<PageContext>,
    coordinator: CoordinatorClient,
    settings: ObserverSettings,
    armed: bool,
    last_target: Option<Element>,
    last_click_at: Option<Instant>,
    last_url: String,
    events_tx: mpsc::UnboundedSender<PageEvent>,
}

impl ObserverAgent {
    /// Spawns the agent event loop for one page and returns its handle.
    pub fn spawn(
        page: Arc<PageContext>,
        coordinator: CoordinatorClient,
        settings: ObserverSettings,
    ) -> ObserverHandle {
        let (commands, inbox) = bus::pair();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let agent = ObserverAgent {
            last_url: page.url(),
            page,
            coordinator,
            settings,
            armed: false,
            last_target: None,
            last_click_at: None,
            events_tx: events_tx.clone(),
        };
        tokio::spawn(agent.run(inbox, events_rx, cancel.clone()));

        ObserverHandle {
            commands,
            events: events_tx,
            cancel,
        }
    }

    async fn run(
        mut self,
        mut inbox: Inbox<ObserverCommand, ObserverReply>,
        mut events: mpsc::UnboundedReceiver<PageEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    self.disarm();
                    break;
                }
                next = inbox.next() => match next {
                    Some((command, responder)) => responder.send(self.handle_command(command)),
                    None => break,
                },
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },
            }
        }
    }

    fn handle_command(&mut self, command: ObserverCommand) -> ObserverReply {
        match command {
            ObserverCommand::Arm => {
                self.arm();
                ObserverReply::Ack { success: true }
            }
            ObserverCommand::Disarm => {
                self.disarm();
                ObserverReply::Ack { success: true }
            }
            // Liveness probe; answering must not change anything.
            ObserverCommand::IsArmed => ObserverReply::Armed { armed: self.armed },
        }
    }

    fn arm(&mut self) {
        if self.armed {
            return;
        }
        self.armed = true;
        self.last_target = None;
        self.last_click_at = None;
        self.last_url = self.page.url();

        let tx = self.events_tx.clone();
        self.page.install_navigation_hook(Arc::new(move |url| {
            let _ = tx.send(PageEvent::UrlChanged {
                url: url.to_string(),
            });
        }));

        info!("page observer armed for {}", self.last_url);
    }

    fn disarm(&mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;
        self.page.remove_navigation_hook();
        info!("page observer disarmed");
    }

    async fn handle_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::Click(click) => self.record_click(click).await,
            PageEvent::UrlChanged { url } => self.record_navigation(url).await,
        }
    }

    async fn record_click(&mut self, click: ClickEvent) {
        if !self.armed {
            return;
        }

        // Rapid re-clicks on the same element collapse into one step.
        let now = Instant::now();
        let duplicate = self
            .last_target
            .as_ref()
            .is_some_and(|target| target.same_node(&click.target))
            && self
                .last_click_at
                .is_some_and(|at| now.duration_since(at) < self.settings.click_debounce());
        if duplicate {
            return;
        }

        self.last_target = Some(click.target.clone());
        self.last_click_at = Some(now);

        let step = Step::Click {
            timestamp: Utc::now(),
            selector: element_selector(&click.target, self.settings.selector_max_depth),
            tag_name: click.target.tag_name().to_ascii_lowercase(),
            text: click.target.display_text(self.settings.text_snippet_limit),
            x: click.x,
            y: click.y,
            screenshot: None,
        };
        self.submit(step).await;
    }

    async fn record_navigation(&mut self, url: String) {
        // Events queued before a disarm landed still arrive; drop them.
        if !self.armed || url == self.last_url {
            return;
        }

        let step = Step::Navigate {
            timestamp: Utc::now(),
            from: std::mem::replace(&mut self.last_url, url.clone()),
            to: url,
        };
        self.submit(step).await;
    }

    async fn submit(&self, step: Step) {
        let step = match serde_json::to_value(&step) {
            Ok(value) => value,
            Err(err) => {
                warn!("failed to encode step: {err}");
                return;
            }
        };
        let context = ReporterContext {
            page_url: self.page.url(),
            page_title: self.page.title(),
        };

        match self
            .coordinator
            .request(Command::AddStep { step, context })
            .await
        {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => warn!("coordinator rejected step: {err}"),
            Err(err) => warn!("failed to deliver step: {err}"),
        }
    }
}
