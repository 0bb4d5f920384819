use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::settings::HandoffSettings;

/// One captured user action.
///
/// Steps are created by the page observer, appended by the coordinator in
/// arrival order, and mutated in place only by the screenshot side-channel.
/// A missing screenshot is an accepted outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Step {
    #[serde(rename_all = "camelCase")]
    Click {
        timestamp: DateTime<Utc>,
        selector: String,
        tag_name: String,
        text: String,
        x: f64,
        y: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        screenshot: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Navigate {
        timestamp: DateTime<Utc>,
        from: String,
        to: String,
    },
}

impl Step {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Step::Click { timestamp, .. } | Step::Navigate { timestamp, .. } => *timestamp,
        }
    }

    /// Attaches a late-arriving screenshot. Navigation steps have no frame
    /// worth keeping, so the capture is dropped there.
    pub(crate) fn attach_screenshot(&mut self, data: String) {
        if let Step::Click { screenshot, .. } = self {
            *screenshot = Some(data);
        }
    }
}

/// The record of one recording span: metadata plus the ordered step
/// sequence. Exists iff the recording state is not idle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Refreshed on every step so single-page-app navigation keeps these
    /// fields current.
    pub page_url: String,
    pub page_title: String,
    pub steps: Vec<Step>,
    /// Config snapshot attached when the generation handoff fires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<HandoffSettings>,
}

impl Session {
    pub fn new(page_url: impl Into<String>, page_title: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            start_time: Utc::now(),
            end_time: None,
            page_url: page_url.into(),
            page_title: page_title.into(),
            steps: Vec::new(),
            config: None,
        }
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}
