use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;

use crate::observer::ObserverHandle;

/// URI scheme prefixes recording must refuse before it ever tries to arm an
/// observer: privileged browser surfaces no agent can be injected into.
pub const RESTRICTED_SCHEMES: &[&str] = &["chrome://", "chrome-extension://", "edge://", "about:"];

pub fn restricted_scheme(url: &str) -> Option<&'static str> {
    RESTRICTED_SCHEMES
        .iter()
        .copied()
        .find(|prefix| url.starts_with(prefix))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    pub url: String,
    pub title: String,
}

struct TargetRecord {
    info: TargetInfo,
    observer: Option<ObserverHandle>,
}

/// Registry of recordable documents, keyed by an opaque target id. Plays the
/// role the host's tab API played: the coordinator resolves a target here
/// before starting, and unknown ids are simply unreachable.
#[derive(Default)]
pub struct TargetDirectory {
    records: Mutex<HashMap<String, TargetRecord>>,
}

impl TargetDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, target_id: impl Into<String>, info: TargetInfo) {
        self.records.lock().unwrap().insert(
            target_id.into(),
            TargetRecord {
                info,
                observer: None,
            },
        );
    }

    /// Associates a spawned observer agent with a registered target. A
    /// target without one behaves like a page whose agent never loaded.
    pub fn attach_observer(&self, target_id: &str, observer: ObserverHandle) {
        if let Some(record) = self.records.lock().unwrap().get_mut(target_id) {
            record.observer = Some(observer);
        }
    }

    pub fn update_info(&self, target_id: &str, info: TargetInfo) {
        if let Some(record) = self.records.lock().unwrap().get_mut(target_id) {
            record.info = info;
        }
    }

    pub fn remove(&self, target_id: &str) {
        self.records.lock().unwrap().remove(target_id);
    }

    pub fn resolve(&self, target_id: &str) -> Option<(TargetInfo, Option<ObserverHandle>)> {
        self.records
            .lock()
            .unwrap()
            .get(target_id)
            .map(|record| (record.info.clone(), record.observer.clone()))
    }
}
