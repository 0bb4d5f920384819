use std::time::Duration;
use std::{fs, path::PathBuf, sync::RwLock};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tuning knobs for a page observer agent.
///
/// The debounce window and the ancestor-walk bound must exist; their exact
/// values are tuning, which is why they live here instead of in constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObserverSettings {
    /// Clicks on the same target inside this window collapse into one step.
    pub click_debounce_ms: u64,
    /// How many ancestor levels the selector walk may visit.
    pub selector_max_depth: usize,
    /// Length cap on captured text content.
    pub text_snippet_limit: usize,
}

impl Default for ObserverSettings {
    fn default() -> Self {
        Self {
            click_debounce_ms: 500,
            selector_max_depth: 5,
            text_snippet_limit: 50,
        }
    }
}

impl ObserverSettings {
    pub fn click_debounce(&self) -> Duration {
        Duration::from_millis(self.click_debounce_ms)
    }
}

/// Configuration snapshot handed to the generation stage with a completed
/// session. An empty `api_key` disables the handoff entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HandoffSettings {
    pub api_key: String,
    pub base_url: String,
    pub model_name: String,
    pub smart_description: bool,
}

impl Default for HandoffSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".into(),
            model_name: "gpt-3.5-turbo".into(),
            smart_description: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecorderSettings {
    pub observer: ObserverSettings,
    pub handoff: HandoffSettings,
    /// Bounded wait on commands sent to a page observer, milliseconds.
    pub observer_command_timeout_ms: Option<u64>,
}

impl RecorderSettings {
    pub fn observer_command_timeout(&self) -> Duration {
        Duration::from_millis(self.observer_command_timeout_ms.unwrap_or(2000))
    }
}

/// Settings store shared across the coordinator and embedder.
///
/// File-backed when given a path; unreadable or missing files fall back to
/// defaults rather than failing startup.
pub struct SettingsStore {
    path: Option<PathBuf>,
    data: RwLock<RecorderSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            RecorderSettings::default()
        };

        Ok(Self {
            path: Some(path),
            data: RwLock::new(data),
        })
    }

    pub fn in_memory(data: RecorderSettings) -> Self {
        Self {
            path: None,
            data: RwLock::new(data),
        }
    }

    pub fn observer(&self) -> ObserverSettings {
        self.data.read().unwrap().observer.clone()
    }

    pub fn handoff(&self) -> HandoffSettings {
        self.data.read().unwrap().handoff.clone()
    }

    pub fn observer_command_timeout(&self) -> Duration {
        self.data.read().unwrap().observer_command_timeout()
    }

    pub fn update_handoff(&self, handoff: HandoffSettings) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.handoff = handoff;
        self.persist(&guard)
    }

    fn persist(&self, data: &RecorderSettings) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::in_memory(RecorderSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_tuning() {
        let settings = RecorderSettings::default();
        assert_eq!(settings.observer.click_debounce_ms, 500);
        assert_eq!(settings.observer.selector_max_depth, 5);
        assert_eq!(settings.observer.text_snippet_limit, 50);
        assert!(settings.handoff.api_key.is_empty());
        assert!(settings.handoff.smart_description);
        assert_eq!(
            settings.observer_command_timeout(),
            Duration::from_millis(2000)
        );
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let store = SettingsStore::new(PathBuf::from("/nonexistent/pagescribe-settings.json"))
            .expect("missing file is not an error");
        assert_eq!(store.observer().click_debounce_ms, 500);
    }

    #[test]
    fn partial_settings_file_keeps_defaults_for_the_rest() {
        let parsed: RecorderSettings =
            serde_json::from_str(r#"{"observer":{"clickDebounceMs":250}}"#).unwrap();
        assert_eq!(parsed.observer.click_debounce_ms, 250);
        assert_eq!(parsed.observer.selector_max_depth, 5);
        assert_eq!(parsed.handoff.base_url, "https://api.openai.com/v1");
    }
}
