//! Session-history model with a single interception hook.
//!
//! The original scattered URL-change detection across a `hashchange`
//! listener, a `popstate` listener, and monkey-patched `pushState` /
//! `replaceState`. Here every trigger funnels through one hook slot: the
//! underlying mutation always runs first, then the hook fires with the new
//! current URL. The agent installs the hook at arm time and removes it at
//! disarm time.

use std::sync::Arc;

pub type NavigationHook = Arc<dyn Fn(&str) + Send + Sync>;

pub struct History {
    entries: Vec<String>,
    index: usize,
    hook: Option<NavigationHook>,
}

impl History {
    pub fn new(initial_url: impl Into<String>) -> Self {
        Self {
            entries: vec![initial_url.into()],
            index: 0,
            hook: None,
        }
    }

    pub fn current_url(&self) -> &str {
        &self.entries[self.index]
    }

    /// Programmatic history mutation, push variant.
    pub fn push_state(&mut self, url: impl Into<String>) {
        self.entries.truncate(self.index + 1);
        self.entries.push(url.into());
        self.index += 1;
        self.fire();
    }

    /// Programmatic history mutation, replace variant.
    pub fn replace_state(&mut self, url: impl Into<String>) {
        self.entries[self.index] = url.into();
        self.fire();
    }

    /// History traversal backwards; no-op at the oldest entry.
    pub fn back(&mut self) {
        if self.index > 0 {
            self.index -= 1;
            self.fire();
        }
    }

    /// History traversal forwards; no-op at the newest entry.
    pub fn forward(&mut self) {
        if self.index + 1 < self.entries.len() {
            self.index += 1;
            self.fire();
        }
    }

    /// Hash-only change. Pushes a new entry, like a browser does, unless the
    /// fragment already matches.
    pub fn set_hash(&mut self, fragment: &str) {
        let current = self.current_url();
        let base = current.split('#').next().unwrap_or(current);
        let url = format!("{base}#{fragment}");
        if url != current {
            self.push_state(url);
        }
    }

    /// Installs the interception hook. At most one hook exists at a time;
    /// installing again overwrites, which keeps arming idempotent.
    pub fn install_hook(&mut self, hook: NavigationHook) {
        self.hook = Some(hook);
    }

    pub fn remove_hook(&mut self) {
        self.hook = None;
    }

    fn fire(&self) {
        if let Some(hook) = &self.hook {
            hook(self.current_url());
        }
    }
}
