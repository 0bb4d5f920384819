use std::sync::Mutex;

use super::navigation::{History, NavigationHook};

/// The slice of a document the observer agent can see: current URL, title,
/// and the session history. Shared between the embedding page and its agent;
/// everything else about the document stays on the host side.
pub struct PageContext {
    title: Mutex<String>,
    history: Mutex<History>,
}

impl PageContext {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            title: Mutex::new(title.into()),
            history: Mutex::new(History::new(url)),
        }
    }

    pub fn url(&self) -> String {
        self.history.lock().unwrap().current_url().to_string()
    }

    pub fn title(&self) -> String {
        self.title.lock().unwrap().clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        *self.title.lock().unwrap() = title.into();
    }

    pub fn push_state(&self, url: impl Into<String>) {
        self.history.lock().unwrap().push_state(url);
    }

    pub fn replace_state(&self, url: impl Into<String>) {
        self.history.lock().unwrap().replace_state(url);
    }

    pub fn back(&self) {
        self.history.lock().unwrap().back();
    }

    pub fn forward(&self) {
        self.history.lock().unwrap().forward();
    }

    pub fn set_hash(&self, fragment: &str) {
        self.history.lock().unwrap().set_hash(fragment);
    }

    pub(crate) fn install_navigation_hook(&self, hook: NavigationHook) {
        self.history.lock().unwrap().install_hook(hook);
    }

    pub(crate) fn remove_navigation_hook(&self) {
        self.history.lock().unwrap().remove_hook();
    }
}
