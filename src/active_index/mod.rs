use crate::models::{TabId, WindowId};
use std::collections::HashMap;

/// Which tab is in the foreground of each window.
///
/// A tab normally belongs to one window, but nothing here relies on that:
/// entries are last-write-wins per window and reverse lookups scan every
/// window.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ActiveIndex {
    by_window: HashMap<WindowId, TabId>,
}

impl ActiveIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_active(&mut self, window_id: WindowId, tab_id: TabId) {
        self.by_window.insert(window_id, tab_id);
    }

    pub fn active_in(&self, window_id: WindowId) -> Option<TabId> {
        self.by_window.get(&window_id).copied()
    }

    /// True if the tab is the foreground tab of any window, focused or not.
    pub fn is_active_anywhere(&self, tab_id: TabId) -> bool {
        self.by_window.values().any(|active| *active == tab_id)
    }

    pub fn remove_window(&mut self, window_id: WindowId) {
        self.by_window.remove(&window_id);
    }

    pub fn remove_tab_everywhere(&mut self, tab_id: TabId) {
        self.by_window.retain(|_, active| *active != tab_id);
    }

    pub fn clear(&mut self) {
        self.by_window.clear();
    }

    pub fn len(&self) -> usize {
        self.by_window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_window.is_empty()
    }
}
