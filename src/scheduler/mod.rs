use crate::clock::Timestamp;
use crate::constants::TIMER_NAME_PREFIX;
use crate::models::TabId;
use log::debug;
use std::collections::HashMap;

/// Name of the expiration timer for a tab. Derived from the id alone, so
/// arming the same tab twice always targets the same timer.
pub fn timer_name(tab_id: TabId) -> String {
    format!("{TIMER_NAME_PREFIX}{tab_id}")
}

/// One single-shot timer per tab, keyed by tab id.
///
/// Timers are not run here; the owner polls [`next_deadline`] and collects
/// expired timers with [`take_due`].
///
/// [`next_deadline`]: ExpirationScheduler::next_deadline
/// [`take_due`]: ExpirationScheduler::take_due
#[derive(Debug, Default)]
pub struct ExpirationScheduler {
    timers: HashMap<TabId, Timestamp>,
}

impl ExpirationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace the tab's timer.
    pub fn arm(&mut self, tab_id: TabId, fire_at: Timestamp) {
        debug!("Arming {} at {}", timer_name(tab_id), fire_at);
        self.timers.insert(tab_id, fire_at);
    }

    /// Remove the tab's timer. No-op when none is armed.
    pub fn cancel(&mut self, tab_id: TabId) {
        if self.timers.remove(&tab_id).is_some() {
            debug!("Cleared {}", timer_name(tab_id));
        }
    }

    pub fn deadline(&self, tab_id: TabId) -> Option<Timestamp> {
        self.timers.get(&tab_id).copied()
    }

    pub fn is_armed(&self, tab_id: TabId) -> bool {
        self.timers.contains_key(&tab_id)
    }

    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.timers.values().min().copied()
    }

    /// Remove and return every timer due at `now`, earliest first.
    pub fn take_due(&mut self, now: Timestamp) -> Vec<TabId> {
        let mut due: Vec<(Timestamp, TabId)> = self
            .timers
            .iter()
            .filter(|(_, fire_at)| **fire_at <= now)
            .map(|(tab_id, fire_at)| (*fire_at, *tab_id))
            .collect();
        due.sort_unstable();

        for (_, tab_id) in &due {
            self.timers.remove(tab_id);
        }
        due.into_iter().map(|(_, tab_id)| tab_id).collect()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
