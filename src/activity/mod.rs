use crate::clock::Timestamp;
use crate::models::TabId;
use std::collections::HashMap;

/// Returned for tabs with no recorded activity; such tabs count as inactive
/// for as long as the clock has been running.
pub const NEVER_ACTIVE: Timestamp = 0;

/// Last observed activity per tab.
#[derive(Debug, Default)]
pub struct ActivityStore {
    last_active: HashMap<TabId, Timestamp>,
}

impl ActivityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_activity(&mut self, tab_id: TabId, now: Timestamp) {
        self.last_active.insert(tab_id, now);
    }

    pub fn last_active(&self, tab_id: TabId) -> Timestamp {
        self.last_active.get(&tab_id).copied().unwrap_or(NEVER_ACTIVE)
    }

    pub fn contains(&self, tab_id: TabId) -> bool {
        self.last_active.contains_key(&tab_id)
    }

    pub fn forget(&mut self, tab_id: TabId) {
        self.last_active.remove(&tab_id);
    }

    /// Tracked tabs with their timestamps, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (TabId, Timestamp)> + '_ {
        self.last_active.iter().map(|(id, ts)| (*id, *ts))
    }

    pub fn tab_ids(&self) -> Vec<TabId> {
        let mut ids: Vec<TabId> = self.last_active.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.last_active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_active.is_empty()
    }
}
