//! Shared test utilities.
//!
//! This module provides common setup functions used across test modules.

#![cfg(test)]

use crate::clock::{Clock, Timestamp};
use crate::db::{migrations, Database};
use crate::error::{AppError, Result};
use crate::host::TabHost;
use crate::models::{Tab, TabId, WindowId};
use std::cell::Cell;
use std::collections::BTreeMap;
use tempfile::{tempdir, TempDir};

/// Create a temporary test database with migrations applied.
///
/// Returns a tuple of (Database, TempDir). The TempDir must be kept alive
/// for the duration of the test to prevent the database file from being deleted.
pub fn setup_test_db() -> (Database, TempDir) {
    let dir = tempdir().expect("Failed to create temp directory for test DB");
    let db_path = dir.path().join("test.db");
    let db = Database::open(&db_path).expect("Failed to open test database");
    migrations::run(db.connection()).expect("Failed to run migrations on test DB");
    (db, dir)
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    pub fn new(now: Timestamp) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn advance_ms(&self, ms: i64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn advance_minutes(&self, minutes: i64) {
        self.advance_ms(minutes * 60 * 1000);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

/// In-memory browser. Removing tabs deletes them and records the call.
#[derive(Debug, Default)]
pub struct FakeHost {
    pub tabs: BTreeMap<TabId, Tab>,
    pub windows: Vec<WindowId>,
    pub removed: Vec<Vec<TabId>>,
    pub fail_removals: bool,
    pub fail_queries: bool,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tabs(tabs: impl IntoIterator<Item = Tab>) -> Self {
        let mut host = Self::new();
        for tab in tabs {
            host.add_tab(tab);
        }
        host
    }

    pub fn add_tab(&mut self, tab: Tab) {
        if !self.windows.contains(&tab.window_id) {
            self.windows.push(tab.window_id);
        }
        self.tabs.insert(tab.id, tab);
    }

    pub fn tab_mut(&mut self, tab_id: TabId) -> &mut Tab {
        self.tabs.get_mut(&tab_id).expect("tab exists in fake host")
    }

    /// Every id passed to `remove_tabs`, flattened.
    pub fn removed_ids(&self) -> Vec<TabId> {
        self.removed.iter().flatten().copied().collect()
    }
}

impl TabHost for FakeHost {
    fn get_tab(&mut self, tab_id: TabId) -> Result<Option<Tab>> {
        if self.fail_queries {
            return Err(AppError::Timeout { operation: "get_tab" });
        }
        Ok(self.tabs.get(&tab_id).cloned())
    }

    fn query_tabs(&mut self, window_id: Option<WindowId>) -> Result<Vec<Tab>> {
        if self.fail_queries {
            return Err(AppError::Timeout { operation: "query_tabs" });
        }
        Ok(self
            .tabs
            .values()
            .filter(|tab| window_id.map_or(true, |w| tab.window_id == w))
            .cloned()
            .collect())
    }

    fn list_windows(&mut self) -> Result<Vec<WindowId>> {
        if self.fail_queries {
            return Err(AppError::Timeout { operation: "get_windows" });
        }
        Ok(self.windows.clone())
    }

    fn remove_tabs(&mut self, tab_ids: &[TabId]) -> Result<()> {
        self.removed.push(tab_ids.to_vec());
        if self.fail_removals {
            return Err(AppError::Host("Tabs cannot be edited right now".into()));
        }
        for tab_id in tab_ids {
            self.tabs.remove(tab_id);
        }
        Ok(())
    }
}
