//! Tab lifecycle engine.
//!
//! Owns the activity store, the window-active index, and the expiration
//! timers. Every public handler is total: failures talking to the browser or
//! the settings store are logged and only abandon the event at hand.

pub mod bulk;
pub mod decision;

pub use bulk::select_tabs_to_close;
pub use decision::{decide, Decision, FireSnapshot, RescheduleReason};

use crate::active_index::ActiveIndex;
use crate::activity::ActivityStore;
use crate::clock::{Clock, SystemClock, Timestamp};
use crate::error::{AppError, Result};
use crate::host::TabHost;
use crate::models::settings::{inactivity_limit_ms, SettingsStore};
use crate::models::{ProtectedDomains, Settings, Tab, TabChange, TabId, WindowId};
use crate::policy;
use crate::scheduler::{timer_name, ExpirationScheduler};
use log::{debug, info, warn};
use std::collections::HashSet;

pub struct TabLifecycle<H, S, C = SystemClock> {
    host: H,
    store: S,
    clock: C,
    settings: Settings,
    activity: ActivityStore,
    active: ActiveIndex,
    scheduler: ExpirationScheduler,
}

fn report(operation: &str, err: &AppError) {
    if err.is_not_found() {
        debug!("Abandoning {operation}: {err}");
    } else {
        warn!("Failed to {operation}: {err}");
    }
}

impl<H: TabHost, S: SettingsStore> TabLifecycle<H, S, SystemClock> {
    pub fn new(host: H, store: S) -> Self {
        Self::with_clock(host, store, SystemClock)
    }
}

impl<H: TabHost, S: SettingsStore, C: Clock> TabLifecycle<H, S, C> {
    pub fn with_clock(host: H, store: S, clock: C) -> Self {
        Self {
            host,
            store,
            clock,
            settings: Settings::default(),
            activity: ActivityStore::new(),
            active: ActiveIndex::new(),
            scheduler: ExpirationScheduler::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Cached settings as of the last load or change notification.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn activity(&self) -> &ActivityStore {
        &self.activity
    }

    pub fn active_index(&self) -> &ActiveIndex {
        &self.active
    }

    pub fn scheduler(&self) -> &ExpirationScheduler {
        &self.scheduler
    }

    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.scheduler.next_deadline()
    }

    /// Milliseconds until the earliest timer is due, zero if already overdue.
    pub fn millis_until_next_deadline(&self) -> Option<i64> {
        let now = self.clock.now();
        self.next_deadline()
            .map(|deadline| deadline.saturating_sub(now).max(0))
    }

    pub fn is_tracked(&self, tab_id: TabId) -> bool {
        self.activity.contains(tab_id)
    }

    /// Rebuild all in-memory state from the browser's live tabs and windows.
    ///
    /// Safe to run repeatedly: the window index is re-seeded, known
    /// timestamps are kept, and each tracked tab ends up with one timer.
    pub fn initialize(&mut self) {
        self.reload_settings();
        if let Err(e) = self.try_initialize() {
            report("initialize tab tracking", &e);
        }
    }

    fn try_initialize(&mut self) -> Result<()> {
        let windows = self.host.list_windows()?;
        let tabs = self.host.query_tabs(None)?;

        self.active.clear();
        for window_id in windows {
            let foreground = tabs
                .iter()
                .find(|tab| tab.window_id == window_id && tab.active);
            if let Some(tab) = foreground {
                self.active.set_active(window_id, tab.id);
            }
        }

        let trackable: Vec<&Tab> = tabs.iter().filter(|tab| policy::is_trackable(tab)).collect();
        let live: HashSet<TabId> = trackable.iter().map(|tab| tab.id).collect();

        for tab_id in self.activity.tab_ids() {
            if !live.contains(&tab_id) {
                self.untrack(tab_id);
            }
        }

        let now = self.clock.now();
        for tab in trackable {
            if !self.activity.contains(tab.id) {
                self.activity.record_activity(tab.id, now);
            }
            self.arm_from_last_active(tab.id);
        }

        info!(
            "Tracking {} tabs across {} windows",
            self.activity.len(),
            self.active.len()
        );
        Ok(())
    }

    fn reload_settings(&mut self) {
        match self.store.load_settings() {
            Ok(settings) => self.settings = settings,
            Err(e) => warn!("Failed to load settings, keeping cached values: {e}"),
        }
    }

    /// The window's entry moves to `tab_id` before the tab is looked up, so a
    /// failed lookup only skips the activity refresh.
    pub fn on_tab_activated(
        &mut self,
        tab_id: TabId,
        window_id: WindowId,
        previous_tab_id: Option<TabId>,
    ) {
        let previous = previous_tab_id
            .or_else(|| self.active.active_in(window_id))
            .filter(|previous| *previous != tab_id);
        self.active.set_active(window_id, tab_id);

        match self.host.get_tab(tab_id) {
            Ok(Some(tab)) => self.touch(&tab),
            Ok(None) => {
                debug!("Activated tab {tab_id} no longer exists");
                self.active.remove_tab_everywhere(tab_id);
            }
            Err(e) => report("handle tab activation", &e),
        }

        // The tab being left was in use until now
        if let Some(previous) = previous {
            if let Err(e) = self.refresh_tab(previous) {
                report("refresh previously active tab", &e);
            }
        }
    }

    fn refresh_tab(&mut self, tab_id: TabId) -> Result<()> {
        let tab = self
            .host
            .get_tab(tab_id)?
            .ok_or(AppError::NotFound { entity: "Tab" })?;
        self.touch(&tab);
        Ok(())
    }

    /// Record activity now and re-arm, or drop tracking if the tab is no
    /// longer eligible.
    fn touch(&mut self, tab: &Tab) {
        if policy::is_trackable(tab) {
            self.activity.record_activity(tab.id, self.clock.now());
            self.arm_from_last_active(tab.id);
        } else {
            self.untrack(tab.id);
        }
    }

    /// Membership changes (pin/group) and activity refresh (navigation
    /// complete) are handled independently.
    pub fn on_tab_updated(&mut self, tab_id: TabId, change: &TabChange) {
        if !change.changes_membership() && !change.is_complete() {
            return;
        }
        if let Err(e) = self.try_tab_updated(tab_id, change) {
            report("handle tab update", &e);
        }
    }

    fn try_tab_updated(&mut self, tab_id: TabId, change: &TabChange) -> Result<()> {
        let tab = self
            .host
            .get_tab(tab_id)?
            .ok_or(AppError::NotFound { entity: "Tab" })?;

        if !policy::is_trackable(&tab) {
            if self.activity.contains(tab_id) {
                debug!("Tab {tab_id} pinned or grouped, no longer tracked");
            }
            self.untrack(tab_id);
            return Ok(());
        }

        if change.is_complete() || !self.activity.contains(tab_id) {
            self.activity.record_activity(tab_id, self.clock.now());
        }
        self.arm_from_last_active(tab_id);
        Ok(())
    }

    pub fn on_tab_removed(&mut self, tab_id: TabId) {
        self.untrack(tab_id);
        self.active.remove_tab_everywhere(tab_id);
    }

    pub fn on_window_removed(&mut self, window_id: WindowId) {
        self.active.remove_window(window_id);
    }

    /// Fire every timer whose deadline has passed.
    pub fn fire_due_timers(&mut self) {
        let now = self.clock.now();
        for tab_id in self.scheduler.take_due(now) {
            self.on_timer_fired(tab_id);
        }
    }

    /// Evaluate a tab whose expiration timer fired and act on the decision.
    pub fn on_timer_fired(&mut self, tab_id: TabId) -> Decision {
        // Fired timers are consumed
        self.scheduler.cancel(tab_id);

        let tab = match self.host.get_tab(tab_id) {
            Ok(tab) => tab,
            Err(e) => {
                report(&format!("look up tab {tab_id} for {}", timer_name(tab_id)), &e);
                return Decision::Drop;
            }
        };

        let active_anywhere = self.active.is_active_anywhere(tab_id);
        let protected = if tab.is_some() && !active_anywhere {
            self.current_protected_domains()
        } else {
            self.settings.protected_domains.clone()
        };

        let decision = decide(&FireSnapshot {
            tab: tab.as_ref(),
            active_anywhere,
            last_active: self.activity.last_active(tab_id),
            now: self.clock.now(),
            limit_ms: self.settings.inactivity_limit_ms(),
            protected: &protected,
        });

        self.apply(tab_id, decision);
        decision
    }

    fn apply(&mut self, tab_id: TabId, decision: Decision) {
        match decision {
            Decision::Drop => debug!("Tab {tab_id} is gone, dropping its timer"),
            Decision::KeepActive => debug!("Tab {tab_id} is active in a window, not closing"),
            Decision::Reschedule { at, reason } => {
                debug!("Rescheduling tab {tab_id} ({reason:?})");
                self.scheduler.arm(tab_id, at);
            }
            Decision::Untrack => {
                debug!("Tab {tab_id} pinned or grouped, untracking");
                self.untrack(tab_id);
            }
            Decision::Close => {
                info!("Closing inactive tab {tab_id}");
                match self.host.remove_tabs(&[tab_id]) {
                    Ok(()) => self.untrack(tab_id),
                    Err(e) => {
                        report(&format!("close tab {tab_id}"), &e);
                        // Still expired, so the next firing tries again
                        let retry_at = self
                            .clock
                            .now()
                            .saturating_add(self.settings.inactivity_limit_ms());
                        self.scheduler.arm(tab_id, retry_at);
                    }
                }
            }
        }
    }

    /// Close every other eligible tab in the invoking tab's window.
    /// Returns the ids handed to the browser for removal.
    pub fn close_other_tabs(&mut self, invoking_tab: &Tab) -> Vec<TabId> {
        match self.try_close_other_tabs(invoking_tab) {
            Ok(closed) => closed,
            Err(e) => {
                report("close other tabs", &e);
                Vec::new()
            }
        }
    }

    fn try_close_other_tabs(&mut self, invoking_tab: &Tab) -> Result<Vec<TabId>> {
        let tabs = self.host.query_tabs(Some(invoking_tab.window_id))?;
        let protected = self.current_protected_domains();

        let to_close = select_tabs_to_close(&tabs, invoking_tab.id, &protected);
        if !to_close.is_empty() {
            info!(
                "Closing {} tabs in window {}",
                to_close.len(),
                invoking_tab.window_id
            );
            self.host.remove_tabs(&to_close)?;
        }
        Ok(to_close)
    }

    /// Apply a new inactivity limit. Every tracked tab is re-armed against
    /// its existing last-active time, not the current time.
    pub fn on_timeout_changed(&mut self, minutes: i64) {
        if minutes <= 0 {
            warn!("Ignoring non-positive inactivity limit: {minutes}");
            return;
        }
        info!("Inactivity limit changed to {minutes} minutes");
        self.settings.timeout_minutes = minutes;

        let limit_ms = inactivity_limit_ms(minutes);
        for (tab_id, last_active) in self.activity.iter() {
            self.scheduler.arm(tab_id, last_active.saturating_add(limit_ms));
        }
    }

    /// Domains are checked when a timer fires, so no timers move.
    pub fn on_protected_domains_changed(&mut self, domains: ProtectedDomains) {
        info!("Protected domains updated ({} entries)", domains.len());
        self.settings.protected_domains = domains;
    }

    fn current_protected_domains(&mut self) -> ProtectedDomains {
        match self.store.load_protected_domains() {
            Ok(domains) => {
                self.settings.protected_domains = domains.clone();
                domains
            }
            Err(e) => {
                warn!("Failed to read protected domains, using cached list: {e}");
                self.settings.protected_domains.clone()
            }
        }
    }

    fn arm_from_last_active(&mut self, tab_id: TabId) {
        let fire_at = self
            .activity
            .last_active(tab_id)
            .saturating_add(self.settings.inactivity_limit_ms());
        self.scheduler.arm(tab_id, fire_at);
    }

    fn untrack(&mut self, tab_id: TabId) {
        self.activity.forget(tab_id);
        self.scheduler.cancel(tab_id);
    }
}
