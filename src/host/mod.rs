use crate::error::Result;
use crate::models::{Tab, TabId, WindowId};

/// Live tab and window state owned by the browser.
///
/// Every call is a round trip to the browser, so the answer may already be
/// stale when it arrives; callers re-check state rather than caching it.
pub trait TabHost {
    /// `Ok(None)` when the tab no longer exists.
    fn get_tab(&mut self, tab_id: TabId) -> Result<Option<Tab>>;

    /// Tabs of one window, or of every window when `window_id` is `None`.
    fn query_tabs(&mut self, window_id: Option<WindowId>) -> Result<Vec<Tab>>;

    fn list_windows(&mut self) -> Result<Vec<WindowId>>;

    fn remove_tabs(&mut self, tab_ids: &[TabId]) -> Result<()>;
}
