use crate::models::{ProtectedDomains, Tab, TabId};
use crate::policy;

/// Tabs the bulk-close command removes: everything in the window except the
/// tab it was invoked from and exempt tabs. Activity is not consulted.
pub fn select_tabs_to_close(
    tabs: &[Tab],
    invoking_tab_id: TabId,
    protected: &ProtectedDomains,
) -> Vec<TabId> {
    tabs.iter()
        .filter(|tab| tab.id != invoking_tab_id)
        .filter(|tab| !policy::is_exempt_from_bulk_close(tab, protected))
        .map(|tab| tab.id)
        .collect()
}
