use crate::constants::TAB_GROUP_ID_NONE;
use serde::{Deserialize, Serialize};

pub type TabId = i64;
pub type WindowId = i64;

/// How the browser renders the page. Installed web apps report something
/// other than `browser`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    Browser,
    Standalone,
    Fullscreen,
    MinimalUi,
    #[serde(other)]
    Unknown,
}

/// Snapshot of a browser tab as reported by the extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: TabId,
    pub window_id: WindowId,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default = "ungrouped")]
    pub group_id: i64,
    #[serde(default)]
    pub audible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_mode: Option<DisplayMode>,
}

fn ungrouped() -> i64 {
    TAB_GROUP_ID_NONE
}

impl Tab {
    /// A plain, unpinned, ungrouped, silent tab.
    pub fn new(id: TabId, window_id: WindowId, url: &str) -> Self {
        Self {
            id,
            window_id,
            active: false,
            pinned: false,
            group_id: TAB_GROUP_ID_NONE,
            audible: false,
            url: Some(url.to_string()),
            display_mode: None,
        }
    }
}

/// The subset of a tab update the engine reacts to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
}

impl TabChange {
    /// Navigation finished loading.
    pub fn is_complete(&self) -> bool {
        self.status.as_deref() == Some("complete")
    }

    /// Pin or group state changed, so tracking membership may have changed.
    pub fn changes_membership(&self) -> bool {
        self.pinned.is_some() || self.group_id.is_some()
    }
}
