use crate::models::{Tab, TabChange, TabId, WindowId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages sent by the extension: forwarded browser events, settings
/// updates, and answers to our requests.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum IncomingMessage {
    #[serde(rename = "startup")]
    Startup,
    #[serde(rename = "installed")]
    Installed,
    #[serde(rename = "tab_activated", rename_all = "camelCase")]
    TabActivated {
        tab_id: TabId,
        window_id: WindowId,
        #[serde(default)]
        previous_tab_id: Option<TabId>,
    },
    #[serde(rename = "tab_updated", rename_all = "camelCase")]
    TabUpdated {
        tab_id: TabId,
        #[serde(default)]
        change_info: TabChange,
    },
    #[serde(rename = "tab_removed", rename_all = "camelCase")]
    TabRemoved { tab_id: TabId },
    #[serde(rename = "window_removed", rename_all = "camelCase")]
    WindowRemoved { window_id: WindowId },
    #[serde(rename = "action_clicked")]
    ActionClicked { tab: Tab },
    /// Minutes, left as raw JSON until validated.
    #[serde(rename = "UPDATE_TIMEOUT")]
    UpdateTimeout { timeout: Value },
    #[serde(rename = "UPDATE_PROTECTED_DOMAINS")]
    UpdateProtectedDomains { domains: Vec<String> },
    #[serde(rename = "response", rename_all = "camelCase")]
    Response {
        request_id: u64,
        #[serde(default)]
        result: Option<Value>,
        #[serde(default)]
        error: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

/// A browser API call the host asks the extension to perform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostOp {
    #[serde(rename_all = "camelCase")]
    GetTab { tab_id: TabId },
    #[serde(rename_all = "camelCase")]
    QueryTabs {
        #[serde(skip_serializing_if = "Option::is_none")]
        window_id: Option<WindowId>,
    },
    GetWindows,
    #[serde(rename_all = "camelCase")]
    RemoveTabs { tab_ids: Vec<TabId> },
}

impl HostOp {
    pub fn name(&self) -> &'static str {
        match self {
            HostOp::GetTab { .. } => "get_tab",
            HostOp::QueryTabs { .. } => "query_tabs",
            HostOp::GetWindows => "get_windows",
            HostOp::RemoveTabs { .. } => "remove_tabs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum OutgoingMessage {
    #[serde(rename = "request", rename_all = "camelCase")]
    Request {
        request_id: u64,
        #[serde(flatten)]
        op: HostOp,
    },
}

/// Window entry returned for `get_windows`; only the id is used.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WindowRef {
    pub id: WindowId,
}
