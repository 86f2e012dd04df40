// src/constants.rs

/// Inactivity limit used when none is stored, or the stored value is unusable.
pub const DEFAULT_TIMEOUT_MINUTES: i64 = 120;

/// Largest inactivity limit the settings form accepts (24 hours 59 minutes).
pub const MAX_TIMEOUT_MINUTES: i64 = 24 * 60 + 59;

/// Milliseconds in one minute
pub const MILLIS_PER_MINUTE: i64 = 60 * 1000;

/// Group id the browser reports for a tab outside any tab group
pub const TAB_GROUP_ID_NONE: i64 = -1;

/// Settings key holding the inactivity limit in minutes
pub const STORAGE_KEY_INACTIVITY_TIMEOUT_MINUTES: &str = "inactivityTimeoutMinutes";

/// Settings key holding the protected domain list
pub const STORAGE_KEY_PROTECTED_DOMAINS: &str = "protectedDomains";

/// Prefix of expiration timer names; the tab id follows it.
pub const TIMER_NAME_PREFIX: &str = "close-tab-";

/// Chrome limits native messages to 1MB (1024 * 1024 bytes)
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// How long the host waits for the browser to answer a request
pub const REQUEST_TIMEOUT_SECS: u64 = 5;
