//! Exemption predicates consulted before a tab is closed.
//!
//! Each predicate looks at one property of a tab snapshot and never fails:
//! unparseable URLs count as "not protected" and "not an installed app".

use crate::constants::TAB_GROUP_ID_NONE;
use crate::models::{DisplayMode, ProtectedDomains, Tab};
use url::Url;

/// URL schemes that belong to the browser or its extensions rather than to
/// ordinary web pages.
const APP_SCHEMES: &[&str] = &[
    "chrome-extension",
    "moz-extension",
    "chrome",
    "edge",
    "brave",
];

pub fn is_pinned(tab: &Tab) -> bool {
    tab.pinned
}

pub fn is_grouped(tab: &Tab) -> bool {
    tab.group_id != TAB_GROUP_ID_NONE
}

pub fn is_audible(tab: &Tab) -> bool {
    tab.audible
}

/// Tabs the engine keeps an activity record and a timer for.
pub fn is_trackable(tab: &Tab) -> bool {
    !is_pinned(tab) && !is_grouped(tab)
}

/// Whether the URL's host equals a protected entry or is a subdomain of one.
pub fn is_protected_domain(url: &str, protected: &ProtectedDomains) -> bool {
    if protected.is_empty() {
        return false;
    }
    let Some(host) = hostname(url) else {
        return false;
    };

    protected.iter().any(|domain| host_matches(&host, domain))
}

fn hostname(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.trim_end_matches('.').to_lowercase();
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

fn host_matches(host: &str, domain: &str) -> bool {
    let domain = domain.to_lowercase();
    host == domain
        || host
            .strip_suffix(domain.as_str())
            .is_some_and(|rest| rest.ends_with('.'))
}

/// Heuristic for installed web apps and browser/extension pages.
///
/// Any of these is enough: an extension or browser-internal scheme, an
/// app marker in the query string (`mode=app` or an `app` parameter), or a
/// standalone, fullscreen, or minimal-ui display mode.
pub fn is_installed_app(tab: &Tab) -> bool {
    if matches!(
        tab.display_mode,
        Some(DisplayMode::Standalone | DisplayMode::Fullscreen | DisplayMode::MinimalUi)
    ) {
        return true;
    }

    let Some(url) = tab.url.as_deref() else {
        return false;
    };
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    if APP_SCHEMES.contains(&parsed.scheme()) {
        return true;
    }

    parsed
        .query_pairs()
        .any(|(key, value)| (key == "mode" && value == "app") || key == "app")
}

/// Tabs the bulk-close command must leave open.
pub fn is_exempt_from_bulk_close(tab: &Tab, protected: &ProtectedDomains) -> bool {
    is_pinned(tab)
        || is_grouped(tab)
        || tab
            .url
            .as_deref()
            .is_some_and(|url| is_protected_domain(url, protected))
        || is_installed_app(tab)
}
