use crate::clock::Timestamp;
use crate::models::{ProtectedDomains, Tab};
use crate::policy;

/// Why a tab stays open and is checked again later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RescheduleReason {
    /// Activity happened after the timer was armed.
    NotExpired,
    Audible,
    InstalledApp,
    ProtectedDomain,
}

/// Outcome of an expiration timer firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The tab no longer exists.
    Drop,
    /// The tab is the foreground tab of some window. The timer stays unarmed
    /// until the next activity event.
    KeepActive,
    Reschedule { at: Timestamp, reason: RescheduleReason },
    /// Pinned or grouped since the timer was armed: stop tracking.
    Untrack,
    Close,
}

/// State observed when a timer fires.
#[derive(Debug, Clone, Copy)]
pub struct FireSnapshot<'a> {
    pub tab: Option<&'a Tab>,
    pub active_anywhere: bool,
    pub last_active: Timestamp,
    pub now: Timestamp,
    pub limit_ms: i64,
    pub protected: &'a ProtectedDomains,
}

/// Decide what to do with a tab whose timer fired. First match wins.
pub fn decide(snapshot: &FireSnapshot<'_>) -> Decision {
    let Some(tab) = snapshot.tab else {
        return Decision::Drop;
    };

    if snapshot.active_anywhere {
        return Decision::KeepActive;
    }

    let elapsed = snapshot.now.saturating_sub(snapshot.last_active);
    if elapsed < snapshot.limit_ms {
        return Decision::Reschedule {
            at: snapshot.last_active.saturating_add(snapshot.limit_ms),
            reason: RescheduleReason::NotExpired,
        };
    }

    let retry_at = snapshot.now.saturating_add(snapshot.limit_ms);

    if policy::is_audible(tab) {
        return Decision::Reschedule {
            at: retry_at,
            reason: RescheduleReason::Audible,
        };
    }
    if policy::is_installed_app(tab) {
        return Decision::Reschedule {
            at: retry_at,
            reason: RescheduleReason::InstalledApp,
        };
    }

    if policy::is_pinned(tab) || policy::is_grouped(tab) {
        return Decision::Untrack;
    }

    let protected = tab
        .url
        .as_deref()
        .is_some_and(|url| policy::is_protected_domain(url, snapshot.protected));
    if protected {
        return Decision::Reschedule {
            at: retry_at,
            reason: RescheduleReason::ProtectedDomain,
        };
    }

    Decision::Close
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MILLIS_PER_MINUTE;

    const NOW: Timestamp = 1_700_000_000_000;
    const LIMIT: i64 = 120 * MILLIS_PER_MINUTE;

    fn snapshot<'a>(tab: Option<&'a Tab>, protected: &'a ProtectedDomains) -> FireSnapshot<'a> {
        FireSnapshot {
            tab,
            active_anywhere: false,
            last_active: NOW - 121 * MILLIS_PER_MINUTE,
            now: NOW,
            limit_ms: LIMIT,
            protected,
        }
    }

    #[test]
    fn test_closes_expired_plain_tab() {
        let tab = Tab::new(1, 100, "https://example.com");
        let protected = ProtectedDomains::default();
        assert_eq!(decide(&snapshot(Some(&tab), &protected)), Decision::Close);
    }

    #[test]
    fn test_missing_tab_dropped() {
        let protected = ProtectedDomains::default();
        assert_eq!(decide(&snapshot(None, &protected)), Decision::Drop);
    }

    #[test]
    fn test_active_tab_kept_before_duration_math() {
        let tab = Tab::new(1, 100, "https://example.com");
        let protected = ProtectedDomains::default();
        let mut snap = snapshot(Some(&tab), &protected);
        snap.active_anywhere = true;
        snap.last_active = 0;
        assert_eq!(decide(&snap), Decision::KeepActive);
    }

    #[test]
    fn test_stale_firing_reschedules_from_last_active() {
        let tab = Tab::new(1, 100, "https://example.com");
        let protected = ProtectedDomains::default();
        let mut snap = snapshot(Some(&tab), &protected);
        snap.last_active = NOW - 30 * MILLIS_PER_MINUTE;

        assert_eq!(
            decide(&snap),
            Decision::Reschedule {
                at: NOW + 90 * MILLIS_PER_MINUTE,
                reason: RescheduleReason::NotExpired,
            }
        );
    }

    #[test]
    fn test_exactly_at_limit_is_expired() {
        let tab = Tab::new(1, 100, "https://example.com");
        let protected = ProtectedDomains::default();
        let mut snap = snapshot(Some(&tab), &protected);
        snap.last_active = NOW - LIMIT;
        assert_eq!(decide(&snap), Decision::Close);
    }

    #[test]
    fn test_audible_reschedules_into_future() {
        let mut tab = Tab::new(1, 100, "https://example.com");
        tab.audible = true;
        let protected = ProtectedDomains::default();

        match decide(&snapshot(Some(&tab), &protected)) {
            Decision::Reschedule { at, reason } => {
                assert_eq!(reason, RescheduleReason::Audible);
                assert!(at > NOW);
            }
            other => panic!("expected reschedule, got {other:?}"),
        }
    }

    #[test]
    fn test_installed_app_reschedules() {
        let tab = Tab::new(1, 100, "https://example.com/app?mode=app");
        let protected = ProtectedDomains::default();
        assert_eq!(
            decide(&snapshot(Some(&tab), &protected)),
            Decision::Reschedule {
                at: NOW + LIMIT,
                reason: RescheduleReason::InstalledApp,
            }
        );
    }

    #[test]
    fn test_pinned_or_grouped_untracked() {
        let protected = ProtectedDomains::default();

        let mut pinned = Tab::new(1, 100, "https://example.com");
        pinned.pinned = true;
        assert_eq!(decide(&snapshot(Some(&pinned), &protected)), Decision::Untrack);

        let mut grouped = Tab::new(2, 100, "https://example.com");
        grouped.group_id = 5;
        assert_eq!(decide(&snapshot(Some(&grouped), &protected)), Decision::Untrack);
    }

    #[test]
    fn test_audible_wins_over_pinned() {
        let mut tab = Tab::new(1, 100, "https://example.com");
        tab.audible = true;
        tab.pinned = true;
        let protected = ProtectedDomains::default();
        assert!(matches!(
            decide(&snapshot(Some(&tab), &protected)),
            Decision::Reschedule { reason: RescheduleReason::Audible, .. }
        ));
    }

    #[test]
    fn test_protected_domain_reschedules() {
        let tab = Tab::new(1, 100, "https://sub.protected.com/page");
        let protected = ProtectedDomains::from_entries(["protected.com"]);
        assert_eq!(
            decide(&snapshot(Some(&tab), &protected)),
            Decision::Reschedule {
                at: NOW + LIMIT,
                reason: RescheduleReason::ProtectedDomain,
            }
        );
    }

    #[test]
    fn test_invalid_url_still_closes() {
        let mut tab = Tab::new(1, 100, "invalid-url");
        let protected = ProtectedDomains::from_entries(["example.com"]);
        assert_eq!(decide(&snapshot(Some(&tab), &protected)), Decision::Close);

        tab.url = None;
        assert_eq!(decide(&snapshot(Some(&tab), &protected)), Decision::Close);
    }
}
