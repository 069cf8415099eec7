//! Notification gating and the external sink boundary.
//!
//! The gate guarantees at most one notification per prayer per local
//! calendar day, independent of tick granularity or resolver re-entry.
//! Actual delivery (OS permission state included) lives behind
//! [`NotificationSink`].

use chrono::{DateTime, NaiveDate, Utc};
use smallvec::SmallVec;

use crate::clock::SalatError;
use crate::types::Prayer;

/// Environment-supplied delivery flags. The OS permission flow is an
/// external collaborator; the engine only consults the resulting booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NotificationPolicy {
    /// User toggle: notifications globally enabled.
    pub enabled: bool,
    /// OS permission has been granted.
    pub permitted: bool,
}

impl NotificationPolicy {
    pub fn allows(&self) -> bool {
        self.enabled && self.permitted
    }
}

/// A delivery request handed to the external sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    /// `None` means deliver immediately.
    pub deliver_at: Option<DateTime<Utc>>,
}

/// The external notification delivery mechanism.
///
/// Dispatch failures are reported upward but never roll back the gate:
/// a notification counts as attempted, so a rejecting sink cannot cause
/// a retry storm on every subsequent tick.
pub trait NotificationSink: Send {
    fn deliver(&mut self, request: NotificationRequest) -> Result<(), SalatError>;
}

/// Builds the request for a prayer reaching its time, formatted the way
/// the menu-bar app presents it.
pub fn prayer_notification(prayer: Prayer, clock_time: &str) -> NotificationRequest {
    NotificationRequest {
        title: format!("Prayer Time: {} {}", prayer, prayer.icon()),
        body: format!("It's time for {} prayer ({})", prayer, clock_time),
        deliver_at: None,
    }
}

/// Exactly-once-per-day notification bookkeeping.
///
/// The notified set is keyed by local calendar day: a stale day clears
/// implicitly, so a prayer notified yesterday can always be notified
/// again today even if the explicit rollover reset never ran (e.g. the
/// process slept across midnight). `last_notified` additionally guards
/// the same zero-crossing tick against rapid resolver re-entry.
#[derive(Debug, Clone, Default)]
pub struct NotificationGate {
    day: Option<NaiveDate>,
    notified: SmallVec<[Prayer; 8]>,
    last_notified: Option<Prayer>,
}

impl NotificationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff `prayer` has not yet been notified on `day`.
    pub fn should_notify(&self, prayer: Prayer, day: NaiveDate) -> bool {
        if self.day != Some(day) {
            return true;
        }
        !self.notified.contains(&prayer)
    }

    /// Records an attempted notification for `prayer` on `day`.
    pub fn mark_notified(&mut self, prayer: Prayer, day: NaiveDate) {
        if self.day != Some(day) {
            self.notified.clear();
            self.last_notified = None;
            self.day = Some(day);
        }
        if !self.notified.contains(&prayer) {
            self.notified.push(prayer);
        }
        self.last_notified = Some(prayer);
    }

    /// The prayer most recently notified within the current day.
    pub fn last_notified(&self) -> Option<Prayer> {
        self.last_notified
    }

    /// The prayer most recently notified on `day`; `None` once the day
    /// has rolled over, so the same-name guard never leaks across days.
    pub fn last_notified_on(&self, day: NaiveDate) -> Option<Prayer> {
        if self.day == Some(day) { self.last_notified } else { None }
    }

    /// Clears all bookkeeping at a day rollover. Invoked by the session
    /// when the resolver wraps to the following calendar day; the
    /// day-keyed set above is the backstop when it cannot be.
    pub fn reset_for_new_day(&mut self) {
        self.day = None;
        self.notified.clear();
        self.last_notified = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_notify_once_per_day() {
        let mut gate = NotificationGate::new();
        assert!(gate.should_notify(Prayer::Fajr, day(15)));
        gate.mark_notified(Prayer::Fajr, day(15));
        assert!(!gate.should_notify(Prayer::Fajr, day(15)));
        assert!(gate.should_notify(Prayer::Dhuhr, day(15)));
    }

    #[test]
    fn test_reset_allows_renotification() {
        let mut gate = NotificationGate::new();
        gate.mark_notified(Prayer::Isha, day(15));
        gate.reset_for_new_day();
        assert!(gate.should_notify(Prayer::Isha, day(16)));
        assert_eq!(gate.last_notified(), None);
    }

    #[test]
    fn test_stale_day_clears_implicitly() {
        // No explicit reset: the day key alone must unblock day two.
        let mut gate = NotificationGate::new();
        gate.mark_notified(Prayer::Fajr, day(15));
        assert!(gate.should_notify(Prayer::Fajr, day(16)));
        gate.mark_notified(Prayer::Fajr, day(16));
        assert!(!gate.should_notify(Prayer::Fajr, day(16)));
        // Yesterday's entries are gone, not merged.
        assert!(gate.should_notify(Prayer::Dhuhr, day(16)));
    }

    #[test]
    fn test_day_change_clears_last_notified() {
        // A single-entry schedule tracks the same prayer on consecutive
        // days; the same-name guard must not block day two.
        let mut gate = NotificationGate::new();
        gate.mark_notified(Prayer::Fajr, day(15));
        assert_eq!(gate.last_notified(), Some(Prayer::Fajr));
        // Queried against the new day, the same-name guard is inert.
        assert_eq!(gate.last_notified_on(day(16)), None);
        gate.mark_notified(Prayer::Fajr, day(16));
        assert_eq!(gate.last_notified_on(day(16)), Some(Prayer::Fajr));
        assert!(!gate.should_notify(Prayer::Fajr, day(16)));
    }

    #[test]
    fn test_policy_requires_both_flags() {
        assert!(!NotificationPolicy { enabled: true, permitted: false }.allows());
        assert!(!NotificationPolicy { enabled: false, permitted: true }.allows());
        assert!(NotificationPolicy { enabled: true, permitted: true }.allows());
        assert!(!NotificationPolicy::default().allows());
    }

    #[test]
    fn test_prayer_notification_content() {
        let request = prayer_notification(Prayer::Maghrib, "18:00");
        assert_eq!(request.title, "Prayer Time: Maghrib 🌆");
        assert_eq!(request.body, "It's time for Maghrib prayer (18:00)");
        assert!(request.deliver_at.is_none());
    }
}
