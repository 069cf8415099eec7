//! # Salat
//!
//! Prayer time scheduling engine for a menu-bar utility: resolves a
//! day's "HH:MM" prayer times into a continuously-updating next-prayer
//! state machine with a second-resolution countdown, day-rollover
//! handling and exactly-once notification delivery per prayer per day.
//!
//! Fetching the schedule, the OS location flow and OS notification
//! delivery are external collaborators; this crate consumes a
//! [`ScheduleData`] once delivered and hands [`NotificationRequest`]s to
//! a [`NotificationSink`].
//!
//! ## Usage
//!
//! ```rust
//! use chrono::Utc;
//! use salat::prelude::*;
//!
//! let schedule: ScheduleData = serde_json::from_str(
//!     r#"{"timings":{"Fajr":"04:30","Dhuhr":"12:00","Isha":"19:15"},
//!         "timezone":"Asia/Jakarta"}"#,
//! ).unwrap();
//!
//! let mut core = SessionCore::new(NotificationPolicy { enabled: true, permitted: true });
//! core.load(schedule, Utc::now()).unwrap();
//! let outcome = core.tick(Utc::now());
//! assert!(outcome.next.is_some());
//! ```

pub mod clock;
pub mod countdown;
pub mod notify;
pub mod schedule;
pub mod session;
pub mod types;

pub use clock::{SalatError, instant_on, parse_clock, resolve_timezone};
pub use countdown::{Countdown, CountdownTick, format_hms, remaining_seconds};
pub use notify::{
    NotificationGate, NotificationPolicy, NotificationRequest, NotificationSink,
    prayer_notification,
};
pub use schedule::{NextPrayerState, ResolvedSchedule, next_prayer, resolve_schedule};
pub use session::{PrayerScheduleSession, SessionCore, SessionSnapshot, TickOutcome};
pub use types::{DEFAULT_TIMEZONE, Prayer, PrayerTime, ScheduleData, Timings};

pub mod prelude {
    pub use crate::clock::{SalatError, parse_clock};
    pub use crate::countdown::format_hms;
    pub use crate::notify::{NotificationPolicy, NotificationRequest, NotificationSink};
    pub use crate::schedule::{NextPrayerState, next_prayer};
    pub use crate::session::{PrayerScheduleSession, SessionCore, SessionSnapshot};
    pub use crate::types::{Prayer, PrayerTime, ScheduleData, Timings};
}
