//! Next-prayer resolution.
//!
//! Builds per-day instant mappings from raw clock strings and picks the
//! soonest upcoming prayer, rolling individual entries to the following
//! calendar day once their instant has passed.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use smallvec::SmallVec;

use crate::clock::{instant_on, parse_clock};
use crate::types::{Prayer, Timings};

/// Prayer instants for one calendar day in one timezone.
///
/// Malformed clock strings are absent; at most one instant per prayer.
#[derive(Debug, Clone)]
pub struct ResolvedSchedule {
    date: NaiveDate,
    tz: Tz,
    entries: SmallVec<[(Prayer, DateTime<Tz>); 8]>,
}

impl ResolvedSchedule {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn instant(&self, prayer: Prayer) -> Option<DateTime<Tz>> {
        self.entries
            .iter()
            .find(|(p, _)| *p == prayer)
            .map(|(_, instant)| *instant)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Prayer, DateTime<Tz>)> + '_ {
        self.entries.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Resolves raw timings into absolute instants for `date` in `tz`.
///
/// Entries that fail to parse, or fall into a DST gap on that date, are
/// skipped; the rest of the schedule still resolves.
pub fn resolve_schedule(timings: &Timings, date: NaiveDate, tz: Tz) -> ResolvedSchedule {
    let mut entries = SmallVec::new();
    for prayer in Prayer::ALL {
        let Ok(clock) = parse_clock(timings.get(prayer)) else {
            continue;
        };
        if let Some(instant) = instant_on(clock, date, tz) {
            entries.push((prayer, instant));
        }
    }
    ResolvedSchedule { date, tz, entries }
}

/// The currently tracked target: replaced wholesale at each zero-crossing
/// or when a new schedule arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextPrayerState {
    pub prayer: Prayer,
    /// Absolute instant of the tracked prayer.
    pub target: DateTime<Utc>,
    pub remaining_seconds: i64,
}

/// Picks the soonest upcoming prayer relative to `now`.
///
/// Each entry is evaluated at its clock time on `now`'s calendar day in
/// `tz`; an instant at or before `now` is pushed to the same clock time
/// on the following day. Exact-instant ties go to the earliest-declared
/// prayer. Returns `None` when no entry parses — a valid terminal state,
/// not an error.
pub fn next_prayer(timings: &Timings, now: DateTime<Utc>, tz: Tz) -> Option<NextPrayerState> {
    let today = now.with_timezone(&tz).date_naive();

    let mut soonest: Option<(Prayer, DateTime<Utc>)> = None;
    for prayer in Prayer::ALL {
        let Ok(clock) = parse_clock(timings.get(prayer)) else {
            continue;
        };
        let effective = match instant_on(clock, today, tz).map(|t| t.to_utc()) {
            Some(t) if t > now => t,
            // Already passed today (or swallowed by a DST gap): same clock
            // time tomorrow.
            _ => match today.succ_opt().and_then(|d| instant_on(clock, d, tz)) {
                Some(t) => t.to_utc(),
                None => continue,
            },
        };
        // Strict comparison keeps the earliest-declared prayer on ties.
        match soonest {
            Some((_, best)) if effective >= best => {}
            _ => soonest = Some((prayer, effective)),
        }
    }

    soonest.map(|(prayer, target)| NextPrayerState {
        prayer,
        target,
        remaining_seconds: (target - now).num_seconds().max(0),
    })
}
