use serde::{Serialize, Deserialize};
use smallvec::SmallVec;
use std::fmt;

/// IANA timezone used when the schedule source omits one.
pub const DEFAULT_TIMEZONE: &str = "Asia/Jakarta";

/// The fixed set of daily prayer events delivered by the schedule source.
///
/// The declared order (Fajr .. Imsak) is the source's display and
/// tie-break order, NOT chronological: Imsak precedes Fajr on the clock.
/// Never assume chronological adjacency between neighbours here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prayer {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Sunset,
    Maghrib,
    Isha,
    Imsak,
}

impl Prayer {
    /// All prayers in declared order.
    pub const ALL: [Prayer; 8] = [
        Prayer::Fajr,
        Prayer::Sunrise,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Sunset,
        Prayer::Maghrib,
        Prayer::Isha,
        Prayer::Imsak,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Sunrise => "Sunrise",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Sunset => "Sunset",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
            Prayer::Imsak => "Imsak",
        }
    }

    /// Display icon shown in menu rows and notification titles.
    pub fn icon(&self) -> &'static str {
        match self {
            Prayer::Fajr => "🌅",
            Prayer::Sunrise => "🌄",
            Prayer::Dhuhr => "☀️",
            Prayer::Asr => "🌤️",
            Prayer::Sunset => "🌅",
            Prayer::Maghrib => "🌆",
            Prayer::Isha => "🌙",
            Prayer::Imsak => "🤲",
        }
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One prayer with its raw clock time, as handed to display surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrayerTime {
    pub prayer: Prayer,
    /// Raw "HH:MM" string as delivered by the source.
    pub time: String,
    pub icon: &'static str,
}

/// Raw daily prayer clock times as delivered by the schedule source.
///
/// Fields default to empty strings so partial payloads deserialize;
/// empty or malformed entries are skipped during resolution rather than
/// failing the whole schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timings {
    #[serde(rename = "Fajr", default)]
    pub fajr: String,
    #[serde(rename = "Sunrise", default)]
    pub sunrise: String,
    #[serde(rename = "Dhuhr", default)]
    pub dhuhr: String,
    #[serde(rename = "Asr", default)]
    pub asr: String,
    #[serde(rename = "Sunset", default)]
    pub sunset: String,
    #[serde(rename = "Maghrib", default)]
    pub maghrib: String,
    #[serde(rename = "Isha", default)]
    pub isha: String,
    #[serde(rename = "Imsak", default)]
    pub imsak: String,
}

impl Timings {
    /// Returns the raw clock string for one prayer.
    pub fn get(&self, prayer: Prayer) -> &str {
        match prayer {
            Prayer::Fajr => &self.fajr,
            Prayer::Sunrise => &self.sunrise,
            Prayer::Dhuhr => &self.dhuhr,
            Prayer::Asr => &self.asr,
            Prayer::Sunset => &self.sunset,
            Prayer::Maghrib => &self.maghrib,
            Prayer::Isha => &self.isha,
            Prayer::Imsak => &self.imsak,
        }
    }

    /// All entries in declared order, for display surfaces.
    pub fn all_prayer_times(&self) -> SmallVec<[PrayerTime; 8]> {
        Prayer::ALL
            .iter()
            .map(|&prayer| PrayerTime {
                prayer,
                time: self.get(prayer).to_string(),
                icon: prayer.icon(),
            })
            .collect()
    }
}

/// The schedule payload consumed by the session: one day's timings plus
/// the optional IANA timezone the source resolved them in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleData {
    pub timings: Timings,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl ScheduleData {
    pub fn new(timings: Timings) -> Self {
        Self { timings, timezone: None }
    }

    pub fn with_timezone(timings: Timings, timezone: impl Into<String>) -> Self {
        Self { timings, timezone: Some(timezone.into()) }
    }
}
