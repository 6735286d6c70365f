pub mod convert;
pub mod registry;
pub mod schedule;

pub use convert::{MatchdayConverter, TimeError, TimeResult};
pub use registry::{CompetitionRegistry, RegistryError};
pub use schedule::{DayEntry, DayMatch, Fixture};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Domain types — clean model, independent of any provider wire format
// ---------------------------------------------------------------------------

/// Where a competition's "match day" is anchored: its home timezone plus the
/// wall-clock boundary between yesterday's card and today's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionConfig {
    pub id: u32,
    pub name: String,
    pub timezone: Tz,
    #[serde(default)]
    pub day_start: DayStart,
    #[serde(default)]
    pub country: String,
}

impl Default for CompetitionConfig {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            timezone: Tz::UTC,
            day_start: DayStart::default(),
            country: String::new(),
        }
    }
}

/// Time-of-day boundary between two match days, stored as minutes since
/// local midnight. A 06:00 boundary means a 01:00 kickoff still counts as
/// the previous evening's card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DayStart(u16);

impl DayStart {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then(|| Self((hour * 60 + minute) as u16))
    }

    pub fn minutes(self) -> u32 {
        u32::from(self.0)
    }
}

impl Default for DayStart {
    /// 06:00 — the threshold most leagues schedule nothing before.
    fn default() -> Self {
        Self(6 * 60)
    }
}

impl fmt::Display for DayStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for DayStart {
    type Err = ParseDayStartError;

    /// Parses the `"HH:MM"` form used in the competitions seed table.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseDayStartError(s.to_owned());
        let (h, m) = s.split_once(':').ok_or_else(err)?;
        let hour: u32 = h.trim().parse().map_err(|_| err())?;
        let minute: u32 = m.trim().parse().map_err(|_| err())?;
        Self::new(hour, minute).ok_or_else(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDayStartError(String);

impl fmt::Display for ParseDayStartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid day-start time {:?} (expected HH:MM)", self.0)
    }
}

impl std::error::Error for ParseDayStartError {}

impl Serialize for DayStart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayStart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

/// Everything derived from one kickoff timestamp: the absolute instant, its
/// projection into the competition's home zone and the viewer's zone, the
/// canonical competition-day bucket, and viewer-facing display strings.
///
/// `competition_day` is the only field schedule views may group or compare
/// on. `viewer_day` is the naive viewer calendar date and is display-only —
/// grouping on it splits late-night cards across two days.
///
/// `Option` fields are `None` only when the raw timestamp resisted every
/// parse attempt; such a record still converts (to placeholders) so a single
/// bad row never aborts a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub kickoff_utc: Option<DateTime<Utc>>,
    pub tournament_tz: Tz,
    pub tournament_local: Option<NaiveDateTime>,
    pub competition_day: Option<NaiveDate>,
    pub viewer_local: Option<NaiveDateTime>,
    pub viewer_day: Option<NaiveDate>,
    pub display_time: String,
    pub display_date: String,
    pub is_today: bool,
    pub is_tomorrow: bool,
    pub is_yesterday: bool,
}

impl Conversion {
    /// True when the timestamp never parsed at all and the record carries
    /// placeholder display strings instead of real times.
    pub fn is_degraded(&self) -> bool {
        self.kickoff_utc.is_none()
    }
}
