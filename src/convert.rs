use crate::registry::CompetitionRegistry;
use crate::{CompetitionConfig, Conversion, DayStart};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use log::warn;
use std::fmt;

pub type TimeResult<T> = Result<T, TimeError>;

const PLACEHOLDER_TIME: &str = "--:--";
const PLACEHOLDER_DATE: &str = "TBD";

#[derive(Debug)]
pub enum TimeError {
    InvalidTimestamp(String),
    UnknownTimezone(String),
}

impl fmt::Display for TimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeError::InvalidTimestamp(raw) => write!(f, "unparseable timestamp {raw:?}"),
            TimeError::UnknownTimezone(name) => write!(f, "unknown timezone {name:?}"),
        }
    }
}

impl std::error::Error for TimeError {}

// ---------------------------------------------------------------------------
// Parsing and projection primitives
// ---------------------------------------------------------------------------

/// Parse an upstream kickoff timestamp into a UTC instant.
///
/// Providers deliver RFC 3339 with an offset or `Z`; zone-less ISO forms are
/// UTC by upstream convention, never local time.
pub fn parse_kickoff(raw: &str) -> TimeResult<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TimeError::InvalidTimestamp(raw.to_owned()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }

    // Bare dates appear on fixtures announced before kickoff times are set.
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    Err(TimeError::InvalidTimestamp(raw.to_owned()))
}

/// Best-effort parse for inputs the strict parser rejected: epoch seconds or
/// milliseconds, and RFC 2822 strings some legacy feeds still emit.
fn parse_lenient(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();

    if let Ok(n) = trimmed.parse::<i64>() {
        // 12+ digit magnitudes can only be epoch milliseconds.
        return if n.unsigned_abs() >= 100_000_000_000 {
            Utc.timestamp_millis_opt(n).single()
        } else {
            DateTime::from_timestamp(n, 0)
        };
    }

    DateTime::parse_from_rfc2822(trimmed)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Resolve an IANA zone name against the tz database.
pub fn resolve_tz(name: &str) -> TimeResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| TimeError::UnknownTimezone(name.to_owned()))
}

/// Resolve a viewer-supplied zone name, substituting UTC when it is not in
/// the tz database. Display degrades; nothing fails.
pub fn viewer_tz_or_utc(name: &str) -> Tz {
    match resolve_tz(name) {
        Ok(tz) => tz,
        Err(e) => {
            warn!("{e}; using UTC for viewer display");
            Tz::UTC
        }
    }
}

/// Project a UTC instant to wall-clock time in `tz`, applying whatever
/// offset (including DST) is in effect at that instant.
pub fn project(instant: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    instant.with_timezone(&tz).naive_local()
}

/// Bucket a zone-local kickoff into its competition day: anything before the
/// day-start boundary belongs to the previous day's card.
///
/// Applied uniformly to every kickoff; chrono's date arithmetic handles
/// month and year rollover when stepping back.
pub fn competition_day(local: NaiveDateTime, day_start: DayStart) -> NaiveDate {
    let date = local.date();
    let minutes = local.hour() * 60 + local.minute();
    if minutes < day_start.minutes() {
        date.pred_opt().unwrap_or(date)
    } else {
        date
    }
}

fn detect_viewer_tz() -> Tz {
    iana_time_zone::get_timezone()
        .ok()
        .and_then(|name| name.parse::<Tz>().ok())
        .unwrap_or(Tz::UTC)
}

// ---------------------------------------------------------------------------
// Converter — one kickoff in, one fully derived record out
// ---------------------------------------------------------------------------

/// Converts provider kickoff timestamps into viewer-local display times and
/// canonical competition-day buckets.
///
/// Holds the competition registry (injected, not global) and the viewer's
/// zone. Conversion never fails: malformed input degrades to a UTC-tagged or
/// placeholder [`Conversion`] so one bad record cannot abort a batch.
#[derive(Debug, Clone)]
pub struct MatchdayConverter {
    registry: CompetitionRegistry,
    viewer_tz: Tz,
}

impl MatchdayConverter {
    /// Converter for the host's own timezone (detected via the platform tz
    /// name, UTC when detection fails). Server processes rendering for a
    /// remote viewer should use [`with_viewer_tz`](Self::with_viewer_tz).
    pub fn new(registry: CompetitionRegistry) -> Self {
        Self::with_viewer_tz(registry, detect_viewer_tz())
    }

    pub fn with_viewer_tz(registry: CompetitionRegistry, viewer_tz: Tz) -> Self {
        Self { registry, viewer_tz }
    }

    pub fn viewer_tz(&self) -> Tz {
        self.viewer_tz
    }

    pub fn registry(&self) -> &CompetitionRegistry {
        &self.registry
    }

    /// Add or replace a competition config at runtime. Only affects
    /// conversions performed after the call.
    pub fn register_competition(&mut self, config: CompetitionConfig) {
        self.registry.register(config);
    }

    /// Convert one kickoff timestamp. Advisory today/tomorrow/yesterday
    /// flags are computed against the real clock.
    pub fn convert(&self, raw: &str, competition_id: Option<u32>) -> Conversion {
        self.convert_at(raw, competition_id, Utc::now())
    }

    /// Deterministic core of [`convert`](Self::convert): `now` only feeds
    /// the advisory flags, everything else is a pure function of the inputs.
    pub fn convert_at(
        &self,
        raw: &str,
        competition_id: Option<u32>,
        now: DateTime<Utc>,
    ) -> Conversion {
        let config = competition_id
            .map(|id| self.registry.lookup(id))
            .unwrap_or_default();

        match parse_kickoff(raw) {
            Ok(kickoff) => self.resolved(kickoff, &config, now),
            Err(_) => match parse_lenient(raw) {
                Some(kickoff) => self.degraded(kickoff),
                None => {
                    warn!("unusable kickoff time {raw:?}; returning placeholder conversion");
                    self.placeholder()
                }
            },
        }
    }

    /// Happy path: both projections plus the day bucket. The bucket comes
    /// from the tournament-zone projection only — it is a property of the
    /// competition, not of whoever is watching.
    fn resolved(&self, kickoff: DateTime<Utc>, config: &CompetitionConfig, now: DateTime<Utc>) -> Conversion {
        let tournament_local = project(kickoff, config.timezone);
        let viewer_local = project(kickoff, self.viewer_tz);
        let viewer_day = viewer_local.date();
        let today = now.with_timezone(&self.viewer_tz).date_naive();

        Conversion {
            kickoff_utc: Some(kickoff),
            tournament_tz: config.timezone,
            tournament_local: Some(tournament_local),
            competition_day: Some(competition_day(tournament_local, config.day_start)),
            viewer_local: Some(viewer_local),
            viewer_day: Some(viewer_day),
            display_time: viewer_local.format("%H:%M").to_string(),
            display_date: viewer_local.format("%a, %b %-d").to_string(),
            is_today: viewer_day == today,
            is_tomorrow: today.succ_opt() == Some(viewer_day),
            is_yesterday: today.pred_opt() == Some(viewer_day),
        }
    }

    /// The strict parser rejected the input but a lenient parse salvaged an
    /// instant. The competition zone is not trusted on this path: everything
    /// is tagged UTC, the day bucket is the naive UTC date, and the advisory
    /// flags stay false.
    fn degraded(&self, kickoff: DateTime<Utc>) -> Conversion {
        let utc_local = kickoff.naive_utc();
        let viewer_local = project(kickoff, self.viewer_tz);

        Conversion {
            kickoff_utc: Some(kickoff),
            tournament_tz: Tz::UTC,
            tournament_local: Some(utc_local),
            competition_day: Some(utc_local.date()),
            viewer_local: Some(viewer_local),
            viewer_day: Some(viewer_local.date()),
            display_time: viewer_local.format("%H:%M").to_string(),
            display_date: viewer_local.format("%a, %b %-d").to_string(),
            is_today: false,
            is_tomorrow: false,
            is_yesterday: false,
        }
    }

    /// Nothing parsed at all. Upstream still renders the fixture, with
    /// placeholder time strings, rather than silently dropping it.
    fn placeholder(&self) -> Conversion {
        Conversion {
            kickoff_utc: None,
            tournament_tz: Tz::UTC,
            tournament_local: None,
            competition_day: None,
            viewer_local: None,
            viewer_day: None,
            display_time: PLACEHOLDER_TIME.to_owned(),
            display_date: PLACEHOLDER_DATE.to_owned(),
            is_today: false,
            is_tomorrow: false,
            is_yesterday: false,
        }
    }
}
