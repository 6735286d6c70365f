use crate::Conversion;
use crate::convert::MatchdayConverter;
use chrono::{DateTime, NaiveDate, Utc};
use log::warn;
use std::collections::BTreeMap;

/// How the bulk operations read an upstream fixture record. Implemented by
/// whatever event type the provider layer hands over; the converter never
/// sees provider wire formats.
pub trait Fixture {
    /// The raw kickoff timestamp, if the record carries one at all.
    fn raw_kickoff(&self) -> Option<&str>;

    /// The provider's competition id, when known. `None` falls back to the
    /// UTC default config.
    fn competition_id(&self) -> Option<u32>;
}

/// A fixture annotated with its conversion, as placed into a day bucket.
#[derive(Debug, Clone)]
pub struct DayEntry<F> {
    pub fixture: F,
    pub time: Conversion,
}

/// Result of a single-fixture day check: the verdict plus the full
/// conversion for diagnostic display.
#[derive(Debug, Clone)]
pub struct DayMatch {
    pub is_match: bool,
    pub time: Conversion,
}

impl MatchdayConverter {
    /// Bucket fixtures by competition day, ordered earliest day first.
    ///
    /// Fixtures without a kickoff timestamp, and fixtures whose timestamp
    /// resists every parse attempt, are logged and left out of the result —
    /// neither has a meaningful day to live under. Every other fixture lands
    /// in exactly one bucket.
    pub fn group_by_day<F: Fixture>(&self, fixtures: Vec<F>) -> BTreeMap<NaiveDate, Vec<DayEntry<F>>> {
        self.group_by_day_at(fixtures, Utc::now())
    }

    pub fn group_by_day_at<F: Fixture>(
        &self,
        fixtures: Vec<F>,
        now: DateTime<Utc>,
    ) -> BTreeMap<NaiveDate, Vec<DayEntry<F>>> {
        let mut days: BTreeMap<NaiveDate, Vec<DayEntry<F>>> = BTreeMap::new();

        for fixture in fixtures {
            let time = match fixture.raw_kickoff() {
                Some(raw) => self.convert_at(raw, fixture.competition_id(), now),
                None => {
                    warn!(
                        "skipping fixture with no kickoff time (competition {:?})",
                        fixture.competition_id()
                    );
                    continue;
                }
            };

            match time.competition_day {
                Some(day) => days.entry(day).or_default().push(DayEntry { fixture, time }),
                None => warn!(
                    "skipping fixture with unusable kickoff time {:?}",
                    fixture.raw_kickoff()
                ),
            }
        }

        days
    }

    /// Keep exactly the fixtures whose competition day equals `day`.
    pub fn filter_for_day<F: Fixture>(&self, fixtures: Vec<F>, day: NaiveDate) -> Vec<F> {
        self.filter_for_day_at(fixtures, day, Utc::now())
    }

    pub fn filter_for_day_at<F: Fixture>(
        &self,
        fixtures: Vec<F>,
        day: NaiveDate,
        now: DateTime<Utc>,
    ) -> Vec<F> {
        fixtures
            .into_iter()
            .filter(|fixture| {
                let Some(raw) = fixture.raw_kickoff() else {
                    return false;
                };
                self.convert_at(raw, fixture.competition_id(), now).competition_day == Some(day)
            })
            .collect()
    }

    /// Does a single kickoff fall on `day`? Returns the conversion alongside
    /// the verdict so filter bars can show why a fixture matched.
    pub fn is_on_day(&self, raw: &str, day: NaiveDate, competition_id: Option<u32>) -> DayMatch {
        self.is_on_day_at(raw, day, competition_id, Utc::now())
    }

    pub fn is_on_day_at(
        &self,
        raw: &str,
        day: NaiveDate,
        competition_id: Option<u32>,
        now: DateTime<Utc>,
    ) -> DayMatch {
        let time = self.convert_at(raw, competition_id, now);
        DayMatch { is_match: time.competition_day == Some(day), time }
    }
}
