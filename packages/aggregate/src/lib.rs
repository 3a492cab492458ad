#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation pipeline for cyclist and pedestrian casualty statistics.
//!
//! [`aggregate`] splits the fetched crash records into one casualty subset
//! per [`RoadUser`], parses each row's date and time, and derives the
//! year-to-date sums plus yearly, day-of-week, hourly, and monthly views.
//! A single unparseable date or time fails the whole run.

pub mod monthly;
pub mod parsing;

use std::collections::BTreeMap;

use chrono::{Datelike as _, Days, NaiveDate, NaiveTime, Timelike as _};
use crash_stats_aggregate_models::{
    AggregationResult, CasualtyTotals, DayOfWeek, HourCount, SubsetStats, WindowTotals,
};
use crash_stats_crash_models::{CrashRecord, RoadUser};

/// Errors that can occur while aggregating crash records.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// A date or time field could not be parsed.
    #[error(
        "Failed to parse {field} {value:?} (collision {})",
        .collision_id.as_deref().unwrap_or("<unknown>")
    )]
    Parse {
        /// Which field failed (`"crash_date"` or `"crash_time"`).
        field: &'static str,
        /// The raw value.
        value: String,
        /// Collision the value came from.
        collision_id: Option<String>,
    },

    /// The configured reference year has no representable January 1st.
    #[error("Invalid reference year {year}")]
    InvalidReferenceYear {
        /// The rejected year.
        year: i32,
    },
}

/// Inputs to [`aggregate`] that do not come from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOptions {
    /// The date YTD windows end at (exclusive) and monthly averages are
    /// computed against.
    pub today: NaiveDate,
    /// Pins the year that opens the current YTD window. `None` uses the
    /// calendar year of `today`.
    pub reference_year: Option<i32>,
}

impl AggregateOptions {
    /// Options anchored to `today` with the reference year following it.
    #[must_use]
    pub const fn new(today: NaiveDate) -> Self {
        Self {
            today,
            reference_year: None,
        }
    }

    /// Pins the reference year.
    #[must_use]
    pub const fn with_reference_year(mut self, year: Option<i32>) -> Self {
        self.reference_year = year;
        self
    }

    /// The year whose January 1st opens the current YTD window.
    #[must_use]
    pub fn reference_year(&self) -> i32 {
        self.reference_year.unwrap_or_else(|| self.today.year())
    }
}

/// A casualty subset row with its temporal fields parsed.
#[derive(Debug, Clone, Copy)]
struct ParsedCrash {
    date: NaiveDate,
    time: NaiveTime,
    injured: u32,
    killed: u32,
}

/// Runs the full pipeline over `records`.
///
/// # Errors
///
/// Returns [`AggregateError::Parse`] if any casualty row has a malformed
/// date or time, or [`AggregateError::InvalidReferenceYear`] if the
/// reference year is out of range.
pub fn aggregate(
    records: &[CrashRecord],
    options: &AggregateOptions,
) -> Result<AggregationResult, AggregateError> {
    let today = options.today;
    let reference_year = options.reference_year();

    let mut this_year = WindowTotals {
        from: Some(january_first(reference_year)?),
        to: Some(today),
        ..WindowTotals::default()
    };
    let mut last_year = WindowTotals {
        from: Some(january_first(reference_year.saturating_sub(1))?),
        to: Some(today.checked_sub_days(Days::new(365)).unwrap_or(NaiveDate::MIN)),
        ..WindowTotals::default()
    };

    let mut subsets = BTreeMap::new();
    for &road_user in RoadUser::all() {
        let crashes = casualty_subset(records, road_user)?;
        log::debug!("{road_user} subset: {} crashes", crashes.len());

        let this_year_totals = window_totals(&crashes, &this_year);
        let last_year_totals = window_totals(&crashes, &last_year);
        *this_year.get_mut(road_user) = this_year_totals;
        *last_year.get_mut(road_user) = last_year_totals;
        subsets.insert(road_user, subset_stats(&crashes, today));
    }

    Ok(AggregationResult {
        computed_on: today,
        reference_year,
        this_year,
        last_year,
        cyclist: subsets.remove(&RoadUser::Cyclist).unwrap_or_default(),
        pedestrian: subsets.remove(&RoadUser::Pedestrian).unwrap_or_default(),
    })
}

fn january_first(year: i32) -> Result<NaiveDate, AggregateError> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or(AggregateError::InvalidReferenceYear { year })
}

/// Selects the rows where `road_user` was injured or killed and parses
/// their date and time.
fn casualty_subset(
    records: &[CrashRecord],
    road_user: RoadUser,
) -> Result<Vec<ParsedCrash>, AggregateError> {
    records
        .iter()
        .filter(|record| road_user.is_casualty(record))
        .map(|record| {
            let date = parsing::parse_crash_date(&record.crash_date).ok_or_else(|| {
                AggregateError::Parse {
                    field: "crash_date",
                    value: record.crash_date.clone(),
                    collision_id: record.collision_id.clone(),
                }
            })?;
            let time = parsing::parse_crash_time(&record.crash_time).ok_or_else(|| {
                AggregateError::Parse {
                    field: "crash_time",
                    value: record.crash_time.clone(),
                    collision_id: record.collision_id.clone(),
                }
            })?;
            Ok(ParsedCrash {
                date,
                time,
                injured: road_user.injured(record),
                killed: road_user.killed(record),
            })
        })
        .collect()
}

/// Sums injured and killed counts for crashes inside `window`
/// (`from` inclusive, `to` exclusive).
fn window_totals(crashes: &[ParsedCrash], window: &WindowTotals) -> CasualtyTotals {
    crashes
        .iter()
        .filter(|crash| {
            window.from.is_none_or(|from| crash.date >= from)
                && window.to.is_none_or(|to| crash.date < to)
        })
        .fold(CasualtyTotals::default(), |mut totals, crash| {
            totals.injured += u64::from(crash.injured);
            totals.killed += u64::from(crash.killed);
            totals
        })
}

fn subset_stats(crashes: &[ParsedCrash], today: NaiveDate) -> SubsetStats {
    let mut yearly_totals: BTreeMap<i32, u64> = BTreeMap::new();
    let mut day_counts: BTreeMap<DayOfWeek, u64> = BTreeMap::new();
    let mut hour_counts: BTreeMap<u32, u64> = BTreeMap::new();
    let mut month_counts = [0u64; 12];

    for crash in crashes {
        *yearly_totals.entry(crash.date.year()).or_default() += 1;
        *day_counts.entry(crash.date.weekday().into()).or_default() += 1;
        *hour_counts.entry(crash.time.hour()).or_default() += 1;
        month_counts[crash.date.month0() as usize] += 1;
    }

    SubsetStats {
        total: crashes.len() as u64,
        yearly_totals,
        day_counts,
        hourly_totals: hour_counts
            .into_iter()
            .map(|(hour, count)| HourCount { hour, count })
            .collect(),
        monthly_averages: monthly::monthly_averages(&month_counts, today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn crash(
        id: u32,
        date: &str,
        time: &str,
        cyclist: (u32, u32),
        pedestrian: (u32, u32),
    ) -> CrashRecord {
        CrashRecord {
            collision_id: Some(id.to_string()),
            crash_date: format!("{date}T00:00:00.000"),
            crash_time: time.to_string(),
            borough: None,
            cyclists_injured: cyclist.0,
            cyclists_killed: cyclist.1,
            pedestrians_injured: pedestrian.0,
            pedestrians_killed: pedestrian.1,
        }
    }

    const fn totals(injured: u64, killed: u64) -> CasualtyTotals {
        CasualtyTotals { injured, killed }
    }

    fn cyclist(id: u32, date: &str, time: &str) -> CrashRecord {
        crash(id, date, time, (1, 0), (0, 0))
    }

    fn sample() -> Vec<CrashRecord> {
        vec![
            cyclist(1, "2023-01-05", "5:10"),
            cyclist(2, "2023-01-20", "5:45"),
            cyclist(3, "2024-01-05", "9:00"),
            crash(4, "2024-02-14", "17:30", (0, 0), (2, 1)),
            crash(5, "2024-03-01", "8:15", (1, 1), (1, 0)),
            crash(6, "2023-02-28", "23:59", (0, 0), (1, 0)),
        ]
    }

    fn options() -> AggregateOptions {
        AggregateOptions::new(date(2024, 3, 1))
    }

    #[test]
    fn yearly_totals_example() {
        let records = vec![
            cyclist(1, "2023-01-05", "5:00"),
            cyclist(2, "2023-01-20", "5:00"),
            cyclist(3, "2024-01-05", "9:00"),
        ];
        let result = aggregate(&records, &options()).unwrap();
        assert_eq!(
            result.cyclist.yearly_totals,
            BTreeMap::from([(2023, 2), (2024, 1)])
        );
        assert!(result.pedestrian.yearly_totals.is_empty());
    }

    #[test]
    fn hourly_totals_example() {
        let records = vec![
            cyclist(1, "2024-01-01", "5:00"),
            cyclist(2, "2024-01-02", "5:30"),
            cyclist(3, "2024-01-03", "9:15"),
        ];
        let result = aggregate(&records, &options()).unwrap();
        assert_eq!(
            result.cyclist.hourly_totals,
            [
                HourCount { hour: 5, count: 2 },
                HourCount { hour: 9, count: 1 },
            ]
        );
    }

    #[test]
    fn subsets_overlap_and_filter_correctly() {
        let result = aggregate(&sample(), &options()).unwrap();
        // 1, 2, 3, 5 involve cyclists; 4, 5, 6 involve pedestrians.
        assert_eq!(result.cyclist.total, 4);
        assert_eq!(result.pedestrian.total, 3);
    }

    #[test]
    fn yearly_totals_partition_subset() {
        let result = aggregate(&sample(), &options()).unwrap();
        for user in RoadUser::all() {
            let stats = result.subset(*user);
            assert_eq!(stats.yearly_totals.values().sum::<u64>(), stats.total);
            assert_eq!(stats.day_counts.values().sum::<u64>(), stats.total);
        }
    }

    #[test]
    fn hourly_totals_ascending_and_complete() {
        let result = aggregate(&sample(), &options()).unwrap();
        for user in RoadUser::all() {
            let stats = result.subset(*user);
            let hours: Vec<u32> = stats.hourly_totals.iter().map(|h| h.hour).collect();
            assert!(hours.windows(2).all(|w| w[0] < w[1]), "{hours:?}");
            assert!(hours.iter().all(|h| *h <= 23));
            let sum: u64 = stats.hourly_totals.iter().map(|h| h.count).sum();
            assert_eq!(sum, stats.total);
        }
    }

    #[test]
    fn day_of_week_uses_day_names() {
        // 2024-01-05 was a Friday, 2023-01-05 a Thursday.
        let records = vec![
            cyclist(1, "2024-01-05", "5:00"),
            cyclist(2, "2023-01-05", "5:00"),
            cyclist(3, "2024-01-12", "5:00"),
        ];
        let result = aggregate(&records, &options()).unwrap();
        assert_eq!(
            result.cyclist.day_counts,
            BTreeMap::from([(DayOfWeek::Thursday, 1), (DayOfWeek::Friday, 2)])
        );
    }

    #[test]
    fn ytd_windows_exclude_today() {
        let result = aggregate(&sample(), &options()).unwrap();

        // This year: [2024-01-01, 2024-03-01). Crash 5 falls on "today".
        assert_eq!(result.this_year.from, Some(date(2024, 1, 1)));
        assert_eq!(result.this_year.cyclist, totals(1, 0));
        assert_eq!(result.this_year.pedestrian, totals(2, 1));

        // Last year: [2023-01-01, 2023-03-02).
        assert_eq!(result.last_year.to, Some(date(2023, 3, 2)));
        assert_eq!(result.last_year.cyclist, totals(2, 0));
        assert_eq!(result.last_year.pedestrian, totals(1, 0));
    }

    #[test]
    fn reference_year_can_be_pinned() {
        let opts = options().with_reference_year(Some(2023));
        let result = aggregate(&sample(), &opts).unwrap();
        assert_eq!(result.reference_year, 2023);
        // [2023-01-01, 2024-03-01) covers every cyclist crash before today.
        assert_eq!(result.this_year.cyclist.injured, 3);
        // [2022-01-01, 2023-03-02)
        assert_eq!(result.last_year.cyclist.injured, 2);
    }

    #[test]
    fn rejects_unrepresentable_reference_year() {
        let opts = options().with_reference_year(Some(i32::MAX));
        assert!(matches!(
            aggregate(&sample(), &opts),
            Err(AggregateError::InvalidReferenceYear { .. })
        ));
    }

    #[test]
    fn monthly_averages_cover_twelve_months() {
        let result = aggregate(&sample(), &options()).unwrap();
        // Jan on 2024-03-01: (2024 - 2013) + 0 + 1 = 12 occurrences.
        // Three cyclist crashes in January round to 0.
        assert_eq!(result.cyclist.monthly_averages, [0; 12]);

        let many: Vec<_> = (0..24).map(|i| cyclist(i, "2020-01-10", "5:00")).collect();
        let result = aggregate(&many, &options()).unwrap();
        assert_eq!(result.cyclist.monthly_averages[0], 2);
    }

    #[test]
    fn malformed_date_fails_run() {
        let mut records = sample();
        records.push(CrashRecord {
            crash_date: "yesterday".to_string(),
            ..cyclist(99, "2024-01-01", "5:00")
        });
        let err = aggregate(&records, &options()).unwrap_err();
        match err {
            AggregateError::Parse { field, value, collision_id } => {
                assert_eq!(field, "crash_date");
                assert_eq!(value, "yesterday");
                assert_eq!(collision_id.as_deref(), Some("99"));
            }
            other @ AggregateError::InvalidReferenceYear { .. } => {
                panic!("unexpected error: {other:?}")
            }
        }
    }

    #[test]
    fn malformed_time_fails_run() {
        let mut records = sample();
        records.push(crash(7, "2024-01-01", "25:61", (0, 0), (1, 0)));
        assert!(matches!(
            aggregate(&records, &options()),
            Err(AggregateError::Parse { field: "crash_time", .. })
        ));
    }

    #[test]
    fn non_casualty_rows_are_not_parsed() {
        let mut records = sample();
        records.push(crash(8, "garbage", "garbage", (0, 0), (0, 0)));
        assert!(aggregate(&records, &options()).is_ok());
    }

    #[test]
    fn row_order_does_not_matter() {
        let records = sample();
        let mut reversed = records.clone();
        reversed.reverse();
        let mut rotated = records.clone();
        rotated.rotate_left(2);

        let expected = aggregate(&records, &options()).unwrap();
        assert_eq!(aggregate(&reversed, &options()).unwrap(), expected);
        assert_eq!(aggregate(&rotated, &options()).unwrap(), expected);
    }

    #[test]
    fn empty_input_yields_empty_stats() {
        let result = aggregate(&[], &options()).unwrap();
        assert_eq!(result.cyclist, SubsetStats::default());
        assert_eq!(result.this_year.cyclist, CasualtyTotals::default());
    }
}
