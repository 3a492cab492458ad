#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregated casualty statistics types.
//!
//! [`AggregationResult`] is the read-only snapshot produced by the
//! aggregation pipeline and held by the result cache. It is kept separate
//! from the JSON document served over HTTP so the two can evolve
//! independently.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Weekday};
use crash_stats_crash_models::RoadUser;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Calendar day name. Ordered Monday first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum DayOfWeek {
    /// Monday
    Monday,
    /// Tuesday
    Tuesday,
    /// Wednesday
    Wednesday,
    /// Thursday
    Thursday,
    /// Friday
    Friday,
    /// Saturday
    Saturday,
    /// Sunday
    Sunday,
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
        }
    }
}

/// Number of crashes in one hour of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourCount {
    /// Hour of day, 0-23.
    pub hour: u32,
    /// Crashes in that hour.
    pub count: u64,
}

/// Injured and killed sums for one road user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CasualtyTotals {
    /// People injured.
    pub injured: u64,
    /// People killed.
    pub killed: u64,
}

/// Casualty sums over one year-to-date window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowTotals {
    /// Window start, inclusive.
    pub from: Option<NaiveDate>,
    /// Window end, exclusive.
    pub to: Option<NaiveDate>,
    /// Cyclist sums.
    pub cyclist: CasualtyTotals,
    /// Pedestrian sums.
    pub pedestrian: CasualtyTotals,
}

impl WindowTotals {
    /// Mutable sums for the given road user.
    pub const fn get_mut(&mut self, road_user: RoadUser) -> &mut CasualtyTotals {
        match road_user {
            RoadUser::Cyclist => &mut self.cyclist,
            RoadUser::Pedestrian => &mut self.pedestrian,
        }
    }
}

/// Grouped statistics for one casualty subset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsetStats {
    /// Number of crashes in the subset.
    pub total: u64,
    /// Crashes per calendar year.
    pub yearly_totals: BTreeMap<i32, u64>,
    /// Crashes per day of the week.
    pub day_counts: BTreeMap<DayOfWeek, u64>,
    /// Crashes per hour of day, ascending by hour. Hours with no crashes
    /// are absent.
    pub hourly_totals: Vec<HourCount>,
    /// Average crashes per calendar month, January first.
    pub monthly_averages: [u64; 12],
}

/// Everything the pipeline derives from one fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    /// The "today" the windows and averages were computed against.
    pub computed_on: NaiveDate,
    /// Year whose January 1st opens the current YTD window.
    pub reference_year: i32,
    /// Current year-to-date window.
    pub this_year: WindowTotals,
    /// Same window one year earlier.
    pub last_year: WindowTotals,
    /// Cyclist subset statistics.
    pub cyclist: SubsetStats,
    /// Pedestrian subset statistics.
    pub pedestrian: SubsetStats,
}

impl AggregationResult {
    /// Statistics for the given road user's subset.
    #[must_use]
    pub const fn subset(&self, road_user: RoadUser) -> &SubsetStats {
        match road_user {
            RoadUser::Cyclist => &self.cyclist,
            RoadUser::Pedestrian => &self.pedestrian,
        }
    }
}
