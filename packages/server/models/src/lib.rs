#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API response types for the crash stats server.
//!
//! These types are serialized to JSON for the dashboard. They are separate
//! from [`AggregationResult`] so the wire shape (string counters, `x`/`y`
//! points) does not leak into the pipeline.

use std::collections::BTreeMap;

use crash_stats_aggregate_models::{AggregationResult, DayOfWeek, HourCount};
use serde::{Deserialize, Serialize};

/// The `/data` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCrashData {
    /// Year-to-date counters.
    pub counter_data: ApiCounterData,
    /// Crashes per calendar year.
    pub yearly_data: ApiYearlyData,
    /// Crashes per day of the week.
    pub week_day_data: ApiWeekDayData,
    /// Crashes per hour of day.
    pub hourly_data: ApiHourlyData,
    /// Average crashes per calendar month.
    pub monthly_data: ApiMonthlyData,
}

/// Year-to-date injury and death counts. Values are decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCounterData {
    pub ytd_cyclist_injuries: String,
    pub ytd_cyclist_deaths: String,
    pub ytd_pedestrian_injuries: String,
    pub ytd_pedestrian_deaths: String,
    pub last_ytd_cyclist_injuries: String,
    pub last_ytd_cyclist_deaths: String,
    pub last_ytd_pedestrian_injuries: String,
    pub last_ytd_pedestrian_deaths: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiYearlyData {
    pub yearly_cyclist_totals: BTreeMap<i32, u64>,
    pub yearly_pedestrian_totals: BTreeMap<i32, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiWeekDayData {
    pub cyclist_day_counts: BTreeMap<DayOfWeek, u64>,
    pub pedestrian_day_counts: BTreeMap<DayOfWeek, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHourlyData {
    pub hourly_cyclist_totals: Vec<ApiPoint>,
    pub hourly_pedestrian_totals: Vec<ApiPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMonthlyData {
    pub monthly_cyclist_averages: [u64; 12],
    pub monthly_pedestrian_averages: [u64; 12],
}

/// A chart point: `x` is the hour of day, `y` the crash count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiPoint {
    pub x: u32,
    pub y: u64,
}

impl From<&HourCount> for ApiPoint {
    fn from(hour: &HourCount) -> Self {
        Self {
            x: hour.hour,
            y: hour.count,
        }
    }
}

fn points(hours: &[HourCount]) -> Vec<ApiPoint> {
    hours.iter().map(ApiPoint::from).collect()
}

impl From<&AggregationResult> for ApiCrashData {
    fn from(result: &AggregationResult) -> Self {
        let this_year = &result.this_year;
        let last_year = &result.last_year;
        Self {
            counter_data: ApiCounterData {
                ytd_cyclist_injuries: this_year.cyclist.injured.to_string(),
                ytd_cyclist_deaths: this_year.cyclist.killed.to_string(),
                ytd_pedestrian_injuries: this_year.pedestrian.injured.to_string(),
                ytd_pedestrian_deaths: this_year.pedestrian.killed.to_string(),
                last_ytd_cyclist_injuries: last_year.cyclist.injured.to_string(),
                last_ytd_cyclist_deaths: last_year.cyclist.killed.to_string(),
                last_ytd_pedestrian_injuries: last_year.pedestrian.injured.to_string(),
                last_ytd_pedestrian_deaths: last_year.pedestrian.killed.to_string(),
            },
            yearly_data: ApiYearlyData {
                yearly_cyclist_totals: result.cyclist.yearly_totals.clone(),
                yearly_pedestrian_totals: result.pedestrian.yearly_totals.clone(),
            },
            week_day_data: ApiWeekDayData {
                cyclist_day_counts: result.cyclist.day_counts.clone(),
                pedestrian_day_counts: result.pedestrian.day_counts.clone(),
            },
            hourly_data: ApiHourlyData {
                hourly_cyclist_totals: points(&result.cyclist.hourly_totals),
                hourly_pedestrian_totals: points(&result.pedestrian.hourly_totals),
            },
            monthly_data: ApiMonthlyData {
                monthly_cyclist_averages: result.cyclist.monthly_averages,
                monthly_pedestrian_averages: result.pedestrian.monthly_averages,
            },
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Error body returned with 5xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
    /// Stable machine-readable code (e.g. `"SOURCE_UNAVAILABLE"`).
    pub code: String,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use crash_stats_aggregate_models::{CasualtyTotals, SubsetStats, WindowTotals};

    use super::*;

    fn result() -> AggregationResult {
        let mut monthly = [0; 12];
        monthly[6] = 4;
        AggregationResult {
            computed_on: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            reference_year: 2024,
            this_year: WindowTotals {
                cyclist: CasualtyTotals {
                    injured: 12,
                    killed: 1,
                },
                pedestrian: CasualtyTotals {
                    injured: 30,
                    killed: 2,
                },
                ..WindowTotals::default()
            },
            last_year: WindowTotals {
                cyclist: CasualtyTotals {
                    injured: 10,
                    killed: 0,
                },
                ..WindowTotals::default()
            },
            cyclist: SubsetStats {
                total: 3,
                yearly_totals: BTreeMap::from([(2023, 2), (2024, 1)]),
                day_counts: BTreeMap::from([(DayOfWeek::Friday, 3)]),
                hourly_totals: vec![
                    HourCount { hour: 5, count: 2 },
                    HourCount { hour: 9, count: 1 },
                ],
                monthly_averages: monthly,
            },
            pedestrian: SubsetStats::default(),
        }
    }

    #[test]
    fn serializes_dashboard_shape() {
        let json = serde_json::to_value(ApiCrashData::from(&result())).unwrap();

        assert_eq!(json["counterData"]["ytdCyclistInjuries"], "12");
        assert_eq!(json["counterData"]["ytdPedestrianDeaths"], "2");
        assert_eq!(json["counterData"]["lastYtdCyclistInjuries"], "10");
        assert_eq!(json["counterData"]["lastYtdPedestrianDeaths"], "0");
        assert_eq!(
            json["yearlyData"]["yearlyCyclistTotals"],
            serde_json::json!({"2023": 2, "2024": 1})
        );
        assert_eq!(
            json["weekDayData"]["cyclistDayCounts"],
            serde_json::json!({"Friday": 3})
        );
        assert_eq!(
            json["hourlyData"]["hourlyCyclistTotals"],
            serde_json::json!([{"x": 5, "y": 2}, {"x": 9, "y": 1}])
        );
        assert_eq!(
            json["hourlyData"]["hourlyPedestrianTotals"],
            serde_json::json!([])
        );
        assert_eq!(
            json["monthlyData"]["monthlyCyclistAverages"],
            serde_json::json!([0, 0, 0, 0, 0, 0, 4, 0, 0, 0, 0, 0])
        );
    }

    #[test]
    fn document_parses_back() {
        let data = ApiCrashData::from(&result());
        let text = serde_json::to_string(&data).unwrap();
        let parsed: ApiCrashData = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, data);
    }
}
