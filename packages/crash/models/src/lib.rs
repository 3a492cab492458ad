#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Crash record and road user types.
//!
//! This crate defines the canonical shape of a single collision row as it
//! comes back from the open-data API, plus the [`RoadUser`] categories the
//! statistics are broken down by. Every other package in the workspace
//! works in terms of these types.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A vulnerable road user category tracked by the statistics.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RoadUser {
    /// People on bicycles.
    Cyclist,
    /// People on foot.
    Pedestrian,
}

impl RoadUser {
    /// Returns every road user category.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Cyclist, Self::Pedestrian]
    }

    /// Name of the dataset column holding the injured count.
    #[must_use]
    pub const fn injured_column(self) -> &'static str {
        match self {
            Self::Cyclist => "number_of_cyclist_injured",
            Self::Pedestrian => "number_of_pedestrians_injured",
        }
    }

    /// Name of the dataset column holding the killed count.
    #[must_use]
    pub const fn killed_column(self) -> &'static str {
        match self {
            Self::Cyclist => "number_of_cyclist_killed",
            Self::Pedestrian => "number_of_pedestrians_killed",
        }
    }

    /// Number of people in this category injured in `record`.
    #[must_use]
    pub const fn injured(self, record: &CrashRecord) -> u32 {
        match self {
            Self::Cyclist => record.cyclists_injured,
            Self::Pedestrian => record.pedestrians_injured,
        }
    }

    /// Number of people in this category killed in `record`.
    #[must_use]
    pub const fn killed(self, record: &CrashRecord) -> u32 {
        match self {
            Self::Cyclist => record.cyclists_killed,
            Self::Pedestrian => record.pedestrians_killed,
        }
    }

    /// Returns `true` if `record` injured or killed at least one person in
    /// this category.
    #[must_use]
    pub const fn is_casualty(self, record: &CrashRecord) -> bool {
        self.injured(record) > 0 || self.killed(record) > 0
    }
}

/// A single collision row.
///
/// Date and time are kept as the raw text the API returned; parsing them is
/// the aggregation pipeline's job so that a malformed value fails the run
/// rather than silently dropping the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrashRecord {
    /// Dataset-assigned collision identifier.
    pub collision_id: Option<String>,
    /// Crash date, e.g. `2024-01-05T00:00:00.000`.
    pub crash_date: String,
    /// Crash time of day, e.g. `14:30`.
    pub crash_time: String,
    /// Borough name, when the row carries one.
    pub borough: Option<String>,
    /// Cyclists injured.
    pub cyclists_injured: u32,
    /// Cyclists killed.
    pub cyclists_killed: u32,
    /// Pedestrians injured.
    pub pedestrians_injured: u32,
    /// Pedestrians killed.
    pub pedestrians_killed: u32,
}
