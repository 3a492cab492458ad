#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Crash record sources.
//!
//! A source returns every collision row matching a [`CasualtyFilter`], up to
//! a fixed row limit. The production implementation talks to a Socrata
//! open-data endpoint (see [`socrata`]); [`StaticCrashSource`] serves a
//! fixed in-memory list.

pub mod socrata;

use async_trait::async_trait;
use crash_stats_crash_models::{CrashRecord, RoadUser};

/// Default upper bound on the number of rows fetched in one run.
pub const DEFAULT_LIMIT: u64 = 500_000;

/// Errors that can occur while fetching crash records.
///
/// Every variant means the upstream source is unavailable for this run.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Status code returned.
        status: u16,
        /// Request URL.
        url: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A row was decoded but holds a value that makes no sense.
    #[error("Malformed record: {message}")]
    MalformedRecord {
        /// Description of what went wrong.
        message: String,
    },
}

/// Row predicate: keep crashes where any of the listed road users was
/// injured or killed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasualtyFilter {
    road_users: Vec<RoadUser>,
}

impl CasualtyFilter {
    /// Creates a filter over the given road users.
    #[must_use]
    pub fn new(road_users: impl IntoIterator<Item = RoadUser>) -> Self {
        Self {
            road_users: road_users.into_iter().collect(),
        }
    }

    /// Filter matching any cyclist or pedestrian casualty.
    #[must_use]
    pub fn vulnerable_road_users() -> Self {
        Self::new(RoadUser::all().iter().copied())
    }

    /// Renders the filter as a `SoQL` `$where` expression.
    #[must_use]
    pub fn where_clause(&self) -> String {
        self.road_users
            .iter()
            .map(|user| format!("{}>0 OR {}>0", user.injured_column(), user.killed_column()))
            .collect::<Vec<_>>()
            .join(" OR ")
    }

    /// Returns `true` if `record` satisfies the filter.
    #[must_use]
    pub fn matches(&self, record: &CrashRecord) -> bool {
        self.road_users.iter().any(|user| user.is_casualty(record))
    }
}

/// Something that can produce crash records.
#[async_trait]
pub trait CrashSource: Send + Sync {
    /// Returns a unique identifier for this source (e.g., `"nyc_collisions"`).
    fn id(&self) -> &str;

    /// Fetches at most `limit` records matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the upstream cannot be reached or returns
    /// data that cannot be decoded.
    async fn fetch(
        &self,
        filter: &CasualtyFilter,
        limit: u64,
    ) -> Result<Vec<CrashRecord>, SourceError>;
}

/// A source backed by a fixed list of records.
///
/// Applies the filter and limit the same way the remote source does, so it
/// can stand in for it in tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct StaticCrashSource {
    records: Vec<CrashRecord>,
}

impl StaticCrashSource {
    /// Creates a source that always serves `records`.
    #[must_use]
    pub const fn new(records: Vec<CrashRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl CrashSource for StaticCrashSource {
    fn id(&self) -> &'static str {
        "static"
    }

    async fn fetch(
        &self,
        filter: &CasualtyFilter,
        limit: u64,
    ) -> Result<Vec<CrashRecord>, SourceError> {
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(self
            .records
            .iter()
            .filter(|record| filter.matches(record))
            .take(limit)
            .cloned()
            .collect())
    }
}
