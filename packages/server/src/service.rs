//! Fetch → aggregate, behind the result cache.

use std::sync::Arc;

use actix_web::http::StatusCode;
use chrono::NaiveDate;
use crash_stats_aggregate::{AggregateError, AggregateOptions, aggregate};
use crash_stats_aggregate_models::AggregationResult;
use crash_stats_cache::TtlCache;
use crash_stats_source::{CasualtyFilter, CrashSource, SourceError};

use crate::config::ServerConfig;

/// Errors that can occur while producing the statistics document.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The record source could not be read.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),

    /// The fetched records could not be aggregated.
    #[error(transparent)]
    Parse(#[from] AggregateError),
}

impl DataError {
    /// Stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::SourceUnavailable(_) => "SOURCE_UNAVAILABLE",
            Self::Parse(AggregateError::Parse { .. }) => "PARSE_ERROR",
            Self::Parse(AggregateError::InvalidReferenceYear { .. }) => "INVALID_CONFIGURATION",
        }
    }

    /// HTTP status to answer with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::SourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Produces [`AggregationResult`]s, recomputing at most once per cache TTL.
pub struct CrashStatsService {
    source: Arc<dyn CrashSource>,
    cache: TtlCache<AggregationResult>,
    filter: CasualtyFilter,
    limit: u64,
    reference_year: Option<i32>,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

impl CrashStatsService {
    /// Creates a service reading from `source` with the limits and cache
    /// settings in `config`.
    #[must_use]
    pub fn new(source: Arc<dyn CrashSource>, config: &ServerConfig) -> Self {
        let cache = TtlCache::new(config.cache_ttl);
        log::debug!("Statistics are cached for {:?}", cache.ttl());

        Self {
            source,
            cache,
            filter: CasualtyFilter::vulnerable_road_users(),
            limit: config.limit,
            reference_year: config.reference_year,
            today: local_today,
        }
    }

    /// Replaces the clock used to decide "today".
    #[must_use]
    pub const fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Returns the current statistics, fetching and aggregating if the
    /// cached result is missing or expired.
    ///
    /// # Errors
    ///
    /// Returns [`DataError`] if the fetch or the aggregation fails. A
    /// previously cached result is left in place.
    pub async fn data(&self) -> Result<Arc<AggregationResult>, DataError> {
        self.cache.get_or_try_compute(|| self.compute()).await
    }

    async fn compute(&self) -> Result<AggregationResult, DataError> {
        log::info!("Fetching crash records from {}", self.source.id());
        let records = self.source.fetch(&self.filter, self.limit).await?;

        let options =
            AggregateOptions::new((self.today)()).with_reference_year(self.reference_year);
        let result = aggregate(&records, &options)?;
        log::info!(
            "Aggregated {} records ({} cyclist, {} pedestrian crashes)",
            records.len(),
            result.cyclist.total,
            result.pedestrian.total
        );
        Ok(result)
    }
}
