//! Socrata SODA API fetcher for the motor vehicle collisions dataset.
//!
//! Rows are requested page by page using the `$limit`, `$offset`, `$order`,
//! and `$where` query parameters until the row limit is reached or the API
//! returns a short page.

use std::future::Future;

use async_trait::async_trait;
use crash_stats_crash_models::CrashRecord;
use serde::Deserialize;

use crate::{CasualtyFilter, CrashSource, SourceError};

/// NYC Motor Vehicle Collisions - Crashes.
/// Dataset: <https://data.cityofnewyork.us/resource/h9gi-nx95>
pub const DEFAULT_API_URL: &str = "https://data.cityofnewyork.us/resource/h9gi-nx95.json";

/// Default page size for pagination.
pub const DEFAULT_PAGE_SIZE: u64 = 50_000;

/// Configuration for a Socrata crash source.
#[derive(Debug, Clone)]
pub struct SocrataConfig {
    /// Resource URL (e.g., [`DEFAULT_API_URL`]).
    pub api_url: String,
    /// Optional application token sent as `X-App-Token`. Public datasets
    /// work without one, at a lower rate limit.
    pub app_token: Option<String>,
    /// Rows requested per page.
    pub page_size: u64,
}

impl Default for SocrataConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            app_token: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Crash source reading from a Socrata dataset.
pub struct SocrataCrashSource {
    client: reqwest::Client,
    config: SocrataConfig,
}

impl SocrataCrashSource {
    /// Creates a source for the given dataset configuration.
    #[must_use]
    pub fn new(config: SocrataConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// The configuration this source was built with.
    #[must_use]
    pub const fn config(&self) -> &SocrataConfig {
        &self.config
    }

    async fn fetch_page(
        &self,
        where_clause: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<CrashRecord>, SourceError> {
        let mut request = self.client.get(&self.config.api_url).query(&[
            ("$where", where_clause.to_string()),
            ("$order", ":id".to_string()),
            ("$limit", limit.to_string()),
            ("$offset", offset.to_string()),
        ]);
        if let Some(token) = &self.config.app_token {
            request = request.header("X-App-Token", token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let body = response.text().await?;
        let rows: Vec<SocrataRow> = serde_json::from_str(&body)?;
        rows.into_iter().map(CrashRecord::try_from).collect()
    }
}

#[async_trait]
impl CrashSource for SocrataCrashSource {
    fn id(&self) -> &'static str {
        "nyc_collisions"
    }

    async fn fetch(
        &self,
        filter: &CasualtyFilter,
        limit: u64,
    ) -> Result<Vec<CrashRecord>, SourceError> {
        let where_clause = filter.where_clause();
        let where_clause = where_clause.as_str();
        let records = fetch_pages(limit, self.config.page_size, move |offset, page_limit| {
            log::info!("Fetching collision data: offset={offset}, limit={page_limit}");
            self.fetch_page(where_clause, offset, page_limit)
        })
        .await?;

        log::info!("Downloaded {} collision records total", records.len());
        Ok(records)
    }
}

/// Drives a paginated fetch.
///
/// `fetch_page(offset, page_limit)` is called with increasing offsets until
/// `limit` rows have been collected or a page comes back shorter than
/// requested.
///
/// # Errors
///
/// Returns the first error produced by `fetch_page`.
pub async fn fetch_pages<T, F, Fut>(
    limit: u64,
    page_size: u64,
    mut fetch_page: F,
) -> Result<Vec<T>, SourceError>
where
    F: FnMut(u64, u64) -> Fut,
    Fut: Future<Output = Result<Vec<T>, SourceError>>,
{
    let page_size = page_size.max(1);
    let mut all_records = Vec::new();
    let mut offset: u64 = 0;

    loop {
        let remaining = limit.saturating_sub(offset);
        if remaining == 0 {
            break;
        }
        let page_limit = remaining.min(page_size);

        let records = fetch_page(offset, page_limit).await?;
        let count = records.len() as u64;
        if count == 0 {
            break;
        }

        all_records.extend(records);
        offset += count;

        if count < page_limit {
            break;
        }
    }

    Ok(all_records)
}

/// A row as returned by the API. Socrata encodes numbers as strings and
/// omits null columns entirely.
#[derive(Debug, Deserialize)]
struct SocrataRow {
    #[serde(default)]
    collision_id: Option<String>,
    #[serde(default)]
    crash_date: Option<String>,
    #[serde(default)]
    crash_time: Option<String>,
    #[serde(default)]
    borough: Option<String>,
    #[serde(default)]
    number_of_cyclist_injured: Option<String>,
    #[serde(default)]
    number_of_cyclist_killed: Option<String>,
    #[serde(default)]
    number_of_pedestrians_injured: Option<String>,
    #[serde(default)]
    number_of_pedestrians_killed: Option<String>,
}

impl TryFrom<SocrataRow> for CrashRecord {
    type Error = SourceError;

    fn try_from(row: SocrataRow) -> Result<Self, Self::Error> {
        let id = row.collision_id.as_deref();
        Ok(Self {
            cyclists_injured: parse_count(
                "number_of_cyclist_injured",
                row.number_of_cyclist_injured.as_deref(),
                id,
            )?,
            cyclists_killed: parse_count(
                "number_of_cyclist_killed",
                row.number_of_cyclist_killed.as_deref(),
                id,
            )?,
            pedestrians_injured: parse_count(
                "number_of_pedestrians_injured",
                row.number_of_pedestrians_injured.as_deref(),
                id,
            )?,
            pedestrians_killed: parse_count(
                "number_of_pedestrians_killed",
                row.number_of_pedestrians_killed.as_deref(),
                id,
            )?,
            collision_id: row.collision_id,
            crash_date: row.crash_date.unwrap_or_default(),
            crash_time: row.crash_time.unwrap_or_default(),
            borough: row.borough,
        })
    }
}

/// Parses a count column. Missing columns count as zero.
fn parse_count(
    column: &str,
    value: Option<&str>,
    collision_id: Option<&str>,
) -> Result<u32, SourceError> {
    let Some(value) = value else {
        return Ok(0);
    };
    value
        .trim()
        .parse()
        .map_err(|e| SourceError::MalformedRecord {
            message: format!(
                "{column}={value:?} in collision {}: {e}",
                collision_id.unwrap_or("<unknown>")
            ),
        })
}
