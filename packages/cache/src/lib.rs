#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Single-entry time-to-live cache.
//!
//! [`TtlCache`] holds at most one computed value together with the instant
//! it was stored. Reads within the TTL return the stored value; the first
//! read after expiry recomputes it. The slot is locked for the duration of
//! a recomputation, so concurrent readers during a miss wait for one
//! computation instead of each starting their own.
//!
//! Time is read from [`tokio::time::Instant`], which follows the paused
//! test clock.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// 24 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(86_400);

struct CacheEntry<T> {
    value: Arc<T>,
    inserted: Instant,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.inserted.elapsed() < ttl
    }
}

/// A cache slot for one value that expires `ttl` after it was stored.
pub struct TtlCache<T> {
    ttl: Duration,
    slot: Mutex<Option<CacheEntry<T>>>,
}

impl<T> TtlCache<T> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// The configured time-to-live.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value, or awaits `compute` and caches its result
    /// if the slot is empty or expired.
    ///
    /// A failed computation leaves the slot as it was.
    ///
    /// # Errors
    ///
    /// Returns whatever error `compute` returns.
    pub async fn get_or_try_compute<F, Fut, E>(&self, compute: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(entry) = slot.as_ref()
            && entry.is_fresh(self.ttl)
        {
            log::debug!("Cache hit (age {:?})", entry.inserted.elapsed());
            return Ok(Arc::clone(&entry.value));
        }

        log::info!(
            "Cache {}, recomputing",
            if slot.is_some() { "expired" } else { "empty" }
        );
        let value = Arc::new(compute().await?);
        *slot = Some(CacheEntry {
            value: Arc::clone(&value),
            inserted: Instant::now(),
        });

        Ok(value)
    }

    /// Infallible variant of [`Self::get_or_try_compute`].
    pub async fn get_or_compute<F, Fut>(&self, compute: F) -> Arc<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let result: Result<Arc<T>, std::convert::Infallible> = self
            .get_or_try_compute(|| async move { Ok(compute().await) })
            .await;
        match result {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Returns the cached value if it is still fresh, without computing.
    pub async fn peek(&self) -> Option<Arc<T>> {
        self.slot
            .lock()
            .await
            .as_ref()
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| Arc::clone(&entry.value))
    }

    /// Age of the stored value, fresh or not.
    pub async fn age(&self) -> Option<Duration> {
        self.slot
            .lock()
            .await
            .as_ref()
            .map(|entry| entry.inserted.elapsed())
    }

    /// Drops the stored value so the next read recomputes.
    pub async fn invalidate(&self) {
        self.slot.lock().await.take();
    }
}

impl<T> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
