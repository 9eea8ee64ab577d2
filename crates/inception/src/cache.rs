// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The cascading read-through cache.

use std::{convert::Infallible, fmt::Display, time::Duration};

use futures::future::join_all;
use inception_tier::{CacheTier, DynamicTier, Error};
use tick::Clock;

use crate::{
    CacheIdentity, HotKey, LoggingOptions,
    builder::InceptionBuilder,
    expiry::allocate,
    stats::HotKeyStats,
    telemetry::{
        CacheActivity, CacheEvent, CacheOperation, CacheTelemetry, LOADER,
        ext::ClockExt,
    },
};

/// Name reported by caches built without an explicit name.
pub(crate) const DEFAULT_NAME: &str = "inception";

/// A read-through cache over an ordered list of tiers.
///
/// Tiers are ordered fastest first. A fetch probes them in order and stops at the
/// first hit; every tier probed before the hit is then backfilled with the value.
/// When no tier has the value, the caller's loader runs once and its result is
/// written to every tier.
///
/// Each backfilled tier receives its own share of the identity's TTL (see
/// [`allocate`](crate::allocate)): the slowest tier keeps the full TTL and faster
/// tiers expire sooner, so they periodically refresh from slower tiers instead of
/// all expiring at once.
///
/// Tier faults never reach the caller. A failed probe counts as a miss and a failed
/// write is logged and dropped.
///
/// Concurrent fetches of the same missing key each run their own loader; there is
/// no request coalescing.
///
/// # Examples
///
/// ```
/// use inception::{CacheIdentity, InMemoryTier, InceptionCache};
/// use tick::Clock;
/// use std::time::Duration;
///
/// # futures::executor::block_on(async {
/// let cache = InceptionCache::<String>::builder(Clock::new_frozen())
///     .tier(InMemoryTier::new())
///     .build();
///
/// let identity = CacheIdentity::new("user:42", Duration::from_secs(60))?;
/// let value = cache.fetch(&identity, || async { Some("Ada".to_string()) }).await;
/// assert_eq!(value.as_deref(), Some("Ada"));
/// # Ok::<(), inception::ValidationError>(())
/// # });
/// ```
pub struct InceptionCache<V: Send> {
    pub(crate) name: &'static str,
    pub(crate) tiers: Vec<DynamicTier<V>>,
    pub(crate) clock: Clock,
    pub(crate) telemetry: CacheTelemetry,
    pub(crate) stats: Option<HotKeyStats>,
}

impl<V: Send> std::fmt::Debug for InceptionCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InceptionCache")
            .field("name", &self.name)
            .field("tiers", &self.tiers)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<V> InceptionCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a builder for a cache whose timings are read from `clock`.
    #[must_use]
    pub fn builder(clock: Clock) -> InceptionBuilder<V> {
        InceptionBuilder::new(clock)
    }

    /// The name this cache reports in logs and metrics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The tiers, fastest first.
    #[must_use]
    pub fn tiers(&self) -> &[DynamicTier<V>] {
        &self.tiers
    }

    /// Number of tiers.
    #[must_use]
    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    /// The logging options the cache was built with.
    #[must_use]
    pub fn logging(&self) -> LoggingOptions {
        self.telemetry.logging()
    }

    /// Hot keys of the current statistics window.
    ///
    /// Returns `None` when statistics are disabled.
    #[must_use]
    pub fn hot_key_summary(&self) -> Option<Vec<HotKey>> {
        self.stats.as_ref().map(HotKeyStats::snapshot)
    }

    /// Closes the current statistics window, logging its summary.
    ///
    /// Returns `None` when statistics are disabled.
    pub fn flush_stats(&self) -> Option<Vec<HotKey>> {
        self.stats.as_ref().map(HotKeyStats::flush)
    }

    /// Returns the cached value for `identity`, loading it on a full miss.
    ///
    /// `loader` runs only when no tier holds the value. If it returns `None`,
    /// nothing is cached and `None` is returned.
    pub async fn fetch<F, Fut>(&self, identity: &CacheIdentity, loader: F) -> Option<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<V>>,
    {
        self.try_fetch(identity, move || async move { Ok::<_, Infallible>(loader().await) })
            .await
            .unwrap_or_else(|never| match never {})
    }

    /// Like [`fetch`](Self::fetch), with a fallible loader.
    ///
    /// A loader error is returned unchanged and nothing is cached.
    ///
    /// # Errors
    ///
    /// Returns the loader's error if the loader ran and failed. Tier faults are
    /// never returned.
    pub async fn try_fetch<F, Fut, E>(&self, identity: &CacheIdentity, loader: F) -> Result<Option<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<V>, E>>,
        E: Display,
    {
        let key = identity.key();
        let mut missed = Vec::with_capacity(self.tiers.len());

        if let Some(stats) = &self.stats {
            stats.record(key);
        }

        for (index, tier) in self.tiers.iter().enumerate() {
            let timed = self.clock.timed_async(tier.get(key)).await;
            match timed.result {
                Ok(Some(value)) => {
                    self.telemetry.record(
                        &CacheEvent::new(tier.name(), key, CacheOperation::Get, CacheActivity::Hit).duration(timed.duration),
                    );
                    self.backfill(identity, &value, &missed).await;
                    return Ok(Some(value));
                }
                Ok(None) => {
                    self.telemetry.record(
                        &CacheEvent::new(tier.name(), key, CacheOperation::Get, CacheActivity::Miss).duration(timed.duration),
                    );
                }
                Err(error) => {
                    self.telemetry.record(
                        &CacheEvent::new(tier.name(), key, CacheOperation::Get, CacheActivity::Error)
                            .duration(timed.duration)
                            .error(&error),
                    );
                }
            }
            missed.push(index);
        }

        let timed = self.clock.timed_async(loader()).await;
        match timed.result {
            Ok(Some(value)) => {
                self.telemetry.record(
                    &CacheEvent::new(LOADER, key, CacheOperation::Load, CacheActivity::Loaded).duration(timed.duration),
                );
                self.backfill(identity, &value, &missed).await;
                Ok(Some(value))
            }
            Ok(None) => {
                self.telemetry.record(
                    &CacheEvent::new(LOADER, key, CacheOperation::Load, CacheActivity::LoadedAbsent).duration(timed.duration),
                );
                Ok(None)
            }
            Err(error) => {
                self.telemetry.record(
                    &CacheEvent::new(LOADER, key, CacheOperation::Load, CacheActivity::LoaderError)
                        .duration(timed.duration)
                        .error(&error),
                );
                Err(error)
            }
        }
    }

    /// Removes `key` from every tier.
    ///
    /// Tiers are cleared concurrently; a tier that fails is logged and skipped.
    pub async fn invalidate(&self, key: &str) {
        let deletes = self.tiers.iter().map(|tier| async move {
            let timed = self.clock.timed_async(tier.delete(key)).await;
            self.record_delete(tier, key, timed.result.err(), timed.duration);
        });
        join_all(deletes).await;
    }

    /// Removes every key in `keys` from every tier.
    pub async fn invalidate_batch(&self, keys: &[&str]) {
        if keys.is_empty() {
            return;
        }

        let label = keys.join(",");
        let deletes = self.tiers.iter().map(|tier| {
            let label = label.as_str();
            async move {
                let timed = self.clock.timed_async(tier.delete_batch(keys)).await;
                self.record_delete(tier, label, timed.result.err(), timed.duration);
            }
        });
        join_all(deletes).await;
    }

    fn record_delete(&self, tier: &DynamicTier<V>, key: &str, error: Option<Error>, duration: Duration) {
        let event = CacheEvent::new(tier.name(), key, CacheOperation::Delete, CacheActivity::Invalidated).duration(duration);
        match &error {
            None => self.telemetry.record(&event),
            Some(error) => self.telemetry.record(&CacheEvent {
                activity: CacheActivity::InvalidateError,
                ..event.error(error)
            }),
        }
    }

    /// Writes `value` to every tier in `missed`, each with its allocated TTL.
    async fn backfill(&self, identity: &CacheIdentity, value: &V, missed: &[usize]) {
        let key = identity.key();
        let count = self.tiers.len();

        let writes = missed.iter().filter_map(|&index| {
            let tier = self.tiers.get(index)?;
            // Indices come from enumerating the tiers, so allocation cannot fail.
            let ttl = allocate(identity.ttl(), count, index).ok()?;
            let value = value.clone();
            Some(async move {
                let timed = self.clock.timed_async(tier.set(key, value, ttl)).await;
                let event = CacheEvent::new(tier.name(), key, CacheOperation::Set, CacheActivity::Backfilled)
                    .ttl(ttl)
                    .duration(timed.duration);
                match &timed.result {
                    Ok(()) => self.telemetry.record(&event),
                    Err(error) => self.telemetry.record(&CacheEvent {
                        activity: CacheActivity::BackfillError,
                        ..event.error(error)
                    }),
                }
            })
        });

        join_all(writes).await;
    }
}
