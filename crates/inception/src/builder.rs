// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for [`InceptionCache`].

use inception_tier::{CacheTier, DynamicTier, DynamicTierExt};
#[cfg(feature = "memory")]
use inception_memory::InMemoryTier;
#[cfg(any(feature = "metrics", test))]
use opentelemetry::metrics::MeterProvider;
use tick::Clock;

use crate::{
    InceptionCache, LoggingOptions,
    cache::DEFAULT_NAME,
    stats::HotKeyStats,
    telemetry::CacheTelemetry,
};

/// Builder for an [`InceptionCache`].
///
/// Tiers are added fastest first. A cache without tiers is valid: every fetch
/// goes straight to the loader.
///
/// # Examples
///
/// ```
/// use inception::{InMemoryTier, InceptionCache, LoggingOptions};
/// use tick::Clock;
/// use std::time::Duration;
///
/// let cache = InceptionCache::<String>::builder(Clock::new_frozen())
///     .name("profiles")
///     .tier(InMemoryTier::builder().max_capacity(10_000).name("l1").build())
///     .tier(InMemoryTier::builder().name("l2").build())
///     .logging(LoggingOptions::default().stats_summary_after(Duration::from_secs(300)))
///     .build();
///
/// assert_eq!(cache.tier_count(), 2);
/// ```
#[derive(Debug)]
pub struct InceptionBuilder<V: Send> {
    name: Option<&'static str>,
    tiers: Vec<DynamicTier<V>>,
    clock: Clock,
    logging: LoggingOptions,
    #[cfg(any(feature = "metrics", test))]
    meter: Option<opentelemetry::metrics::Meter>,
}

impl<V> InceptionBuilder<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(clock: Clock) -> Self {
        Self {
            name: None,
            tiers: Vec::new(),
            clock,
            logging: LoggingOptions::default(),
            #[cfg(any(feature = "metrics", test))]
            meter: None,
        }
    }

    /// Appends a tier after the ones already added.
    #[must_use]
    pub fn tier<T>(mut self, tier: T) -> Self
    where
        T: CacheTier<V> + 'static,
    {
        self.tiers.push(tier.into_dynamic());
        self
    }

    /// Appends already type-erased tiers, in order.
    #[must_use]
    pub fn tiers(mut self, tiers: impl IntoIterator<Item = DynamicTier<V>>) -> Self {
        self.tiers.extend(tiers);
        self
    }

    /// Appends an unbounded in-memory tier.
    #[cfg(feature = "memory")]
    #[must_use]
    pub fn memory(self) -> Self {
        self.tier(InMemoryTier::<V>::new())
    }

    /// Sets the name used in logs and metrics.
    #[must_use]
    pub fn name(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// Sets which events are logged and whether hot-key statistics are collected.
    #[must_use]
    pub fn logging(mut self, logging: LoggingOptions) -> Self {
        self.logging = logging;
        self
    }

    /// Records cache events as OpenTelemetry metrics.
    #[cfg(any(feature = "metrics", test))]
    #[must_use]
    pub fn metrics(mut self, provider: &dyn MeterProvider) -> Self {
        self.meter = Some(crate::telemetry::metrics::create_meter(provider));
        self
    }

    /// Builds the cache.
    #[must_use]
    pub fn build(self) -> InceptionCache<V> {
        let name = self.name.unwrap_or(DEFAULT_NAME);

        let telemetry = CacheTelemetry::new(name, self.logging);
        #[cfg(any(feature = "metrics", test))]
        let telemetry = match &self.meter {
            Some(meter) => telemetry.with_meter(meter),
            None => telemetry,
        };

        let stats = self
            .logging
            .summary_window()
            .map(|window| HotKeyStats::new(self.clock.clone(), window));

        let tier_names: Vec<&str> = self.tiers.iter().map(|tier| tier.name()).collect();
        tracing::info!(
            cache.name = name,
            cache.tier_count = self.tiers.len(),
            cache.tiers = %tier_names.join(", "),
            "cache.created"
        );

        InceptionCache {
            name,
            tiers: self.tiers,
            clock: self.clock,
            telemetry,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use inception_tier::testing::MockTier;

    use crate::telemetry::testing::LogCapture;

    #[test]
    fn defaults() {
        let cache = InceptionCache::<i32>::builder(Clock::new_frozen()).build();
        assert_eq!(cache.name(), DEFAULT_NAME);
        assert_eq!(cache.tier_count(), 0);
        assert_eq!(cache.logging(), LoggingOptions::default());
        assert!(cache.hot_key_summary().is_none());
    }

    #[test]
    fn tiers_keep_insertion_order() {
        let cache = InceptionCache::<i32>::builder(Clock::new_frozen())
            .tier(MockTier::new("l1"))
            .tiers([MockTier::<i32>::new("l2").into_dynamic(), MockTier::<i32>::new("l3").into_dynamic()])
            .build();

        let names: Vec<&str> = cache.tiers().iter().map(|tier| tier.name()).collect();
        assert_eq!(names, ["l1", "l2", "l3"]);
    }

    #[test]
    fn stats_enabled_by_summary_window() {
        let cache = InceptionCache::<i32>::builder(Clock::new_frozen())
            .logging(LoggingOptions::default().stats_summary_after(Duration::from_secs(60)))
            .build();
        assert_eq!(cache.hot_key_summary(), Some(Vec::new()));
    }

    #[test]
    fn build_logs_tier_names() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        let _cache = InceptionCache::<i32>::builder(Clock::new_frozen())
            .name("profiles")
            .tier(MockTier::new("l1"))
            .tier(MockTier::new("redis"))
            .build();

        capture.assert_contains("cache.created");
        capture.assert_contains("profiles");
        capture.assert_contains("l1, redis");
    }

    #[cfg(feature = "memory")]
    #[test]
    fn memory_appends_in_memory_tier() {
        let cache = InceptionCache::<i32>::builder(Clock::new_frozen()).memory().build();
        assert_eq!(cache.tiers()[0].name(), "in-memory");
    }
}
