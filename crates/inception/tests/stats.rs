// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Hot-key statistics collected while fetching.

use std::time::Duration;

use inception::{CacheIdentity, HotKey, InceptionCache, LoggingOptions};
use inception_tier::testing::MockTier;
use tick::{Clock, ClockControl};

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    futures::executor::block_on(f)
}

fn hot(key: &str, count: u64) -> HotKey {
    HotKey {
        key: key.to_string(),
        count,
    }
}

fn cache_with_stats(clock: Clock, window: Duration) -> InceptionCache<i32> {
    InceptionCache::builder(clock)
        .tier(MockTier::<i32>::new("l1"))
        .tier(MockTier::<i32>::new("l2"))
        .logging(LoggingOptions::default().stats_summary_after(window))
        .build()
}

#[test]
fn each_fetch_counts_once_regardless_of_tiers_probed() {
    block_on(async {
        let cache = cache_with_stats(Clock::new_frozen(), Duration::from_secs(60));
        let id = CacheIdentity::new("k", Duration::from_secs(60)).unwrap();

        // The first fetch misses both tiers, the second hits the first tier.
        cache.fetch(&id, || async { Some(1) }).await;
        cache.fetch(&id, || async { Some(1) }).await;

        assert_eq!(cache.hot_key_summary(), Some(vec![hot("k", 2)]));
    });
}

#[test]
fn key_fetched_once_is_not_hot() {
    block_on(async {
        let cache = cache_with_stats(Clock::new_frozen(), Duration::from_secs(60));
        let once = CacheIdentity::new("once", Duration::from_secs(60)).unwrap();
        let twice = CacheIdentity::new("twice", Duration::from_secs(60)).unwrap();

        // Full misses probe both tiers, and a failed load probes them again next time.
        cache.fetch(&once, || async { None }).await;
        cache.fetch(&twice, || async { None }).await;
        cache.fetch(&twice, || async { None }).await;

        assert_eq!(cache.hot_key_summary(), Some(vec![hot("twice", 2)]));
        assert_eq!(cache.flush_stats(), Some(vec![hot("twice", 2)]));
    });
}

#[test]
fn summary_orders_by_count_then_key() {
    block_on(async {
        let cache = cache_with_stats(Clock::new_frozen(), Duration::from_secs(60));
        for key in ["b", "a", "c", "c", "b", "a", "c", "d"] {
            let id = CacheIdentity::new(key, Duration::from_secs(60)).unwrap();
            cache.fetch(&id, || async { None }).await;
        }

        assert_eq!(
            cache.hot_key_summary(),
            Some(vec![hot("c", 3), hot("a", 2), hot("b", 2)])
        );
    });
}

#[test]
fn window_rolls_over_after_it_elapses() {
    block_on(async {
        let control = ClockControl::new();
        let cache = cache_with_stats(control.to_clock(), Duration::from_secs(30));
        let id = CacheIdentity::new("k", Duration::from_secs(60)).unwrap();

        cache.fetch(&id, || async { None }).await;
        cache.fetch(&id, || async { None }).await;
        control.advance(Duration::from_secs(30));
        cache.fetch(&id, || async { None }).await;

        // The first window was flushed; the new one holds a single lookup.
        assert_eq!(cache.hot_key_summary(), Some(Vec::new()));

        cache.fetch(&id, || async { None }).await;
        assert_eq!(cache.hot_key_summary(), Some(vec![hot("k", 2)]));
    });
}

#[test]
fn flush_stats_returns_and_clears_window() {
    block_on(async {
        let cache = cache_with_stats(Clock::new_frozen(), Duration::from_secs(60));
        let id = CacheIdentity::new("k", Duration::from_secs(60)).unwrap();
        cache.fetch(&id, || async { None }).await;
        cache.fetch(&id, || async { None }).await;

        assert_eq!(cache.flush_stats(), Some(vec![hot("k", 2)]));
        assert_eq!(cache.hot_key_summary(), Some(Vec::new()));
    });
}

#[test]
fn zero_window_collects_nothing() {
    block_on(async {
        let cache = cache_with_stats(Clock::new_frozen(), Duration::ZERO);
        let id = CacheIdentity::new("k", Duration::from_secs(60)).unwrap();
        cache.fetch(&id, || async { None }).await;
        cache.fetch(&id, || async { None }).await;

        assert_eq!(cache.hot_key_summary(), None);
    });
}

#[test]
fn stats_disabled_by_default() {
    block_on(async {
        let cache = InceptionCache::builder(Clock::new_frozen())
            .tier(MockTier::<i32>::new("l1"))
            .build();
        let id = CacheIdentity::new("k", Duration::from_secs(60)).unwrap();
        cache.fetch(&id, || async { Some(1) }).await;

        assert_eq!(cache.hot_key_summary(), None);
        assert_eq!(cache.flush_stats(), None);
    });
}
