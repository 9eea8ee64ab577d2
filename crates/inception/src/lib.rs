// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A cascading multi-tier read-through cache.
//!
//! An [`InceptionCache`] sits in front of an authoritative data source and an
//! ordered list of cache tiers, fastest first: typically an in-process object cache
//! followed by a remote key-value store. A fetch walks the tiers in order and stops
//! at the first hit. Tiers that missed are backfilled with the value, and when every
//! tier misses, the caller's loader is invoked once and its result is written to
//! every tier.
//!
//! # Quick Start
//!
//! ```
//! use inception::{CacheIdentity, InMemoryTier, InceptionCache};
//! use tick::Clock;
//! use std::time::Duration;
//!
//! # futures::executor::block_on(async {
//! let cache = InceptionCache::<String>::builder(Clock::new_frozen())
//!     .name("profiles")
//!     .tier(InMemoryTier::builder().name("l1").max_capacity(1_000).build())
//!     .tier(InMemoryTier::builder().name("l2").build())
//!     .build();
//!
//! let identity = CacheIdentity::new("user:42", Duration::from_secs(90))?;
//!
//! // Full miss: the loader runs, l1 gets 45s and l2 gets 90s.
//! let first = cache.fetch(&identity, || async { Some("Ada".to_string()) }).await;
//!
//! // Hit in l1: the loader does not run.
//! let second = cache.fetch(&identity, || async { Some("Grace".to_string()) }).await;
//! assert_eq!(second.as_deref(), Some("Ada"));
//! assert_eq!(first, second);
//! # Ok::<(), inception::ValidationError>(())
//! # });
//! ```
//!
//! # TTL Allocation
//!
//! The TTL in a [`CacheIdentity`] is the lifetime of the value in the slowest tier.
//! The tier at index `i` of `n` receives `ttl / (n - i)` (see [`allocate`]), so a
//! three-tier cache given 90 seconds writes 30s, 45s and 90s. Fast tiers expire
//! first and refill from the tiers behind them.
//!
//! # Fault Handling
//!
//! Tiers are allowed to fail. A tier whose read fails is treated as a miss and
//! probing continues with the next tier; a failed backfill write is logged and
//! dropped without affecting the other tiers or the returned value. Only the
//! loader's own error, from [`InceptionCache::try_fetch`], ever reaches the caller.
//!
//! # Logging and Metrics
//!
//! Events are emitted through `tracing`. [`LoggingOptions`] selects whether hits,
//! misses and faults are logged, and can enable a periodic hot-key summary of keys
//! fetched repeatedly within a window. With the `metrics` feature, events are also
//! recorded as OpenTelemetry metrics (`cache.event.count` and
//! `cache.operation.duration`).
//!
//! # Features
//!
//! - `memory` (default): re-exports [`InMemoryTier`] and adds
//!   [`InceptionBuilder::memory`].
//! - `redis`: re-exports the Redis-backed `RedisTier`.
//! - `metrics`: OpenTelemetry metrics via `InceptionBuilder::metrics`.
//! - `test-util`: re-exports `MockTier` for testing code that uses the cache.

mod builder;
mod cache;
mod error;
mod expiry;
mod identity;
mod logging;
mod stats;
mod telemetry;

#[doc(inline)]
pub use builder::InceptionBuilder;
#[doc(inline)]
pub use cache::InceptionCache;
#[doc(inline)]
pub use error::ValidationError;
#[doc(inline)]
pub use expiry::allocate;
#[doc(inline)]
pub use identity::CacheIdentity;
#[doc(inline)]
pub use logging::LoggingOptions;
#[doc(inline)]
pub use stats::{HotKey, HotKeyStats};

pub use inception_tier::{CacheTier, Codec, DynamicTier, DynamicTierExt, Error as TierError};

#[cfg(feature = "memory")]
pub use inception_memory::{InMemoryTier, InMemoryTierBuilder};
#[cfg(feature = "redis")]
pub use inception_redis::{RedisTier, RedisTierBuilder};
#[cfg(any(feature = "test-util", test))]
pub use inception_tier::testing::{MockTier, TierOp};
