// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory tier implementation using moka.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use inception_tier::{CacheTier, Error, batch};
use moka::{Expiry, future::Cache};

use crate::builder::{DEFAULT_NAME, InMemoryTierBuilder};

/// A stored value together with the TTL it was written with.
#[derive(Debug, Clone)]
struct Stored<V> {
    value: V,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with.
///
/// Reads leave the expiry alone; an overwrite restarts it with the new TTL.
struct PerEntryTtl;

impl<V> Expiry<String, Stored<V>> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, stored: &Stored<V>, _created_at: Instant) -> Option<Duration> {
        Some(stored.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        stored: &Stored<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(stored.ttl)
    }
}

/// An in-process object cache tier backed by moka.
///
/// Clones share the same underlying cache.
///
/// # Examples
///
/// ```
/// use inception_memory::InMemoryTier;
/// use inception_tier::CacheTier;
/// use std::time::Duration;
/// # futures::executor::block_on(async {
///
/// let tier = InMemoryTier::<String>::new();
///
/// tier.set("greeting", "hello".to_string(), Duration::from_secs(60)).await?;
/// assert_eq!(tier.get("greeting").await?.as_deref(), Some("hello"));
/// # Ok::<(), inception_tier::Error>(())
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryTier<V>
where
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<String, Stored<V>>,
    name: Arc<str>,
}

impl<V> Default for InMemoryTier<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> InMemoryTier<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a new unbounded in-memory tier.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a new in-memory tier holding at most `max_capacity` entries.
    #[must_use]
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self::builder().max_capacity(max_capacity).build()
    }

    /// Creates a new builder for configuring an in-memory tier.
    #[must_use]
    pub fn builder() -> InMemoryTierBuilder<V> {
        InMemoryTierBuilder::new()
    }

    pub(crate) fn from_builder(builder: InMemoryTierBuilder<V>) -> Self {
        let mut moka_builder = Cache::builder().expire_after(PerEntryTtl);

        if let Some(capacity) = builder.max_capacity {
            moka_builder = moka_builder.max_capacity(capacity);
        }

        if let Some(capacity) = builder.initial_capacity {
            moka_builder = moka_builder.initial_capacity(capacity);
        }

        let name = builder.name.unwrap_or_else(|| DEFAULT_NAME.to_owned());
        moka_builder = moka_builder.name(&name);

        Self {
            inner: moka_builder.build(),
            name: Arc::from(name),
        }
    }

    /// Processes pending evictions and expirations.
    ///
    /// moka applies housekeeping lazily; call this before reading [`len`](CacheTier::len)
    /// when an exact count matters.
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }

    /// Removes every entry from the tier.
    pub fn clear(&self) {
        self.inner.invalidate_all();
    }
}

impl<V> CacheTier<V> for InMemoryTier<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<V>, Error> {
        Ok(self.inner.get(key).await.map(|stored| stored.value))
    }

    async fn set(&self, key: &str, value: V, ttl: Duration) -> Result<(), Error> {
        self.inner.insert(key.to_owned(), Stored { value, ttl }).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.inner.invalidate(key).await;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn get_batch(&self, keys: &[&str]) -> Result<Vec<Option<V>>, Error> {
        batch::get_each(self, keys).await
    }

    async fn set_batch(&self, values: HashMap<String, V>, ttl: Duration) -> Result<(), Error> {
        batch::set_each(self, values, ttl).await
    }

    fn len(&self) -> Option<u64> {
        Some(self.inner.entry_count())
    }
}
