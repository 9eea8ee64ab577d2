// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Type-erased tier wrapper for heterogeneous tier lists.

use std::{collections::HashMap, fmt::Debug, sync::Arc, time::Duration};

use crate::{CacheTier, Error, tier::DynCacheTier};

/// Extension trait for converting any `CacheTier` into a `DynamicTier`.
///
/// This trait is automatically implemented for all types that implement `CacheTier`.
///
/// # Examples
///
/// ```
/// use inception_tier::{CacheTier, DynamicTier, DynamicTierExt};
///
/// fn erase<T>(tier: T) -> DynamicTier<String>
/// where
///     T: CacheTier<String> + 'static,
/// {
///     tier.into_dynamic()
/// }
/// ```
pub trait DynamicTierExt<V: Send>: Sized {
    /// Converts this tier into a `DynamicTier`.
    fn into_dynamic(self) -> DynamicTier<V>;
}

impl<V, T> DynamicTierExt<V> for T
where
    V: Send,
    T: CacheTier<V> + 'static,
{
    fn into_dynamic(self) -> DynamicTier<V> {
        DynamicTier::new(self)
    }
}

/// A clonable tier with type erasure.
///
/// `DynamicTier` wraps a trait object in an `Arc`, so clones share the same
/// backend. The orchestrator stores its ordered tier list as `DynamicTier`s,
/// which lets an in-process cache sit in front of a remote store in one list.
pub struct DynamicTier<V: Send>(Arc<DynCacheTier<'static, V>>);

impl<V: Send> DynamicTier<V> {
    /// Creates a new dynamic tier from any `CacheTier` implementation.
    pub(crate) fn new<T>(tier: T) -> Self
    where
        T: CacheTier<V> + 'static,
    {
        Self(DynCacheTier::new_arc(tier))
    }
}

impl<V: Send> Debug for DynamicTier<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DynamicTier").field(&self.0.name()).finish()
    }
}

impl<V: Send> Clone for DynamicTier<V> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<V: Send> CacheTier<V> for DynamicTier<V> {
    async fn get(&self, key: &str) -> Result<Option<V>, Error> {
        self.0.get(key).await
    }

    async fn set(&self, key: &str, value: V, ttl: Duration) -> Result<(), Error> {
        self.0.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.0.delete(key).await
    }

    fn name(&self) -> &str {
        self.0.name()
    }

    async fn get_batch(&self, keys: &[&str]) -> Result<Vec<Option<V>>, Error> {
        self.0.get_batch(keys).await
    }

    async fn set_batch(&self, values: HashMap<String, V>, ttl: Duration) -> Result<(), Error> {
        self.0.set_batch(values, ttl).await
    }

    async fn delete_batch(&self, keys: &[&str]) -> Result<(), Error> {
        self.0.delete_batch(keys).await
    }

    fn len(&self) -> Option<u64> {
        self.0.len()
    }

    fn is_empty(&self) -> Option<bool> {
        self.0.is_empty()
    }
}
