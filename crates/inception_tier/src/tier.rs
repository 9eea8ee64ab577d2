// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The capability contract every cache backend satisfies.
//!
//! [`CacheTier`] is the narrow interface the orchestrator probes and backfills
//! through. Backends own their storage, eviction and wire protocol; the orchestrator
//! only sees get, set and delete by string key.

use std::{collections::HashMap, time::Duration};

use crate::Error;

/// Trait for cache tier implementations.
///
/// Implement this trait to plug a backing store into a tier hierarchy. Every
/// operation is idempotent with respect to final cache state: repeating a `set`
/// with the same value and TTL has no further effect.
///
/// The single-key operations, [`name`](Self::name), `get_batch` and `set_batch` are
/// required. Backends without a native batch command can forward the batch methods
/// to [`batch::get_each`](crate::batch::get_each) and
/// [`batch::set_each`](crate::batch::set_each), which issue the single-key
/// operation once per key, in order.
///
/// `delete_batch` defaults to one `delete` per key. `len` defaults to `None` since
/// not every backend tracks its size.
#[dynosaur::dynosaur(pub(crate) DynCacheTier = dyn(box) CacheTier, bridge(none))]
pub trait CacheTier<V>: Send + Sync {
    /// Gets the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key is not present or its payload cannot be
    /// decoded. An `Err` is reserved for faults in the tier itself.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<V>, Error>> + Send;

    /// Stores `value` under `key`, replacing any existing entry and its expiry.
    fn set(&self, key: &str, value: V, ttl: Duration) -> impl Future<Output = Result<(), Error>> + Send;

    /// Removes the entry stored under `key`, if any.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), Error>> + Send;

    /// Returns a stable identifier for this tier, used in diagnostics only.
    fn name(&self) -> &str;

    /// Gets the values stored under each of `keys`.
    ///
    /// The returned vector always has the same length as `keys`, with
    /// `result[i]` holding the value for `keys[i]`.
    fn get_batch(&self, keys: &[&str]) -> impl Future<Output = Result<Vec<Option<V>>, Error>> + Send;

    /// Stores every entry of `values`, each with the same `ttl`.
    fn set_batch(&self, values: HashMap<String, V>, ttl: Duration) -> impl Future<Output = Result<(), Error>> + Send;

    /// Removes the entries stored under each of `keys`.
    fn delete_batch(&self, keys: &[&str]) -> impl Future<Output = Result<(), Error>> + Send {
        async move {
            for key in keys {
                self.delete(key).await?;
            }
            Ok(())
        }
    }

    /// Returns the number of entries, if supported.
    fn len(&self) -> Option<u64> {
        None
    }

    /// Returns `true` if the tier contains no entries.
    ///
    /// Returns `None` for implementations that don't track size.
    fn is_empty(&self) -> Option<bool> {
        self.len().map(|len| len == 0)
    }
}
