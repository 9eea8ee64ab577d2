// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Batch operations built from single-key calls.
//!
//! Backends without a native multi-key command forward
//! [`CacheTier::get_batch`] and [`CacheTier::set_batch`] here.

use std::{collections::HashMap, time::Duration};

use crate::{CacheTier, Error};

/// Gets each of `keys` with one `get` per key, in order.
///
/// The result is positionally aligned with `keys`. The first failing `get` stops
/// the batch and its error is returned.
///
/// # Errors
///
/// Returns the error of the first `get` that fails.
pub async fn get_each<V, T>(tier: &T, keys: &[&str]) -> Result<Vec<Option<V>>, Error>
where
    T: CacheTier<V> + ?Sized,
{
    let mut values = Vec::with_capacity(keys.len());
    for key in keys {
        values.push(tier.get(key).await?);
    }
    Ok(values)
}

/// Stores every entry of `values` with one `set` per entry, all with `ttl`.
///
/// # Errors
///
/// Returns the error of the first `set` that fails. Entries written before the
/// failure stay written.
pub async fn set_each<V, T>(tier: &T, values: HashMap<String, V>, ttl: Duration) -> Result<(), Error>
where
    T: CacheTier<V> + ?Sized,
{
    for (key, value) in values {
        tier.set(&key, value, ttl).await?;
    }
    Ok(())
}
