// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mock tier implementation for testing.
//!
//! This module provides `MockTier`, a configurable in-memory tier that records
//! every operation, remembers the TTL each entry was written with, and supports
//! failure injection for testing the orchestrator's degradation paths.

use std::{collections::HashMap, sync::Arc, time::Duration};

use parking_lot::Mutex;

use crate::{CacheTier, Error};

/// Recorded tier operation with full context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierOp<V> {
    /// A get was performed for the given key.
    Get(String),
    /// A set was performed.
    Set {
        /// The key that was written.
        key: String,
        /// The value that was written.
        value: V,
        /// The TTL the entry was written with.
        ttl: Duration,
    },
    /// A delete was performed for the given key.
    Delete(String),
}

type FailPredicate<V> = Box<dyn Fn(&TierOp<V>) -> bool + Send + Sync>;

/// A configurable mock tier for testing.
///
/// Entries are kept in memory together with the TTL they were written with, and
/// never expire on their own. All operations are recorded for later verification.
/// Clones share state, so a test can hand one clone to the orchestrator and
/// inspect another.
///
/// # Examples
///
/// ```no_run
/// use inception_tier::{testing::{MockTier, TierOp}, CacheTier};
/// use std::time::Duration;
///
/// # async fn example() {
/// let tier = MockTier::<i32>::new("l1");
///
/// tier.set("key", 42, Duration::from_secs(30)).await.unwrap();
/// assert_eq!(tier.get("key").await.unwrap(), Some(42));
/// assert_eq!(tier.entry("key"), Some((42, Duration::from_secs(30))));
///
/// // Fail every get from now on
/// tier.fail_when(|op| matches!(op, TierOp::Get(_)));
/// assert!(tier.get("key").await.is_err());
/// # }
/// ```
pub struct MockTier<V> {
    name: String,
    data: Arc<Mutex<HashMap<String, (V, Duration)>>>,
    operations: Arc<Mutex<Vec<TierOp<V>>>>,
    fail_when: Arc<Mutex<Option<FailPredicate<V>>>>,
}

impl<V> std::fmt::Debug for MockTier<V>
where
    V: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTier")
            .field("name", &self.name)
            .field("data", &self.data)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .finish()
    }
}

impl<V> Clone for MockTier<V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            data: Arc::clone(&self.data),
            operations: Arc::clone(&self.operations),
            fail_when: Arc::clone(&self.fail_when),
        }
    }
}

impl<V> MockTier<V> {
    /// Creates a new empty mock tier with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_data(name, HashMap::new())
    }

    /// Creates a mock tier with pre-populated entries.
    #[must_use]
    pub fn with_data(name: impl Into<String>, data: HashMap<String, (V, Duration)>) -> Self {
        Self {
            name: name.into(),
            data: Arc::new(Mutex::new(data)),
            operations: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the number of entries in the tier.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }

    /// Returns true if the tier holds an entry for the given key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.lock().contains_key(key)
    }

    /// Sets a predicate that determines when operations should fail.
    ///
    /// The predicate receives the operation and returns `true` if it should fail.
    /// Failed operations are still recorded but leave the stored data untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use inception_tier::testing::{MockTier, TierOp};
    ///
    /// let tier: MockTier<i32> = MockTier::new("l2");
    ///
    /// // Fail all operations
    /// tier.fail_when(|_| true);
    ///
    /// // Fail only writes
    /// tier.fail_when(|op| matches!(op, TierOp::Set { .. }));
    ///
    /// // Fail gets for a specific key
    /// tier.fail_when(|op| matches!(op, TierOp::Get(k) if k == "bad_key"));
    /// ```
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&TierOp<V>) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate, allowing all operations to succeed.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Clears all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    fn should_fail(&self, op: &TierOp<V>) -> bool {
        self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(op))
    }
}

impl<V: Clone> MockTier<V> {
    /// Returns a clone of all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<TierOp<V>> {
        self.operations.lock().clone()
    }

    /// Returns the value and TTL stored under `key`, without recording a get.
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<(V, Duration)> {
        self.data.lock().get(key).cloned()
    }

    /// Returns only the recorded set operations.
    #[must_use]
    pub fn writes(&self) -> Vec<TierOp<V>> {
        self.operations
            .lock()
            .iter()
            .filter(|op| matches!(op, TierOp::Set { .. }))
            .cloned()
            .collect()
    }

    fn record(&self, op: TierOp<V>) -> Result<(), Error> {
        let failed = self.should_fail(&op);
        self.operations.lock().push(op);
        if failed {
            return Err(Error::from_message(format!("mock tier '{}': operation failed", self.name)));
        }
        Ok(())
    }
}

impl<V> CacheTier<V> for MockTier<V>
where
    V: Clone + Send + Sync,
{
    async fn get(&self, key: &str) -> Result<Option<V>, Error> {
        self.record(TierOp::Get(key.to_owned()))?;
        Ok(self.data.lock().get(key).map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: V, ttl: Duration) -> Result<(), Error> {
        self.record(TierOp::Set {
            key: key.to_owned(),
            value: value.clone(),
            ttl,
        })?;
        self.data.lock().insert(key.to_owned(), (value, ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.record(TierOp::Delete(key.to_owned()))?;
        self.data.lock().remove(key);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn get_batch(&self, keys: &[&str]) -> Result<Vec<Option<V>>, Error> {
        crate::batch::get_each(self, keys).await
    }

    async fn set_batch(&self, values: HashMap<String, V>, ttl: Duration) -> Result<(), Error> {
        crate::batch::set_each(self, values, ttl).await
    }

    fn len(&self) -> Option<u64> {
        Some(self.data.lock().len() as u64)
    }
}
