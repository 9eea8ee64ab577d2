// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring in-memory tiers.
//!
//! This module provides a builder API for `InMemoryTier` that abstracts the
//! underlying moka configuration.

use std::marker::PhantomData;

use crate::tier::InMemoryTier;

/// Name reported by tiers built without an explicit name.
pub const DEFAULT_NAME: &str = "in-memory";

/// Builder for configuring an `InMemoryTier`.
///
/// There is deliberately no tier-wide TTL setting: expiry is decided per entry by
/// whoever writes it.
///
/// # Examples
///
/// ```
/// use inception_memory::InMemoryTier;
///
/// let tier = InMemoryTier::<i32>::builder()
///     .max_capacity(1000)
///     .initial_capacity(100)
///     .name("hot-objects")
///     .build();
/// ```
#[derive(Debug)]
pub struct InMemoryTierBuilder<V> {
    pub(crate) max_capacity: Option<u64>,
    pub(crate) initial_capacity: Option<usize>,
    pub(crate) name: Option<String>,
    _phantom: PhantomData<V>,
}

impl<V> Default for InMemoryTierBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> InMemoryTierBuilder<V> {
    /// Creates a new builder with default settings.
    ///
    /// The default configuration creates an unbounded tier named `in-memory`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_capacity: None,
            initial_capacity: None,
            name: None,
            _phantom: PhantomData,
        }
    }

    /// Sets the maximum number of entries.
    ///
    /// Once the capacity is reached, entries are evicted using the `TinyLFU`
    /// policy (LRU eviction combined with LFU admission). If not set, the tier is
    /// bounded only by available memory.
    #[must_use]
    pub fn max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = Some(capacity);
        self
    }

    /// Sets the initial capacity (pre-allocation hint).
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Sets the name this tier reports in diagnostics.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds the configured `InMemoryTier`.
    #[must_use]
    pub fn build(self) -> InMemoryTier<V>
    where
        V: Clone + Send + Sync + 'static,
    {
        InMemoryTier::from_builder(self)
    }
}
