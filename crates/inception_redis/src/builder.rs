// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::marker::PhantomData;

use inception_tier::Codec;
use redis::aio::ConnectionManager;

use crate::RedisTier;

/// Name reported by tiers built without an explicit name.
pub(crate) const DEFAULT_NAME: &str = "redis";

/// Builder for [`RedisTier`].
///
/// Created with [`RedisTier::builder`].
pub struct RedisTierBuilder<V, C> {
    pub(crate) connection: ConnectionManager,
    pub(crate) codec: C,
    pub(crate) key_prefix: Option<String>,
    pub(crate) name: Option<String>,
    _value: PhantomData<fn() -> V>,
}

impl<V, C> std::fmt::Debug for RedisTierBuilder<V, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisTierBuilder")
            .field("key_prefix", &self.key_prefix)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<V, C> RedisTierBuilder<V, C>
where
    C: Codec<V>,
{
    pub(crate) fn new(connection: ConnectionManager, codec: C) -> Self {
        Self {
            connection,
            codec,
            key_prefix: None,
            name: None,
            _value: PhantomData,
        }
    }

    /// Prepends `prefix` to every key this tier reads or writes.
    #[must_use]
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Sets the name this tier reports in diagnostics.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds the tier.
    #[must_use]
    pub fn build(self) -> RedisTier<V, C> {
        RedisTier::from_builder(self)
    }
}
