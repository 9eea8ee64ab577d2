// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Tier contract for the inception multi-tier read-through cache.
//!
//! This crate defines the [`CacheTier`] trait that every cache backend must satisfy,
//! the [`Error`] type tiers report faults with, and the [`Codec`] contract used by
//! backends that store values as opaque byte payloads.
//!
//! # Overview
//!
//! A tier is one cache backend in an ordered list: an in-process object cache, a
//! remote key-value store, or anything else that can get, set and delete values by
//! string key. The orchestrator in the `inception` crate only ever talks to tiers
//! through this contract, so any backing store can take part in a hierarchy once it
//! implements [`CacheTier`].
//!
//! # Implementing a Cache Tier
//!
//! The single-key operations, [`CacheTier::name`], and the get and set batch
//! operations are required. A backend without native batching forwards the batch
//! methods to the sequential helpers in [`batch`].
//!
//! ```
//! use inception_tier::{CacheTier, Error, batch};
//! use std::collections::HashMap;
//! use std::sync::RwLock;
//! use std::time::Duration;
//!
//! struct SimpleTier<V>(RwLock<HashMap<String, V>>);
//!
//! impl<V> CacheTier<V> for SimpleTier<V>
//! where
//!     V: Clone + Send + Sync,
//! {
//!     async fn get(&self, key: &str) -> Result<Option<V>, Error> {
//!         Ok(self.0.read().unwrap().get(key).cloned())
//!     }
//!
//!     async fn set(&self, key: &str, value: V, _ttl: Duration) -> Result<(), Error> {
//!         self.0.write().unwrap().insert(key.to_owned(), value);
//!         Ok(())
//!     }
//!
//!     async fn delete(&self, key: &str) -> Result<(), Error> {
//!         self.0.write().unwrap().remove(key);
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "simple"
//!     }
//!
//!     async fn get_batch(&self, keys: &[&str]) -> Result<Vec<Option<V>>, Error> {
//!         batch::get_each(self, keys).await
//!     }
//!
//!     async fn set_batch(&self, values: HashMap<String, V>, ttl: Duration) -> Result<(), Error> {
//!         batch::set_each(self, values, ttl).await
//!     }
//! }
//! ```
//!
//! # Dynamic Dispatch
//!
//! [`DynamicTier`] wraps any `CacheTier` in a type-erased, clonable container so an
//! ordered tier list can hold heterogeneous backends.

pub mod batch;
pub mod codec;
mod dynamic;
pub mod error;
#[cfg(any(feature = "test-util", test))]
pub mod testing;
pub(crate) mod tier;

#[cfg(any(feature = "serde", test))]
#[doc(inline)]
pub use codec::JsonCodec;
#[doc(inline)]
pub use codec::Codec;
#[doc(inline)]
pub use dynamic::{DynamicTier, DynamicTierExt};
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use tier::CacheTier;
