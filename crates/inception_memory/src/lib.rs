// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! In-process object cache tier backed by moka.
//!
//! This crate provides [`InMemoryTier`], the fast, small tier that usually sits at
//! index 0 of an inception hierarchy. Values are stored as-is (no encoding), each
//! with the TTL it was written with, so the shorter allocations handed to the front
//! tier expire independently of entries written by other lookups.
//!
//! # Quick Start
//!
//! ```
//! use inception_memory::InMemoryTierBuilder;
//! use inception_tier::CacheTier;
//! use std::time::Duration;
//!
//! # futures::executor::block_on(async {
//! let tier = InMemoryTierBuilder::<i32>::new()
//!     .max_capacity(1000)
//!     .name("l1")
//!     .build();
//!
//! tier.set("key", 42, Duration::from_secs(30)).await?;
//! assert_eq!(tier.get("key").await?, Some(42));
//! # Ok::<(), inception_tier::Error>(())
//! # });
//! ```
//!
//! # Features
//!
//! - **Per-entry TTL**: every `set` carries its own expiry; overwriting resets it
//! - **Capacity limits**: set a maximum entry count with automatic `TinyLFU` eviction
//! - **Thread-safe**: safe for concurrent access from multiple tasks
//! - **Zero external types**: the builder avoids exposing moka in your public API

pub mod builder;
pub mod tier;

#[doc(inline)]
pub use builder::InMemoryTierBuilder;
#[doc(inline)]
pub use tier::InMemoryTier;
