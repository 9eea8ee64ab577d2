// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Redis-backed remote tier for the inception cache.
//!
//! [`RedisTier`] stores values as byte payloads produced by a
//! [`Codec`](inception_tier::Codec). It never opens connections on its own: the
//! caller builds a [`ConnectionManager`](redis::aio::ConnectionManager), owns its
//! lifecycle, and hands a handle to the builder.
//!
//! # Example
//!
//! ```no_run
//! use inception_redis::RedisTier;
//! use inception_tier::{CacheTier, JsonCodec};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = redis::Client::open("redis://127.0.0.1/")?;
//! let connection = client.get_connection_manager().await?;
//!
//! let tier = RedisTier::<String, _>::builder(connection, JsonCodec)
//!     .key_prefix("app:")
//!     .name("redis")
//!     .build();
//!
//! tier.set("greeting", "hello".to_string(), Duration::from_secs(60)).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Commands
//!
//! | operation      | command               |
//! |----------------|-----------------------|
//! | `get`          | `GET`                 |
//! | `get_batch`    | `MGET`                |
//! | `set`          | `PSETEX`              |
//! | `set_batch`    | pipelined `PSETEX`    |
//! | `delete`       | `DEL`                 |
//! | `delete_batch` | `DEL k1 k2 ...`       |
//!
//! Set-valued entries are supported through [`RedisTier::get_set`],
//! [`RedisTier::add_to_set`] and [`RedisTier::remove_from_set`].

mod builder;
mod tier;

pub use builder::RedisTierBuilder;
pub use tier::RedisTier;
