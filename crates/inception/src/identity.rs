// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The key and TTL a fetch is made under.

use std::{fmt, time::Duration};

use crate::ValidationError;

/// What to look up and how long the value may live.
///
/// A `CacheIdentity` pairs a non-empty key with a positive TTL. The TTL is the
/// lifetime granted to the slowest tier; faster tiers receive a fraction of it (see
/// [`allocate`](crate::allocate)).
///
/// Identities are validated on construction and immutable afterwards.
///
/// # Examples
///
/// ```
/// use inception::CacheIdentity;
/// use std::time::Duration;
///
/// let identity = CacheIdentity::new("user:42", Duration::from_secs(90))?;
/// assert_eq!(identity.key(), "user:42");
/// assert_eq!(identity.ttl(), Duration::from_secs(90));
/// # Ok::<(), inception::ValidationError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheIdentity {
    key: String,
    ttl: Duration,
}

impl CacheIdentity {
    /// Creates a new identity.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if `key` is empty or `ttl` is zero.
    pub fn new(key: impl Into<String>, ttl: Duration) -> Result<Self, ValidationError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ValidationError::new("key must not be empty"));
        }
        if ttl.is_zero() {
            return Err(ValidationError::new("ttl must be positive"));
        }
        Ok(Self { key, ttl })
    }

    /// The cache key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The TTL granted to the slowest tier.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl fmt::Display for CacheIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cache identity (key: '{}', ttl: {}ms)", self.key, self.ttl.as_millis())
    }
}
