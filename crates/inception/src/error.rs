// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types raised by the cache itself.

/// A malformed argument was passed to the cache.
///
/// Raised when a [`CacheIdentity`](crate::CacheIdentity) is built from an empty key
/// or a zero TTL, or when a TTL allocation is requested for an impossible tier
/// position. These are programming errors and are reported immediately rather than
/// degraded like tier faults.
///
/// # Examples
///
/// ```
/// use inception::CacheIdentity;
/// use std::time::Duration;
///
/// let error = CacheIdentity::new("", Duration::from_secs(1)).unwrap_err();
/// assert_eq!(error.reason(), "key must not be empty");
/// ```
#[ohno::error]
#[display("invalid cache argument: {reason}")]
pub struct ValidationError {
    reason: String,
}

impl ValidationError {
    /// Returns a description of what was wrong with the argument.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
