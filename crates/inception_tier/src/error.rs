// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for tier operations.

/// A fault raised by a cache tier.
///
/// This is an opaque error type that can wrap any underlying error from a tier
/// implementation: a dropped connection, a serialization failure, a timeout. Use
/// [`std::error::Error::source()`] to access the underlying cause if needed.
///
/// The orchestrator never surfaces these to its callers. A failed read is treated
/// as a miss and a failed write is dropped, so tiers can fail without taking the
/// read path down with them.
///
/// # Example
///
/// ```
/// use inception_tier::Error;
///
/// let error = Error::from_message("connection reset");
/// ```
#[ohno::error]
pub struct Error {}

impl Error {
    /// Creates a new error from any type that can be converted to an error.
    ///
    /// This is the public API for creating tier errors from backend crates.
    ///
    /// # Examples
    ///
    /// ```
    /// use inception_tier::Error;
    ///
    /// let error = Error::from_message("operation failed");
    /// ```
    pub fn from_message(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(cause)
    }
}

/// A specialized [`Result`] type for tier operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;
    use crate::{Codec, JsonCodec};

    #[test]
    fn from_message_keeps_backend_text() {
        let error = Error::from_message("redis tier 'sessions': connection refused");
        let display = error.to_string();
        assert!(
            display.contains("redis tier 'sessions': connection refused"),
            "display output should contain the backend message, got: {display}"
        );
    }

    #[test]
    fn decode_failure_keeps_codec_error_as_source() {
        let error = <JsonCodec as Codec<Vec<u32>>>::decode(&JsonCodec, b"[1, 2").expect_err("payload is truncated");

        let source = error.source().expect("decode error should carry its cause");
        let json = source
            .downcast_ref::<serde_json::Error>()
            .expect("the cause should be the JSON error");
        assert!(json.is_eof(), "unexpected JSON error: {json}");
    }

    #[test]
    fn tier_errors_cross_task_boundaries() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<Error>();
    }
}
