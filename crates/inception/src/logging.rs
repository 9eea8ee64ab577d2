// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Logging policy for cache events and hot-key summaries.

use std::time::Duration;

/// Controls which cache events are logged.
///
/// Logging goes through `tracing`; these flags decide which events the cache emits
/// at all, independently of subscriber filtering. The defaults log faults only.
///
/// # Examples
///
/// ```
/// use inception::LoggingOptions;
/// use std::time::Duration;
///
/// let options = LoggingOptions::default()
///     .log_cache_misses(true)
///     .stats_summary_after(Duration::from_secs(300));
///
/// assert!(options.logs_errors());
/// assert!(!options.logs_cache_hits());
/// assert!(options.logs_cache_misses());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggingOptions {
    log_errors: bool,
    log_cache_hits: bool,
    log_cache_misses: bool,
    stats_summary_after: Option<Duration>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            log_errors: true,
            log_cache_hits: false,
            log_cache_misses: false,
            stats_summary_after: None,
        }
    }
}

impl LoggingOptions {
    /// Options that emit nothing and collect no statistics.
    #[must_use]
    pub const fn silent() -> Self {
        Self {
            log_errors: false,
            log_cache_hits: false,
            log_cache_misses: false,
            stats_summary_after: None,
        }
    }

    /// Logs tier faults, backfill failures and loader failures.
    #[must_use]
    pub const fn log_errors(mut self, enabled: bool) -> Self {
        self.log_errors = enabled;
        self
    }

    /// Logs every tier hit.
    #[must_use]
    pub const fn log_cache_hits(mut self, enabled: bool) -> Self {
        self.log_cache_hits = enabled;
        self
    }

    /// Logs tier misses and the writes they lead to: loads, backfills and
    /// invalidations.
    #[must_use]
    pub const fn log_cache_misses(mut self, enabled: bool) -> Self {
        self.log_cache_misses = enabled;
        self
    }

    /// Collects per-key lookup counts and logs a hot-key summary each time a window
    /// of this length elapses.
    ///
    /// A zero window turns collection off, since it would close on every lookup and
    /// never see a key twice.
    #[must_use]
    pub const fn stats_summary_after(mut self, window: Duration) -> Self {
        self.stats_summary_after = if window.is_zero() { None } else { Some(window) };
        self
    }

    /// Whether faults are logged.
    #[must_use]
    pub const fn logs_errors(&self) -> bool {
        self.log_errors
    }

    /// Whether hits are logged.
    #[must_use]
    pub const fn logs_cache_hits(&self) -> bool {
        self.log_cache_hits
    }

    /// Whether misses are logged.
    #[must_use]
    pub const fn logs_cache_misses(&self) -> bool {
        self.log_cache_misses
    }

    /// The hot-key summary window, if statistics are enabled.
    #[must_use]
    pub const fn summary_window(&self) -> Option<Duration> {
        self.stats_summary_after
    }
}
