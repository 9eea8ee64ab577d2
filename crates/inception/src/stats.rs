// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Hot-key statistics.
//!
//! Counts how often each key is looked up within a fixed window of time and logs
//! the keys that were looked up more than once when the window closes. Repeated
//! lookups of one key inside a short window usually mean a fast tier is not holding on to
//! it, so the summary is a tuning aid for TTLs and capacities.

use std::{
    collections::HashMap,
    fmt::{self, Write as _},
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use tick::Clock;

/// A key and how many times it was looked up within a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotKey {
    /// The key.
    pub key: String,
    /// Number of lookups recorded for the key.
    pub count: u64,
}

impl fmt::Display for HotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.key, self.count)
    }
}

#[derive(Debug)]
struct StatsWindow {
    started_at: Instant,
    counts: HashMap<String, u64>,
}

/// Per-key lookup counter over a rolling window.
///
/// The window is created on the first recorded lookup. Once `window` has elapsed,
/// the next lookup flushes it (logging the summary) and starts a fresh one, so a
/// quiet cache never logs anything.
#[derive(Debug)]
pub struct HotKeyStats {
    clock: Clock,
    window: Duration,
    current: Mutex<Option<StatsWindow>>,
}

impl HotKeyStats {
    /// Creates a collector with the given window length.
    #[must_use]
    pub fn new(clock: Clock, window: Duration) -> Self {
        Self {
            clock,
            window,
            current: Mutex::new(None),
        }
    }

    /// The window length.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Counts one lookup of `key`.
    ///
    /// If the active window has expired, it is flushed first and the lookup is
    /// counted in a new window.
    pub fn record(&self, key: &str) {
        let now = self.clock.instant();
        let expired = {
            let mut current = self.current.lock();
            let expired = match current.as_ref() {
                Some(window) if now.saturating_duration_since(window.started_at) >= self.window => current.take(),
                _ => None,
            };

            let window = current.get_or_insert_with(|| StatsWindow {
                started_at: now,
                counts: HashMap::new(),
            });
            *window.counts.entry(key.to_owned()).or_default() += 1;
            expired
        };

        if let Some(expired) = expired {
            self.log_summary(&hot_keys(expired.counts));
        }
    }

    /// Closes the active window now, logging and returning its hot keys.
    ///
    /// Returns an empty list if no window is active.
    pub fn flush(&self) -> Vec<HotKey> {
        let Some(window) = self.current.lock().take() else {
            return Vec::new();
        };

        let hot = hot_keys(window.counts);
        self.log_summary(&hot);
        hot
    }

    /// Returns the hot keys of the active window without closing it.
    #[must_use]
    pub fn snapshot(&self) -> Vec<HotKey> {
        self.current
            .lock()
            .as_ref()
            .map(|window| hot_keys(window.counts.clone()))
            .unwrap_or_default()
    }

    fn log_summary(&self, hot: &[HotKey]) {
        if hot.is_empty() {
            return;
        }

        let mut summary = String::new();
        for entry in hot {
            let _ = writeln!(summary, "{entry}");
        }

        tracing::info!(
            cache.stats.window_ms = u64::try_from(self.window.as_millis()).unwrap_or(u64::MAX),
            cache.stats.keys = hot.len(),
            "repeated lookups for the same key within the window:\n{summary}"
        );
    }
}

/// Keys looked up more than once, most frequent first, ties broken by key.
fn hot_keys(counts: HashMap<String, u64>) -> Vec<HotKey> {
    let mut hot: Vec<HotKey> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(key, count)| HotKey { key, count })
        .collect();
    hot.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    hot
}
