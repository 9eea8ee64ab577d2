// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cache telemetry: structured `tracing` events and optional OpenTelemetry metrics.
//!
//! Every probe, backfill write, loader call and invalidation is described by a
//! [`CacheEvent`]. Events are always counted when a meter is configured; whether
//! they are also logged is decided by [`LoggingOptions`].

use std::{fmt::Display, time::Duration};

#[cfg(any(feature = "metrics", test))]
use opentelemetry::{
    KeyValue,
    metrics::{Counter, Histogram, Meter},
};

use crate::LoggingOptions;

pub(crate) mod attributes;
pub(crate) mod ext;
#[cfg(any(feature = "metrics", test))]
pub(crate) mod metrics;
#[cfg(test)]
pub(crate) mod testing;

/// Label used in place of a tier name for loader events.
pub(crate) const LOADER: &str = "loader";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheOperation {
    Get,
    Set,
    Delete,
    Load,
}

impl CacheOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "cache.get",
            Self::Set => "cache.set",
            Self::Delete => "cache.delete",
            Self::Load => "cache.load",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheActivity {
    Hit,
    Miss,
    Error,
    Backfilled,
    BackfillError,
    Loaded,
    LoadedAbsent,
    LoaderError,
    Invalidated,
    InvalidateError,
}

impl CacheActivity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "cache.hit",
            Self::Miss => "cache.miss",
            Self::Error => "cache.error",
            Self::Backfilled => "cache.backfilled",
            Self::BackfillError => "cache.backfill_error",
            Self::Loaded => "cache.loaded",
            Self::LoadedAbsent => "cache.loaded_absent",
            Self::LoaderError => "cache.loader_error",
            Self::Invalidated => "cache.invalidated",
            Self::InvalidateError => "cache.invalidate_error",
        }
    }

    pub fn is_fault(self) -> bool {
        matches!(
            self,
            Self::Error | Self::BackfillError | Self::LoaderError | Self::InvalidateError
        )
    }
}

/// One observable step of a cache operation.
#[derive(Clone, Copy)]
pub(crate) struct CacheEvent<'a> {
    pub tier: &'a str,
    pub key: &'a str,
    pub operation: CacheOperation,
    pub activity: CacheActivity,
    pub duration: Option<Duration>,
    pub ttl: Option<Duration>,
    pub error: Option<&'a dyn Display>,
}

impl<'a> CacheEvent<'a> {
    pub fn new(tier: &'a str, key: &'a str, operation: CacheOperation, activity: CacheActivity) -> Self {
        Self {
            tier,
            key,
            operation,
            activity,
            duration: None,
            ttl: None,
            error: None,
        }
    }

    #[must_use]
    pub fn duration(self, duration: Duration) -> Self {
        Self {
            duration: Some(duration),
            ..self
        }
    }

    #[must_use]
    pub fn ttl(self, ttl: Duration) -> Self {
        Self { ttl: Some(ttl), ..self }
    }

    #[must_use]
    pub fn error(self, error: &'a dyn Display) -> Self {
        Self {
            error: Some(error),
            ..self
        }
    }
}

/// Records cache events as logs and, when configured, metrics.
#[derive(Clone, Debug)]
pub(crate) struct CacheTelemetry {
    name: &'static str,
    logging: LoggingOptions,
    #[cfg(any(feature = "metrics", test))]
    event_counter: Option<Counter<u64>>,
    #[cfg(any(feature = "metrics", test))]
    operation_duration: Option<Histogram<f64>>,
}

impl CacheTelemetry {
    pub fn new(name: &'static str, logging: LoggingOptions) -> Self {
        Self {
            name,
            logging,
            #[cfg(any(feature = "metrics", test))]
            event_counter: None,
            #[cfg(any(feature = "metrics", test))]
            operation_duration: None,
        }
    }

    #[cfg(any(feature = "metrics", test))]
    #[must_use]
    pub fn with_meter(self, meter: &Meter) -> Self {
        Self {
            event_counter: Some(metrics::create_event_counter(meter)),
            operation_duration: Some(metrics::create_operation_duration_histogram(meter)),
            ..self
        }
    }

    pub fn logging(&self) -> LoggingOptions {
        self.logging
    }

    pub fn record(&self, event: &CacheEvent<'_>) {
        #[cfg(any(feature = "metrics", test))]
        self.record_metrics(event);

        if self.should_log(event.activity) {
            self.emit(event);
        }
    }

    #[cfg(any(feature = "metrics", test))]
    fn record_metrics(&self, event: &CacheEvent<'_>) {
        if self.event_counter.is_none() && self.operation_duration.is_none() {
            return;
        }

        let attrs = [
            KeyValue::new(attributes::CACHE_NAME, self.name),
            KeyValue::new(attributes::CACHE_TIER, event.tier.to_owned()),
            KeyValue::new(attributes::CACHE_OPERATION_NAME, event.operation.as_str()),
            KeyValue::new(attributes::CACHE_ACTIVITY_NAME, event.activity.as_str()),
        ];

        if let Some(counter) = &self.event_counter {
            counter.add(1, &attrs);
        }

        if let (Some(duration), Some(histogram)) = (event.duration, &self.operation_duration) {
            histogram.record(duration.as_secs_f64(), &attrs);
        }
    }

    fn should_log(&self, activity: CacheActivity) -> bool {
        match activity {
            CacheActivity::Hit => self.logging.logs_cache_hits(),
            CacheActivity::Miss
            | CacheActivity::Backfilled
            | CacheActivity::Loaded
            | CacheActivity::LoadedAbsent
            | CacheActivity::Invalidated => self.logging.logs_cache_misses(),
            CacheActivity::Error | CacheActivity::BackfillError | CacheActivity::LoaderError | CacheActivity::InvalidateError => {
                self.logging.logs_errors()
            }
        }
    }

    fn emit(&self, event: &CacheEvent<'_>) {
        let operation = event.operation.as_str();
        let activity = event.activity.as_str();
        let duration_ns = event.duration.map(|d| d.as_nanos());
        let ttl_ms = event.ttl.map(|ttl| u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX));
        let error = event.error.map(tracing::field::display);

        // Field names must match constants in attributes.rs.
        macro_rules! emit_event {
            ($level:ident) => {
                tracing::$level!(
                    cache.name = self.name,
                    cache.tier = event.tier,
                    cache.key = event.key,
                    cache.operation = operation,
                    cache.activity = activity,
                    cache.ttl_ms = ttl_ms,
                    cache.duration_ns = ?duration_ns,
                    error = error,
                    "cache.event"
                )
            };
        }

        if event.activity.is_fault() {
            emit_event!(error);
        } else {
            emit_event!(debug);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use opentelemetry::metrics::MeterProvider;

    use crate::telemetry::testing::{LogCapture, MetricTester};

    fn verbose() -> LoggingOptions {
        LoggingOptions::default().log_cache_hits(true).log_cache_misses(true)
    }

    #[test]
    fn operation_and_activity_names() {
        assert_eq!(CacheOperation::Get.as_str(), "cache.get");
        assert_eq!(CacheOperation::Set.as_str(), "cache.set");
        assert_eq!(CacheOperation::Delete.as_str(), "cache.delete");
        assert_eq!(CacheOperation::Load.as_str(), "cache.load");
        assert_eq!(CacheActivity::Hit.as_str(), "cache.hit");
        assert_eq!(CacheActivity::BackfillError.as_str(), "cache.backfill_error");
        assert_eq!(CacheActivity::LoadedAbsent.as_str(), "cache.loaded_absent");
    }

    #[test]
    fn only_failures_are_faults() {
        assert!(CacheActivity::Error.is_fault());
        assert!(CacheActivity::BackfillError.is_fault());
        assert!(CacheActivity::LoaderError.is_fault());
        assert!(CacheActivity::InvalidateError.is_fault());
        assert!(!CacheActivity::Hit.is_fault());
        assert!(!CacheActivity::Miss.is_fault());
        assert!(!CacheActivity::Backfilled.is_fault());
    }

    #[test]
    fn emit_contains_all_fields_and_values() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        let telemetry = CacheTelemetry::new("profiles", verbose());
        telemetry.record(
            &CacheEvent::new("l1", "user:7", CacheOperation::Set, CacheActivity::Backfilled)
                .ttl(Duration::from_secs(30))
                .duration(Duration::from_nanos(12_345)),
        );

        capture.assert_contains(attributes::CACHE_EVENT_NAME);
        capture.assert_contains(attributes::CACHE_KEY);
        capture.assert_contains(attributes::CACHE_TTL_NAME);
        capture.assert_contains(attributes::CACHE_DURATION_NAME);
        capture.assert_contains("profiles");
        capture.assert_contains("user:7");
        capture.assert_contains("30000");
        capture.assert_contains(CacheActivity::Backfilled.as_str());
        capture.assert_contains("DEBUG");
    }

    #[test]
    fn faults_are_logged_at_error_with_cause() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        let telemetry = CacheTelemetry::new("profiles", LoggingOptions::default());
        let cause = "connection reset";
        telemetry.record(&CacheEvent::new("redis", "k", CacheOperation::Get, CacheActivity::Error).error(&cause));

        capture.assert_contains("ERROR");
        capture.assert_contains("connection reset");
    }

    #[test]
    fn default_options_suppress_hits_and_misses() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        let telemetry = CacheTelemetry::new("profiles", LoggingOptions::default());
        telemetry.record(&CacheEvent::new("l1", "k", CacheOperation::Get, CacheActivity::Hit));
        telemetry.record(&CacheEvent::new("l1", "k", CacheOperation::Get, CacheActivity::Miss));
        telemetry.record(&CacheEvent::new("l1", "k", CacheOperation::Set, CacheActivity::Backfilled));

        assert!(capture.output().is_empty());
    }

    #[test]
    fn silent_options_suppress_faults() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        let telemetry = CacheTelemetry::new("profiles", LoggingOptions::silent());
        telemetry.record(&CacheEvent::new(LOADER, "k", CacheOperation::Load, CacheActivity::LoaderError));

        assert!(capture.output().is_empty());
    }

    #[test]
    fn hits_logged_only_when_enabled() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        let telemetry = CacheTelemetry::new("profiles", LoggingOptions::silent().log_cache_hits(true));
        telemetry.record(&CacheEvent::new("l1", "k", CacheOperation::Get, CacheActivity::Miss));
        assert!(capture.output().is_empty());

        telemetry.record(&CacheEvent::new("l1", "k", CacheOperation::Get, CacheActivity::Hit));
        capture.assert_contains(CacheActivity::Hit.as_str());
    }

    #[test]
    fn metrics_record_emits_tier_attributes() {
        let tester = MetricTester::new();
        let meter = tester.meter_provider().meter("inception");
        let telemetry = CacheTelemetry::new("profiles", LoggingOptions::silent()).with_meter(&meter);

        telemetry.record(
            &CacheEvent::new("l2", "k", CacheOperation::Get, CacheActivity::Hit).duration(Duration::from_millis(5)),
        );

        tester.assert_attributes_contain(&[
            KeyValue::new(attributes::CACHE_NAME, "profiles"),
            KeyValue::new(attributes::CACHE_TIER, "l2"),
            KeyValue::new(attributes::CACHE_OPERATION_NAME, CacheOperation::Get.as_str()),
            KeyValue::new(attributes::CACHE_ACTIVITY_NAME, CacheActivity::Hit.as_str()),
        ]);
        tester.assert_metric_recorded(metrics::CACHE_EVENT_COUNT_NAME);
        tester.assert_metric_recorded(metrics::CACHE_OPERATION_DURATION_NAME);
    }

    #[test]
    fn metrics_are_recorded_even_when_logging_is_silent() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        let tester = MetricTester::new();
        let meter = tester.meter_provider().meter("inception");
        let telemetry = CacheTelemetry::new("profiles", LoggingOptions::silent()).with_meter(&meter);

        telemetry.record(&CacheEvent::new("l1", "k", CacheOperation::Get, CacheActivity::Miss));

        assert!(capture.output().is_empty());
        tester.assert_metric_recorded(metrics::CACHE_EVENT_COUNT_NAME);
    }
}
