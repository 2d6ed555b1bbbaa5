// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the controller.
//!
//! Metric names carry the `svidctl_` namespace prefix and are exposed via
//! the `/metrics` HTTP endpoint, so persistent failures (failed issuances,
//! skipped namespaces) stay observable instead of manifesting only as
//! stale or missing secrets.

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

const METRICS_NAMESPACE: &str = "svidctl";

/// Global Prometheus registry; all metrics below self-register into it on
/// first access.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Total issuance attempts, by identity namespace and outcome
/// (`success`, `failure`).
pub static ISSUANCE_ATTEMPTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_issuance_attempts_total"),
        "Total certificate issuance attempts by namespace and outcome",
    );
    let counter = CounterVec::new(opts, &["namespace", "outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total rotations performed, by namespace and reason
/// (`expiring`, `root_drift`, `malformed`).
pub static ROTATIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_rotations_total"),
        "Total secret rotations performed by namespace and reason",
    );
    let counter = CounterVec::new(opts, &["namespace", "reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total events skipped because their namespace is not managed.
pub static SKIPPED_UNMANAGED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_skipped_unmanaged_total"),
        "Total events skipped because the namespace is not managed",
    );
    let counter = CounterVec::new(opts, &["namespace"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of event-handler invocations, by handler name.
pub static RECONCILE_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconcile_duration_seconds"),
        "Duration of event-handler invocations by handler",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["handler"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Total cluster-API retry exhaustions (issuance or rotation abandoned
/// after R attempts).
pub static RETRY_EXHAUSTED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_retry_exhausted_total"),
        "Total operations abandoned after exhausting the retry budget",
    );
    let counter = CounterVec::new(opts, &["operation"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Current leader election status (1 = leader, 0 = follower), by pod name.
pub static LEADER_STATUS: LazyLock<prometheus::GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_leader_status"),
        "Current leader election status (1 = leader, 0 = follower)",
    );
    let gauge = prometheus::GaugeVec::new(opts, &["pod_name"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Records a successful issuance.
pub fn record_issuance_success(namespace: &str) {
    ISSUANCE_ATTEMPTS_TOTAL
        .with_label_values(&[namespace, "success"])
        .inc();
}

/// Records a failed issuance attempt (does not imply retry exhaustion).
pub fn record_issuance_failure(namespace: &str) {
    ISSUANCE_ATTEMPTS_TOTAL
        .with_label_values(&[namespace, "failure"])
        .inc();
}

/// Records a rotation performed for the given reason.
pub fn record_rotation(namespace: &str, reason: &str) {
    ROTATIONS_TOTAL.with_label_values(&[namespace, reason]).inc();
}

/// Records a skipped event due to an unmanaged namespace.
pub fn record_skipped_unmanaged(namespace: &str) {
    SKIPPED_UNMANAGED_TOTAL.with_label_values(&[namespace]).inc();
}

/// Records that a handler exhausted its retry budget.
pub fn record_retry_exhausted(operation: &str) {
    RETRY_EXHAUSTED_TOTAL.with_label_values(&[operation]).inc();
}

/// Records the wall-clock duration of an event-handler invocation.
pub fn record_handler_duration(handler: &str, duration: Duration) {
    RECONCILE_DURATION_SECONDS
        .with_label_values(&[handler])
        .observe(duration.as_secs_f64());
}

/// Records a leader-election status change.
pub fn record_leader_status(pod_name: &str, is_leader: bool) {
    LEADER_STATUS
        .with_label_values(&[pod_name])
        .set(if is_leader { 1.0 } else { 0.0 });
}

/// Gathers and encodes all metrics in Prometheus text format.
///
/// # Errors
/// Returns an error if encoding the registered metric families fails.
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
