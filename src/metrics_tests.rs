// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! Unit tests for metrics.rs

#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn issuance_success_increments_counter() {
        record_issuance_success("test-ns-metrics-1");
        let counter = ISSUANCE_ATTEMPTS_TOTAL.with_label_values(&["test-ns-metrics-1", "success"]);
        assert!(counter.get() > 0.0);
    }

    #[test]
    fn rotation_increments_counter_with_reason() {
        record_rotation("test-ns-metrics-2", "expiring");
        let counter = ROTATIONS_TOTAL.with_label_values(&["test-ns-metrics-2", "expiring"]);
        assert!(counter.get() > 0.0);
    }

    #[test]
    fn gather_metrics_contains_namespace_prefix() {
        record_issuance_success("test-ns-metrics-3");
        let text = gather_metrics().expect("gather should succeed");
        assert!(text.contains("svidctl_issuance_attempts_total"));
    }
}
