//! Metrics for content store operations.

use std::time::Instant;

use opentelemetry::{
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};

/// Metrics for content store operations.
#[derive(Clone)]
pub struct ContentMetrics {
    /// Histogram for operation latencies.
    pub operations: Histogram<f64>,

    /// Counter for operation errors.
    pub errors: Counter<u64>,

    /// Counter for circuit breaker state transitions.
    pub circuit_transitions: Counter<u64>,

    /// Counter for bytes written, by upload strategy.
    pub uploaded_bytes: Counter<u64>,
}

impl ContentMetrics {
    /// Create new metrics from a meter.
    pub fn new(meter: &Meter) -> Self {
        let operations = meter
            .f64_histogram("content_store_operation_duration_seconds")
            .with_description("Duration of content store operations in seconds")
            .build();

        let errors = meter
            .u64_counter("content_store_errors_total")
            .with_description("Total number of content store errors")
            .build();

        let circuit_transitions = meter
            .u64_counter("content_store_circuit_transitions_total")
            .with_description("Circuit breaker state transitions")
            .build();

        let uploaded_bytes = meter
            .u64_counter("content_store_uploaded_bytes_total")
            .with_description("Bytes uploaded to the content store")
            .build();

        Self {
            operations,
            errors,
            circuit_transitions,
            uploaded_bytes,
        }
    }

    pub fn record_error(&self, op: &'static str) {
        self.errors.add(1, &[KeyValue::new("op", op)]);
    }

    /// Start timing `op`.
    pub fn time(&self, op: &'static str) -> Timer {
        Timer {
            started: Instant::now(),
            histogram: self.operations.clone(),
            op,
        }
    }
}

/// Records the elapsed time of one operation into the latency histogram
/// when dropped.
pub struct Timer {
    started: Instant,
    histogram: Histogram<f64>,
    op: &'static str,
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.histogram.record(
            self.started.elapsed().as_secs_f64(),
            &[KeyValue::new("op", self.op)],
        );
    }
}

#[cfg(test)]
mod tests {
    use opentelemetry::global;

    use super::*;

    #[test]
    fn test_timer_and_counters_record_without_exporter() {
        let metrics = ContentMetrics::new(&global::meter("content_store_test"));
        {
            let _timer = metrics.time("get");
        }
        metrics.record_error("get");
        metrics.uploaded_bytes.add(42, &[KeyValue::new("strategy", "single")]);
    }
}
