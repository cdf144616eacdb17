//! Prometheus metrics for the generation pipeline.

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, Encoder, Histogram, IntCounter, IntCounterVec, Registry,
    TextEncoder,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct GenerationMetrics {
    pub generations_total: IntCounter,
    pub failures_total: IntCounterVec,
    pub generation_seconds: Histogram,

    registry: Arc<Registry>,
}

impl GenerationMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let generations_total = register_int_counter_with_registry!(
            "threadloom_generations_total",
            "Total number of calendars generated successfully",
            registry
        )
        .unwrap();

        let failures_total = register_int_counter_vec_with_registry!(
            "threadloom_failures_total",
            "Generation failures by reason",
            &["reason"],
            registry
        )
        .unwrap();

        let generation_seconds = register_histogram_with_registry!(
            "threadloom_generation_seconds",
            "Wall-clock duration of generation requests",
            vec![1.0, 5.0, 15.0, 30.0, 60.0, 90.0, 120.0],
            registry
        )
        .unwrap();

        Self {
            generations_total,
            failures_total,
            generation_seconds,
            registry: Arc::new(registry),
        }
    }

    pub fn observe_failure(&self, reason: &str) {
        self.failures_total.with_label_values(&[reason]).inc();
    }

    /// Text exposition format for the /metrics endpoint.
    pub fn encode(&self) -> String {
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        if encoder.encode(&families, &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl Default for GenerationMetrics {
    fn default() -> Self {
        Self::new()
    }
}
