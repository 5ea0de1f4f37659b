//! Observability for label construction and validation
//!
//! Provides:
//! - Prometheus counters (labels created, validation outcomes, unknown type tags)
//! - Structured logging with tracing

use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::types::{Label, LabelType};
use crate::validation::ValidationError;

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<LabelMetricsInner> = OnceLock::new();

struct LabelMetricsInner {
    labels_created: IntCounterVec,
    validations: IntCounterVec,
    validation_failures: IntCounterVec,
    unknown_types: IntCounter,
}

impl LabelMetricsInner {
    fn new() -> Self {
        Self {
            labels_created: register_int_counter_vec!(
                "label_created_total",
                "Number of labels created by the factory",
                &["label_type"]
            )
            .expect("Failed to register label_created_total"),

            validations: register_int_counter_vec!(
                "label_validations_total",
                "Number of label validations performed",
                &["label_type"]
            )
            .expect("Failed to register label_validations_total"),

            validation_failures: register_int_counter_vec!(
                "label_validation_failures_total",
                "Number of label validations that reported violations",
                &["label_type"]
            )
            .expect("Failed to register label_validation_failures_total"),

            unknown_types: register_int_counter!(
                "label_unknown_type_total",
                "Number of construction requests with an unknown type tag"
            )
            .expect("Failed to register label_unknown_type_total"),
        }
    }
}

/// Handle to the process-wide label metrics
///
/// Zero-sized; every copy shares the same registered counters.
#[derive(Debug, Clone, Copy)]
pub struct LabelMetrics {
    _private: (),
}

impl Default for LabelMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(LabelMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &LabelMetricsInner {
        GLOBAL_METRICS.get_or_init(LabelMetricsInner::new)
    }

    pub fn inc_created(&self, label_type: LabelType) {
        self.inner()
            .labels_created
            .with_label_values(&[label_type.as_str()])
            .inc();
    }

    pub fn inc_validations(&self, label_type: LabelType) {
        self.inner()
            .validations
            .with_label_values(&[label_type.as_str()])
            .inc();
    }

    pub fn inc_validation_failures(&self, label_type: LabelType) {
        self.inner()
            .validation_failures
            .with_label_values(&[label_type.as_str()])
            .inc();
    }

    pub fn inc_unknown_types(&self) {
        self.inner().unknown_types.inc();
    }

    pub fn created(&self, label_type: LabelType) -> u64 {
        self.inner()
            .labels_created
            .with_label_values(&[label_type.as_str()])
            .get()
    }

    pub fn validation_failures(&self, label_type: LabelType) -> u64 {
        self.inner()
            .validation_failures
            .with_label_values(&[label_type.as_str()])
            .get()
    }

    pub fn unknown_types(&self) -> u64 {
        self.inner().unknown_types.get()
    }
}

/// Structured logger for label events
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    component: String,
}

impl StructuredLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn log_label_created(&self, label: &dyn Label) {
        debug!(
            event = "label_created",
            component = %self.component,
            label_type = %label.label_type(),
            label_id = %label.id(),
            question_len = label.question().len(),
            "Created label"
        );
    }

    pub fn log_unknown_type(&self, tag: &str) {
        warn!(
            event = "unknown_label_type",
            component = %self.component,
            tag = %tag,
            "Rejected unknown label type"
        );
    }

    pub fn log_validation_passed(&self, label: &dyn Label) {
        debug!(
            event = "label_validated",
            component = %self.component,
            label_type = %label.label_type(),
            label_id = %label.id(),
            "Label passed validation"
        );
    }

    pub fn log_validation_failed(&self, error: &ValidationError) {
        let fields: Vec<&str> = error.fields().collect();
        info!(
            event = "label_validation_failed",
            component = %self.component,
            label_type = %error.label_type,
            label_id = %error.label_id,
            violations = error.violations.len(),
            fields = ?fields,
            "Label failed validation"
        );
    }
}
