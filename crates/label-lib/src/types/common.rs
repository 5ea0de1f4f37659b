//! Structures shared by several label variants

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::Violations;

/// Common contextual information about where a question applies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Context {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pod_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cluster: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub service: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    /// Free-form fields that do not fit the typed ones
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub additional: HashMap<String, serde_json::Value>,
}

impl Context {
    /// True when none of pod, namespace, cluster or service is set
    pub fn is_unscoped(&self) -> bool {
        [&self.pod_name, &self.namespace, &self.cluster, &self.service]
            .iter()
            .all(|s| s.trim().is_empty())
    }

    /// A pod is only addressable within a namespace
    pub(crate) fn check_pod_scope(&self, prefix: &str, v: &mut Violations) {
        if !self.pod_name.trim().is_empty() && self.namespace.trim().is_empty() {
            v.inconsistent(
                format!("{}.namespace", prefix),
                format!("pod '{}' needs a namespace", self.pod_name),
            );
        }
    }
}

/// CPU and memory figures for one workload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceMetrics {
    pub cpu: ResourceMetric,
    pub memory: ResourceMetric,
}

/// A single resource in Kubernetes quantity notation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceMetric {
    pub usage: String,
    pub limit: String,
    pub request: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub throttling: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub utilization: String,
}

/// How an incident was resolved
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resolution {
    pub root_cause: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub fix: String,
    pub verification: String,
}

impl Resolution {
    pub(crate) fn check(&self, prefix: &str, v: &mut Violations) {
        v.required(format!("{}.root_cause", prefix), &self.root_cause);
        v.required(format!("{}.verification", prefix), &self.verification);
    }
}

/// A metric sample
///
/// Not embedded in any variant. Kept in the catalog as a standalone record
/// for callers that collect samples before summarising them into a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricData {
    pub value: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,
}

impl MetricData {
    /// Sample stamped now
    pub fn new(value: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            timestamp: Utc::now(),
            unit: unit.into(),
        }
    }
}

/// A Kubernetes event as seen by `kubectl get events`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    pub reason: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub const TYPES: &'static [&'static str] = &["Normal", "Warning"];

    /// Convenience constructor for callers building deployment evidence;
    /// the event is stamped now
    pub fn new(
        event_type: impl Into<String>,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            reason: reason.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub(crate) fn check(&self, prefix: &str, v: &mut Violations) {
        v.one_of(format!("{}.type", prefix), &self.event_type, Self::TYPES);
        v.required(format!("{}.reason", prefix), &self.reason);
    }
}
