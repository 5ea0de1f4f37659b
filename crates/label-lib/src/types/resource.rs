//! Resource optimization labels
//!
//! Requests and limits are checked as Kubernetes quantities so that a
//! label claiming `request: 2Gi, limit: 512Mi` is rejected.

use serde::{Deserialize, Serialize};

use super::{BaseLabel, Label, LabelType, ResourceMetric, ResourceMetrics};
use crate::quantity::{parse_percent, parse_quantity};
use crate::validation::{ValidationError, Violations};

/// Accepted values for `predicted_impact.risk`
pub const RISK_LEVELS: &[&str] = &["low", "medium", "high"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLabel {
    #[serde(flatten)]
    pub(crate) base: BaseLabel,
    #[serde(default)]
    pub scenario: String,
    #[serde(default)]
    pub current_state: ResourceState,
    #[serde(default)]
    pub analysis: ResourceAnalysis,
}

/// Configured resources plus observed usage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceState {
    pub resources: ResourceMetrics,
    pub metrics: ResourceUsage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceUsage {
    pub cpu_usage_p95: String,
    pub memory_usage_p95: String,
    pub cpu_throttling: String,
    pub oom_events: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceAnalysis {
    pub findings: Vec<String>,
    pub recommendation: String,
    pub predicted_impact: ResourceImpact,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceImpact {
    pub cost_savings: String,
    pub performance: String,
    pub risk: String,
}

impl ResourceLabel {
    pub fn new(question: impl Into<String>) -> Self {
        Self::from_base(BaseLabel::new(LabelType::Resource, question))
    }

    pub(crate) fn from_base(base: BaseLabel) -> Self {
        Self {
            base,
            scenario: String::new(),
            current_state: ResourceState::default(),
            analysis: ResourceAnalysis::default(),
        }
    }
}

fn required_quantity(field: String, value: &str, v: &mut Violations) -> Option<f64> {
    if !v.required(field.clone(), value) {
        return None;
    }
    match parse_quantity(value) {
        Ok(q) => Some(q),
        Err(e) => {
            v.malformed(field, value, e.to_string());
            None
        }
    }
}

fn check_metric(prefix: &str, metric: &ResourceMetric, v: &mut Violations) {
    required_quantity(format!("{}.usage", prefix), &metric.usage, v);
    let limit = required_quantity(format!("{}.limit", prefix), &metric.limit, v);
    let request = required_quantity(format!("{}.request", prefix), &metric.request, v);

    if let (Some(request), Some(limit)) = (request, limit) {
        if request > limit {
            v.inconsistent(
                format!("{}.request", prefix),
                format!(
                    "request {} exceeds limit {}",
                    metric.request.trim(),
                    metric.limit.trim()
                ),
            );
        }
    }

    if !metric.utilization.trim().is_empty() {
        if let Err(e) = parse_percent(&metric.utilization) {
            v.malformed(
                format!("{}.utilization", prefix),
                &metric.utilization,
                e.to_string(),
            );
        }
    }
}

impl Label for ResourceLabel {
    fn base(&self) -> &BaseLabel {
        &self.base
    }

    fn label_type(&self) -> LabelType {
        LabelType::Resource
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Violations::new();
        v.check_base(&self.base, LabelType::Resource);

        v.required("scenario", &self.scenario);

        let resources = &self.current_state.resources;
        check_metric("current_state.resources.cpu", &resources.cpu, &mut v);
        check_metric("current_state.resources.memory", &resources.memory, &mut v);

        let analysis = &self.analysis;
        v.non_blank_entries("analysis.findings", &analysis.findings);
        v.required("analysis.recommendation", &analysis.recommendation);
        v.one_of_ignore_case(
            "analysis.predicted_impact.risk",
            &analysis.predicted_impact.risk,
            RISK_LEVELS,
        );

        v.into_result(LabelType::Resource, self.base.id())
    }
}
