use serde::{Deserialize, Serialize};

use super::{BaseLabel, Label, LabelType};
use crate::quantity::parse_percent;
use crate::validation::{ValidationError, Violations};

pub const MESH_PLATFORMS: &[&str] = &[
    "istio",
    "linkerd",
    "consul",
    "kuma",
    "cilium",
    "open_service_mesh",
];

pub const SPAN_STATUSES: &[&str] = &["ok", "error", "unset"];

/// Service mesh telemetry label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceMeshLabel {
    #[serde(flatten)]
    pub(crate) base: BaseLabel,
    #[serde(default)]
    pub mesh_context: MeshContext,
    #[serde(default)]
    pub telemetry: Telemetry,
    #[serde(default)]
    pub analysis: MeshAnalysis,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshContext {
    pub source_service: String,
    pub destination_service: String,
    pub mesh_platform: String,
    pub observed_period: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Telemetry {
    pub metrics: MeshMetrics,
    pub traces: Vec<Trace>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshMetrics {
    pub error_rate: String,
    pub latency_p95: String,
    pub requests_per_second: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trace {
    pub trace_id: String,
    pub spans: Vec<Span>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Span {
    pub service: String,
    pub operation: String,
    pub duration: String,
    pub status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
}

impl Span {
    fn check(&self, prefix: &str, v: &mut Violations) {
        v.required(format!("{}.service", prefix), &self.service);
        v.required(format!("{}.operation", prefix), &self.operation);
        v.one_of_ignore_case(format!("{}.status", prefix), &self.status, SPAN_STATUSES);

        let status = self.status.trim();
        let has_error = !self.error.trim().is_empty();
        if status.eq_ignore_ascii_case("error") && !has_error {
            v.inconsistent(format!("{}.error", prefix), "error status needs an error message");
        } else if status.eq_ignore_ascii_case("ok") && has_error {
            v.inconsistent(
                format!("{}.error", prefix),
                format!("span reports ok but carries error '{}'", self.error.trim()),
            );
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshAnalysis {
    pub root_cause: String,
    pub evidence: String,
    pub solution: String,
}

impl ServiceMeshLabel {
    pub fn new(question: impl Into<String>) -> Self {
        Self::from_base(BaseLabel::new(LabelType::ServiceMesh, question))
    }

    pub(crate) fn from_base(base: BaseLabel) -> Self {
        Self {
            base,
            mesh_context: MeshContext::default(),
            telemetry: Telemetry::default(),
            analysis: MeshAnalysis::default(),
        }
    }
}

impl Label for ServiceMeshLabel {
    fn base(&self) -> &BaseLabel {
        &self.base
    }

    fn label_type(&self) -> LabelType {
        LabelType::ServiceMesh
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Violations::new();
        v.check_base(&self.base, LabelType::ServiceMesh);

        let ctx = &self.mesh_context;
        v.required("mesh_context.source_service", &ctx.source_service);
        v.required("mesh_context.destination_service", &ctx.destination_service);
        v.one_of_ignore_case("mesh_context.mesh_platform", &ctx.mesh_platform, MESH_PLATFORMS);
        v.required("mesh_context.observed_period", &ctx.observed_period);

        let error_rate = self.telemetry.metrics.error_rate.trim();
        if v.required("telemetry.metrics.error_rate", error_rate) && error_rate.ends_with('%') {
            match parse_percent(error_rate) {
                Ok(pct) if !(0.0..=100.0).contains(&pct) => {
                    v.malformed(
                        "telemetry.metrics.error_rate",
                        error_rate,
                        "percentage must be within 0..=100",
                    );
                }
                Ok(_) => {}
                Err(e) => v.malformed("telemetry.metrics.error_rate", error_rate, e.to_string()),
            }
        }

        for (i, trace) in self.telemetry.traces.iter().enumerate() {
            let prefix = format!("telemetry.traces[{}]", i);
            v.required(format!("{}.trace_id", prefix), &trace.trace_id);
            if v.non_empty(format!("{}.spans", prefix), &trace.spans) {
                for (j, span) in trace.spans.iter().enumerate() {
                    span.check(&format!("{}.spans[{}]", prefix, j), &mut v);
                }
            }
        }

        let analysis = &self.analysis;
        v.required("analysis.root_cause", &analysis.root_cause);
        v.required("analysis.evidence", &analysis.evidence);
        v.required("analysis.solution", &analysis.solution);

        v.into_result(LabelType::ServiceMesh, self.base.id())
    }
}
