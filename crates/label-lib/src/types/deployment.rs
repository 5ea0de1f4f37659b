use serde::{Deserialize, Serialize};

use super::{BaseLabel, Event, Label, LabelType, Resolution};
use crate::validation::{ValidationError, Violations};

pub const ROLLOUT_STRATEGIES: &[&str] = &["RollingUpdate", "Recreate", "BlueGreen", "Canary"];

pub const CONDITION_STATUSES: &[&str] = &["True", "False", "Unknown"];

/// Deployment rollout troubleshooting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentLabel {
    #[serde(flatten)]
    pub(crate) base: BaseLabel,
    #[serde(default)]
    pub deployment_context: DeploymentContext,
    #[serde(default)]
    pub analysis: DeploymentAnalysis,
    #[serde(default)]
    pub resolution: Resolution,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentContext {
    pub service: String,
    pub old_version: String,
    pub new_version: String,
    pub rollout_strategy: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentAnalysis {
    pub status: DeploymentStatus,
    pub events: Vec<Event>,
    pub pod_conditions: Vec<PodCondition>,
    pub logs: Vec<String>,
}

/// Replica counts as reported by `kubectl rollout status`
///
/// Counts are signed on the wire; negative values are rejected by validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentStatus {
    pub desired_replicas: i32,
    pub updated_replicas: i32,
    pub available_replicas: i32,
    pub unavailable_replicas: i32,
}

impl DeploymentStatus {
    fn counts(&self) -> [(&'static str, i32); 4] {
        [
            ("desired_replicas", self.desired_replicas),
            ("updated_replicas", self.updated_replicas),
            ("available_replicas", self.available_replicas),
            ("unavailable_replicas", self.unavailable_replicas),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PodCondition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    pub reason: String,
    pub message: String,
}

impl DeploymentLabel {
    pub fn new(question: impl Into<String>) -> Self {
        Self::from_base(BaseLabel::new(LabelType::Deployment, question))
    }

    pub(crate) fn from_base(base: BaseLabel) -> Self {
        Self {
            base,
            deployment_context: DeploymentContext::default(),
            analysis: DeploymentAnalysis::default(),
            resolution: Resolution::default(),
        }
    }
}

impl Label for DeploymentLabel {
    fn base(&self) -> &BaseLabel {
        &self.base
    }

    fn label_type(&self) -> LabelType {
        LabelType::Deployment
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Violations::new();
        v.check_base(&self.base, LabelType::Deployment);

        let ctx = &self.deployment_context;
        v.required("deployment_context.service", &ctx.service);
        let has_new = v.required("deployment_context.new_version", &ctx.new_version);
        if has_new && ctx.old_version.trim() == ctx.new_version.trim() {
            v.inconsistent(
                "deployment_context.new_version",
                format!("same as old_version '{}'", ctx.old_version.trim()),
            );
        }
        v.one_of(
            "deployment_context.rollout_strategy",
            &ctx.rollout_strategy,
            ROLLOUT_STRATEGIES,
        );

        let status = &self.analysis.status;
        for (name, count) in status.counts() {
            v.in_range(
                format!("analysis.status.{}", name),
                i64::from(count),
                0,
                i64::from(i32::MAX),
            );
        }
        if status.unavailable_replicas > status.desired_replicas {
            v.inconsistent(
                "analysis.status.unavailable_replicas",
                format!(
                    "{} unavailable exceeds {} desired",
                    status.unavailable_replicas, status.desired_replicas
                ),
            );
        }

        for (i, event) in self.analysis.events.iter().enumerate() {
            event.check(&format!("analysis.events[{}]", i), &mut v);
        }

        for (i, condition) in self.analysis.pod_conditions.iter().enumerate() {
            let prefix = format!("analysis.pod_conditions[{}]", i);
            v.required(format!("{}.type", prefix), &condition.condition_type);
            v.one_of(
                format!("{}.status", prefix),
                &condition.status,
                CONDITION_STATUSES,
            );
        }

        self.resolution.check("resolution", &mut v);

        v.into_result(LabelType::Deployment, self.base.id())
    }
}
