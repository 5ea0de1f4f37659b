use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{BaseLabel, Label, LabelType};
use crate::validation::{ValidationError, Violations};

/// Sync states that must come with an explanation
const FAILED_SYNC_STATES: &[&str] = &["failed", "error", "errored"];

/// Multi-cluster federation label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiClusterLabel {
    #[serde(flatten)]
    pub(crate) base: BaseLabel,
    #[serde(default)]
    pub cluster_context: ClusterContext,
    #[serde(default)]
    pub analysis: ClusterAnalysis,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterContext {
    pub clusters: Vec<Cluster>,
    pub federation_type: String,
    pub service_discovery: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cluster {
    pub name: String,
    pub region: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterAnalysis {
    pub symptoms: Vec<String>,
    pub diagnostics: ClusterDiagnostics,
    pub root_cause: String,
    pub resolution: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterDiagnostics {
    pub dns_checks: Vec<DnsCheck>,
    pub federation_status: FederationStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsCheck {
    pub query: String,
    pub status: String,
    pub expected: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FederationStatus {
    #[serde(rename = "kubefed_controller")]
    pub controller: String,
    pub sync_status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
}

impl FederationStatus {
    pub fn is_failed(&self) -> bool {
        let status = self.sync_status.trim();
        FAILED_SYNC_STATES
            .iter()
            .any(|s| s.eq_ignore_ascii_case(status))
    }
}

impl MultiClusterLabel {
    pub fn new(question: impl Into<String>) -> Self {
        Self::from_base(BaseLabel::new(LabelType::MultiCluster, question))
    }

    pub(crate) fn from_base(base: BaseLabel) -> Self {
        Self {
            base,
            cluster_context: ClusterContext::default(),
            analysis: ClusterAnalysis::default(),
        }
    }
}

impl Label for MultiClusterLabel {
    fn base(&self) -> &BaseLabel {
        &self.base
    }

    fn label_type(&self) -> LabelType {
        LabelType::MultiCluster
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Violations::new();
        v.check_base(&self.base, LabelType::MultiCluster);

        let ctx = &self.cluster_context;
        if ctx.clusters.len() < 2 {
            v.inconsistent(
                "cluster_context.clusters",
                format!("needs at least 2 clusters, got {}", ctx.clusters.len()),
            );
        }

        let mut seen = HashSet::new();
        for (i, cluster) in ctx.clusters.iter().enumerate() {
            let prefix = format!("cluster_context.clusters[{}]", i);
            let name = cluster.name.trim();
            if v.required(format!("{}.name", prefix), name) && !seen.insert(name) {
                v.inconsistent(
                    format!("{}.name", prefix),
                    format!("duplicate cluster name '{}'", name),
                );
            }
            v.required(format!("{}.region", prefix), &cluster.region);
            v.required(format!("{}.status", prefix), &cluster.status);
        }

        v.required("cluster_context.federation_type", &ctx.federation_type);
        v.required("cluster_context.service_discovery", &ctx.service_discovery);

        let analysis = &self.analysis;
        v.non_blank_entries("analysis.symptoms", &analysis.symptoms);

        for (i, check) in analysis.diagnostics.dns_checks.iter().enumerate() {
            let prefix = format!("analysis.diagnostics.dns_checks[{}]", i);
            v.required(format!("{}.query", prefix), &check.query);
            v.required(format!("{}.status", prefix), &check.status);
        }

        let federation = &analysis.diagnostics.federation_status;
        let has_sync = v.required(
            "analysis.diagnostics.federation_status.sync_status",
            &federation.sync_status,
        );
        if has_sync && federation.is_failed() && federation.error.trim().is_empty() {
            v.inconsistent(
                "analysis.diagnostics.federation_status.error",
                format!("sync status '{}' needs an error", federation.sync_status.trim()),
            );
        }

        v.required("analysis.root_cause", &analysis.root_cause);
        v.required("analysis.resolution", &analysis.resolution);

        v.into_result(LabelType::MultiCluster, self.base.id())
    }
}
