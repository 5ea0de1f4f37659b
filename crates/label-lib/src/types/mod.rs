//! Label type catalog
//!
//! A closed set of record shapes describing Kubernetes troubleshooting and
//! operations question/answer pairs. Every variant embeds a [`BaseLabel`]
//! and is reachable both as its concrete type and through the [`Label`]
//! capability trait or the [`AnyLabel`] sum type.

mod basic_qa;
mod common;
mod deployment;
mod multi_cluster;
mod network;
mod resource;
mod service_mesh;
mod troubleshooting;

#[cfg(test)]
mod tests;

pub use basic_qa::BasicQaLabel;
pub use common::{Context, Event, MetricData, Resolution, ResourceMetric, ResourceMetrics};
pub use deployment::{
    DeploymentAnalysis, DeploymentContext, DeploymentLabel, DeploymentStatus, PodCondition,
};
pub use multi_cluster::{
    Cluster, ClusterAnalysis, ClusterContext, ClusterDiagnostics, DnsCheck, FederationStatus,
    MultiClusterLabel,
};
pub use network::{
    ConnectivityTest, LabelSelector, NetworkAnalysis, NetworkContext, NetworkLabel, NetworkPolicy,
    NetworkPolicyPeer, NetworkPolicyRule, NetworkPolicySpec, ServiceEndpoint,
};
pub use resource::{ResourceAnalysis, ResourceImpact, ResourceLabel, ResourceState, ResourceUsage};
pub use service_mesh::{
    MeshAnalysis, MeshContext, MeshMetrics, ServiceMeshLabel, Span, Telemetry, Trace,
};
pub use troubleshooting::{TroubleshootingAnalysis, TroubleshootingEvidence, TroubleshootingLabel};

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LabelError;
use crate::factory::IdStrategy;
use crate::validation::ValidationError;

/// Kind of label, serialized as its wire tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelType {
    BasicQa,
    Troubleshooting,
    Resource,
    Deployment,
    Network,
    ServiceMesh,
    MultiCluster,
}

impl LabelType {
    pub const ALL: [LabelType; 7] = [
        LabelType::BasicQa,
        LabelType::Troubleshooting,
        LabelType::Resource,
        LabelType::Deployment,
        LabelType::Network,
        LabelType::ServiceMesh,
        LabelType::MultiCluster,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LabelType::BasicQa => "basic_qa",
            LabelType::Troubleshooting => "troubleshooting",
            LabelType::Resource => "resource",
            LabelType::Deployment => "deployment",
            LabelType::Network => "network",
            LabelType::ServiceMesh => "service_mesh",
            LabelType::MultiCluster => "multi_cluster",
        }
    }
}

impl fmt::Display for LabelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabelType {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LabelType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| LabelError::UnknownType(s.to_string()))
    }
}

/// Identity shared by every label
///
/// Fields are only readable: the identifier and timestamp are fixed when
/// the label is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseLabel {
    id: String,
    question: String,
    timestamp: DateTime<Utc>,
}

impl BaseLabel {
    /// Build a base record stamped now, with a `"<tag>-<unix-seconds>"` id
    pub fn new(label_type: LabelType, question: impl Into<String>) -> Self {
        Self::with_strategy(label_type, question, IdStrategy::default())
    }

    pub fn with_strategy(
        label_type: LabelType,
        question: impl Into<String>,
        strategy: IdStrategy,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: strategy.generate_id(label_type, now),
            question: question.into(),
            timestamp: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Capability shared by every label variant
pub trait Label: fmt::Debug + Send + Sync {
    fn base(&self) -> &BaseLabel;

    fn label_type(&self) -> LabelType;

    /// Check the payload against this variant's field and consistency rules
    fn validate(&self) -> Result<(), ValidationError>;

    fn id(&self) -> &str {
        self.base().id()
    }

    fn question(&self) -> &str {
        self.base().question()
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.base().timestamp()
    }
}

/// Any label variant, tagged on the wire with `label_type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "label_type", rename_all = "snake_case")]
pub enum AnyLabel {
    BasicQa(BasicQaLabel),
    Troubleshooting(TroubleshootingLabel),
    Resource(ResourceLabel),
    Deployment(DeploymentLabel),
    Network(NetworkLabel),
    ServiceMesh(ServiceMeshLabel),
    MultiCluster(MultiClusterLabel),
}

impl AnyLabel {
    /// Empty payload of the matching variant around `base`
    pub(crate) fn empty(label_type: LabelType, base: BaseLabel) -> Self {
        match label_type {
            LabelType::BasicQa => AnyLabel::BasicQa(BasicQaLabel::from_base(base)),
            LabelType::Troubleshooting => {
                AnyLabel::Troubleshooting(TroubleshootingLabel::from_base(base))
            }
            LabelType::Resource => AnyLabel::Resource(ResourceLabel::from_base(base)),
            LabelType::Deployment => AnyLabel::Deployment(DeploymentLabel::from_base(base)),
            LabelType::Network => AnyLabel::Network(NetworkLabel::from_base(base)),
            LabelType::ServiceMesh => AnyLabel::ServiceMesh(ServiceMeshLabel::from_base(base)),
            LabelType::MultiCluster => AnyLabel::MultiCluster(MultiClusterLabel::from_base(base)),
        }
    }

    pub fn as_label(&self) -> &dyn Label {
        match self {
            AnyLabel::BasicQa(l) => l,
            AnyLabel::Troubleshooting(l) => l,
            AnyLabel::Resource(l) => l,
            AnyLabel::Deployment(l) => l,
            AnyLabel::Network(l) => l,
            AnyLabel::ServiceMesh(l) => l,
            AnyLabel::MultiCluster(l) => l,
        }
    }

    pub fn to_json(&self) -> Result<String, LabelError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, LabelError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Label for AnyLabel {
    fn base(&self) -> &BaseLabel {
        self.as_label().base()
    }

    fn label_type(&self) -> LabelType {
        self.as_label().label_type()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.as_label().validate()
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for AnyLabel {
                fn from(label: $ty) -> Self {
                    AnyLabel::$variant(label)
                }
            }
        )*
    };
}

impl_from_variant! {
    BasicQa => BasicQaLabel,
    Troubleshooting => TroubleshootingLabel,
    Resource => ResourceLabel,
    Deployment => DeploymentLabel,
    Network => NetworkLabel,
    ServiceMesh => ServiceMeshLabel,
    MultiCluster => MultiClusterLabel,
}
