//! Network policy diagnosis labels
//!
//! Policy shapes follow the Kubernetes `NetworkPolicy` API, so peers and
//! selectors keep their camelCase keys on the wire.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{BaseLabel, Label, LabelType};
use crate::validation::{ValidationError, Violations};

/// Protocols a connectivity test may report (case-insensitive)
pub const TEST_PROTOCOLS: &[&str] = &["TCP", "UDP", "SCTP", "HTTP", "HTTPS", "GRPC", "ICMP"];

const MAX_PORT: i64 = 65535;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkLabel {
    #[serde(flatten)]
    pub(crate) base: BaseLabel,
    #[serde(default)]
    pub network_context: NetworkContext,
    #[serde(default)]
    pub analysis: NetworkAnalysis,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkContext {
    pub source: ServiceEndpoint,
    pub destination: ServiceEndpoint,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceEndpoint {
    pub service: String,
    pub namespace: String,
    pub labels: HashMap<String, String>,
}

impl ServiceEndpoint {
    fn check(&self, prefix: &str, v: &mut Violations) {
        v.required(format!("{}.service", prefix), &self.service);
        v.required(format!("{}.namespace", prefix), &self.namespace);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkAnalysis {
    pub connectivity_test: ConnectivityTest,
    pub network_policies: Vec<NetworkPolicy>,
    pub diagnosis: String,
    pub solution: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivityTest {
    pub protocol: String,
    /// Signed so that a negative port on the wire reaches validation
    pub port: i32,
    pub result: String,
}

impl ConnectivityTest {
    fn check(&self, prefix: &str, v: &mut Violations) {
        v.one_of_ignore_case(format!("{}.protocol", prefix), &self.protocol, TEST_PROTOCOLS);
        if !self.protocol.trim().eq_ignore_ascii_case("ICMP") {
            v.in_range(format!("{}.port", prefix), i64::from(self.port), 1, MAX_PORT);
        }
        v.required(format!("{}.result", prefix), &self.result);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkPolicy {
    pub name: String,
    pub namespace: String,
    pub spec: NetworkPolicySpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkPolicySpec {
    pub ingress: Vec<NetworkPolicyRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkPolicyRule {
    pub from: Vec<NetworkPolicyPeer>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkPolicyPeer {
    pub namespace_selector: LabelSelector,
    pub pod_selector: LabelSelector,
}

impl NetworkPolicyPeer {
    /// Both selectors empty admits every pod in every namespace
    pub fn selects_everything(&self) -> bool {
        self.namespace_selector.is_empty() && self.pod_selector.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelSelector {
    pub match_labels: HashMap<String, String>,
}

impl LabelSelector {
    pub fn is_empty(&self) -> bool {
        self.match_labels.is_empty()
    }
}

impl NetworkPolicy {
    fn check(&self, prefix: &str, v: &mut Violations) {
        v.required(format!("{}.name", prefix), &self.name);
        v.required(format!("{}.namespace", prefix), &self.namespace);

        for (j, rule) in self.spec.ingress.iter().enumerate() {
            for (k, peer) in rule.from.iter().enumerate() {
                if peer.selects_everything() {
                    v.inconsistent(
                        format!("{}.spec.ingress[{}].from[{}]", prefix, j, k),
                        "namespaceSelector and podSelector are both empty",
                    );
                }
            }
        }
    }
}

impl NetworkLabel {
    pub fn new(question: impl Into<String>) -> Self {
        Self::from_base(BaseLabel::new(LabelType::Network, question))
    }

    pub(crate) fn from_base(base: BaseLabel) -> Self {
        Self {
            base,
            network_context: NetworkContext::default(),
            analysis: NetworkAnalysis::default(),
        }
    }
}

impl Label for NetworkLabel {
    fn base(&self) -> &BaseLabel {
        &self.base
    }

    fn label_type(&self) -> LabelType {
        LabelType::Network
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Violations::new();
        v.check_base(&self.base, LabelType::Network);

        self.network_context
            .source
            .check("network_context.source", &mut v);
        self.network_context
            .destination
            .check("network_context.destination", &mut v);

        let analysis = &self.analysis;
        analysis
            .connectivity_test
            .check("analysis.connectivity_test", &mut v);

        for (i, policy) in analysis.network_policies.iter().enumerate() {
            policy.check(&format!("analysis.network_policies[{}]", i), &mut v);
        }

        v.required("analysis.diagnosis", &analysis.diagnosis);
        v.required("analysis.solution", &analysis.solution);

        v.into_result(LabelType::Network, self.base.id())
    }
}
