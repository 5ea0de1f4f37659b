use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{BaseLabel, Context, Label, LabelType, Resolution};
use crate::validation::{ValidationError, Violations};

/// Full incident write-up: symptoms, evidence and resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TroubleshootingLabel {
    #[serde(flatten)]
    pub(crate) base: BaseLabel,
    #[serde(default)]
    pub analysis: TroubleshootingAnalysis,
    #[serde(default)]
    pub metadata: Context,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TroubleshootingAnalysis {
    pub symptoms: Vec<String>,
    pub root_cause: String,
    pub evidence: TroubleshootingEvidence,
    pub resolution: Resolution,
}

/// Evidence gathered while diagnosing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TroubleshootingEvidence {
    pub metrics: HashMap<String, String>,
    pub logs: Vec<String>,
    pub events: Vec<String>,
}

impl TroubleshootingEvidence {
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty() && self.logs.is_empty() && self.events.is_empty()
    }
}

impl TroubleshootingLabel {
    pub fn new(question: impl Into<String>) -> Self {
        Self::from_base(BaseLabel::new(LabelType::Troubleshooting, question))
    }

    pub(crate) fn from_base(base: BaseLabel) -> Self {
        Self {
            base,
            analysis: TroubleshootingAnalysis::default(),
            metadata: Context::default(),
        }
    }
}

impl Label for TroubleshootingLabel {
    fn base(&self) -> &BaseLabel {
        &self.base
    }

    fn label_type(&self) -> LabelType {
        LabelType::Troubleshooting
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Violations::new();
        v.check_base(&self.base, LabelType::Troubleshooting);

        let analysis = &self.analysis;
        v.non_blank_entries("analysis.symptoms", &analysis.symptoms);
        v.required("analysis.root_cause", &analysis.root_cause);

        if analysis.evidence.is_empty() {
            v.inconsistent(
                "analysis.evidence",
                "needs at least one metric, log or event",
            );
        }

        let resolution = &analysis.resolution;
        resolution.check("analysis.resolution", &mut v);
        if resolution.steps.is_empty() && resolution.fix.trim().is_empty() {
            v.inconsistent("analysis.resolution", "needs remediation steps or a fix");
        }

        self.metadata.check_pod_scope("metadata", &mut v);

        v.into_result(LabelType::Troubleshooting, self.base.id())
    }
}
