use serde::{Deserialize, Serialize};

use super::{BaseLabel, Context, Label, LabelType};
use crate::validation::{ValidationError, Violations};

/// Simplest label: a question, its answer, and where it applies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicQaLabel {
    #[serde(flatten)]
    pub(crate) base: BaseLabel,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub context: Context,
}

impl BasicQaLabel {
    pub fn new(question: impl Into<String>) -> Self {
        Self::from_base(BaseLabel::new(LabelType::BasicQa, question))
    }

    pub(crate) fn from_base(base: BaseLabel) -> Self {
        Self {
            base,
            answer: String::new(),
            context: Context::default(),
        }
    }
}

impl Label for BasicQaLabel {
    fn base(&self) -> &BaseLabel {
        &self.base
    }

    fn label_type(&self) -> LabelType {
        LabelType::BasicQa
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Violations::new();
        v.check_base(&self.base, LabelType::BasicQa);

        v.required("answer", &self.answer);
        if self.context.is_unscoped() {
            v.inconsistent("context", "must name a pod, namespace, cluster or service");
        }
        self.context.check_pod_scope("context", &mut v);

        v.into_result(LabelType::BasicQa, self.base.id())
    }
}
