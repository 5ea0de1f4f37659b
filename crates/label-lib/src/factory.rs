//! Label factory
//!
//! Maps a type tag to a new, empty label of the matching variant. The
//! factory keeps no state between calls and can be shared freely across
//! threads.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::LabelConfig;
use crate::error::LabelError;
use crate::observability::{LabelMetrics, StructuredLogger};
use crate::types::{AnyLabel, BaseLabel, Label, LabelType};
use crate::validation::ValidationError;

/// Default component name used in log events
pub const DEFAULT_COMPONENT: &str = "label-factory";

/// Process-wide sequence for [`IdStrategy::Sequenced`]
static ID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// How label identifiers are derived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// `"<tag>-<unix-seconds>"`; labels of one type created within the
    /// same second share an id
    #[default]
    UnixSeconds,
    /// `"<tag>-<unix-seconds>-<seq>"`, unique within the process
    Sequenced,
}

impl IdStrategy {
    pub fn generate_id(&self, label_type: LabelType, at: DateTime<Utc>) -> String {
        match self {
            IdStrategy::UnixSeconds => format!("{}-{}", label_type, at.timestamp()),
            IdStrategy::Sequenced => {
                let seq = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
                format!("{}-{}-{}", label_type, at.timestamp(), seq)
            }
        }
    }
}

/// Creates empty labels of any variant by type tag
#[derive(Debug, Clone)]
pub struct LabelFactory {
    id_strategy: IdStrategy,
    metrics: Option<LabelMetrics>,
    logger: StructuredLogger,
}

impl Default for LabelFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelFactory {
    pub fn new() -> Self {
        Self::with_strategy(IdStrategy::default())
    }

    pub fn with_strategy(id_strategy: IdStrategy) -> Self {
        Self {
            id_strategy,
            metrics: Some(LabelMetrics::new()),
            logger: StructuredLogger::new(DEFAULT_COMPONENT),
        }
    }

    pub fn from_config(config: &LabelConfig) -> Self {
        Self {
            id_strategy: config.id_strategy,
            metrics: config.metrics_enabled.then(LabelMetrics::new),
            logger: StructuredLogger::new(config.component.as_str()),
        }
    }

    pub fn id_strategy(&self) -> IdStrategy {
        self.id_strategy
    }

    /// Create an empty label of a known type
    pub fn create(&self, label_type: LabelType, question: impl Into<String>) -> AnyLabel {
        let base = BaseLabel::with_strategy(label_type, question, self.id_strategy);
        let label = AnyLabel::empty(label_type, base);

        self.logger.log_label_created(&label);
        if let Some(metrics) = &self.metrics {
            metrics.inc_created(label_type);
        }

        label
    }

    /// Create an empty label from its wire tag (e.g. `"service_mesh"`)
    ///
    /// The question is taken as-is; an empty question is accepted here and
    /// only rejected by validation.
    pub fn create_label(
        &self,
        tag: &str,
        question: impl Into<String>,
    ) -> Result<AnyLabel, LabelError> {
        let label_type = tag.parse::<LabelType>().map_err(|e| {
            self.logger.log_unknown_type(tag);
            if let Some(metrics) = &self.metrics {
                metrics.inc_unknown_types();
            }
            e
        })?;

        Ok(self.create(label_type, question))
    }

    /// Validate any label through its own rules
    pub fn validate_label(&self, label: &dyn Label) -> Result<(), ValidationError> {
        let label_type = label.label_type();
        if let Some(metrics) = &self.metrics {
            metrics.inc_validations(label_type);
        }

        match label.validate() {
            Ok(()) => {
                self.logger.log_validation_passed(label);
                Ok(())
            }
            Err(e) => {
                self.logger.log_validation_failed(&e);
                if let Some(metrics) = &self.metrics {
                    metrics.inc_validation_failures(label_type);
                }
                Err(e)
            }
        }
    }

    /// Validate a batch, returning the failures in input order
    pub fn validate_batch<'a, I>(&self, labels: I) -> Vec<ValidationError>
    where
        I: IntoIterator<Item = &'a AnyLabel>,
    {
        labels
            .into_iter()
            .filter_map(|label| self.validate_label(label).err())
            .collect()
    }
}
