//! Label catalog configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::factory::{IdStrategy, DEFAULT_COMPONENT};

/// Environment variable prefix, e.g. `LABELS_ID_STRATEGY=sequenced`
pub const ENV_PREFIX: &str = "LABELS";

/// Factory configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabelConfig {
    /// Identifier scheme for new labels
    #[serde(default)]
    pub id_strategy: IdStrategy,

    /// Record Prometheus counters for creation and validation
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,

    /// Component name attached to log events
    #[serde(default = "default_component")]
    pub component: String,
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_component() -> String {
    DEFAULT_COMPONENT.to_string()
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            id_strategy: IdStrategy::default(),
            metrics_enabled: default_metrics_enabled(),
            component: default_component(),
        }
    }
}

impl LabelConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        Self::build(None)
    }

    /// Load configuration from a file, with environment overrides on top
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::build(Some(path.as_ref()))
    }

    fn build(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let config = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to read label configuration")?;

        config
            .try_deserialize()
            .context("Failed to parse label configuration")
    }
}
