//! Typed catalog of Kubernetes troubleshooting labels
//!
//! This crate provides:
//! - Seven label schemas (basic QA, troubleshooting, resource, deployment,
//!   network, service mesh, multi-cluster) sharing one base record
//! - A factory that builds empty labels by type tag
//! - Per-variant validation reporting every offending field
//! - Configuration, metrics and structured logging for the factory

pub mod config;
pub mod error;
pub mod factory;
pub mod observability;
pub mod quantity;
pub mod types;
pub mod validation;

pub use config::LabelConfig;
pub use error::LabelError;
pub use factory::{IdStrategy, LabelFactory};
pub use observability::{LabelMetrics, StructuredLogger};
pub use types::*;
pub use validation::{FieldViolation, Rule, ValidationError};
