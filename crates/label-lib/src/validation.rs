//! Field-level validation results shared by every label variant
//!
//! Each variant's `validate()` walks its own payload with a [`Violations`]
//! collector and reports every broken rule at once, keyed by the dotted
//! wire path of the offending field.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{BaseLabel, LabelType};

/// A rule that a field failed to satisfy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rule {
    /// Field is missing or blank
    Required,
    /// Collection needs at least one entry
    Empty,
    /// Value is outside the accepted enumeration
    NotAllowed { value: String, allowed: Vec<String> },
    /// Numeric value is outside its bounds
    OutOfRange { value: i64, min: i64, max: i64 },
    /// Value could not be parsed
    Malformed { value: String, reason: String },
    /// Value contradicts another field
    Inconsistent { reason: String },
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => write!(f, "is required"),
            Rule::Empty => write!(f, "must have at least one entry"),
            Rule::NotAllowed { value, allowed } => {
                write!(f, "'{}' is not one of [{}]", value, allowed.join(", "))
            }
            Rule::OutOfRange { value, min, max } => {
                write!(f, "{} is outside {}..={}", value, min, max)
            }
            Rule::Malformed { value, reason } => write!(f, "'{}' is malformed: {}", value, reason),
            Rule::Inconsistent { reason } => write!(f, "{}", reason),
        }
    }
}

/// A single broken rule on a named field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Dotted wire path, e.g. `analysis.status.unavailable_replicas`
    pub field: String,
    pub rule: Rule,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.rule)
    }
}

/// Returned by `validate()` when a label payload breaks one or more rules
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{label_type} label '{label_id}' failed validation: {}", join_violations(.violations))]
pub struct ValidationError {
    pub label_type: LabelType,
    pub label_id: String,
    pub violations: Vec<FieldViolation>,
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Returns the first violation reported for `field`
    pub fn violation(&self, field: &str) -> Option<&FieldViolation> {
        self.violations.iter().find(|v| v.field == field)
    }

    /// Returns true if `field` broke any rule
    pub fn has_violation(&self, field: &str) -> bool {
        self.violation(field).is_some()
    }

    /// Names of all offending fields, in report order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.violations.iter().map(|v| v.field.as_str())
    }
}

/// Collector used while walking a payload
#[derive(Debug, Default)]
pub(crate) struct Violations {
    items: Vec<FieldViolation>,
}

impl Violations {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, field: impl Into<String>, rule: Rule) {
        self.items.push(FieldViolation {
            field: field.into(),
            rule,
        });
    }

    /// Records `Required` for a blank value; returns whether the value was present
    pub(crate) fn required(&mut self, field: impl Into<String>, value: &str) -> bool {
        if value.trim().is_empty() {
            self.push(field, Rule::Required);
            false
        } else {
            true
        }
    }

    /// Records `Empty` for an empty collection; returns whether it had entries
    pub(crate) fn non_empty<T>(&mut self, field: impl Into<String>, items: &[T]) -> bool {
        if items.is_empty() {
            self.push(field, Rule::Empty);
            false
        } else {
            true
        }
    }

    /// Every entry of a string list must be non-blank
    pub(crate) fn non_blank_entries(&mut self, field: &str, items: &[String]) {
        if self.non_empty(field, items) {
            for (i, item) in items.iter().enumerate() {
                self.required(format!("{}[{}]", field, i), item);
            }
        }
    }

    /// Required value drawn from an exact-case enumeration
    pub(crate) fn one_of(&mut self, field: impl Into<String>, value: &str, allowed: &[&str]) {
        self.check_allowed(field.into(), value, allowed, |a, b| a == b);
    }

    /// Required value drawn from an enumeration, compared case-insensitively
    pub(crate) fn one_of_ignore_case(
        &mut self,
        field: impl Into<String>,
        value: &str,
        allowed: &[&str],
    ) {
        self.check_allowed(field.into(), value, allowed, |a, b| a.eq_ignore_ascii_case(b));
    }

    fn check_allowed(
        &mut self,
        field: String,
        value: &str,
        allowed: &[&str],
        eq: impl Fn(&str, &str) -> bool,
    ) {
        let value = value.trim();
        if value.is_empty() {
            self.push(field, Rule::Required);
        } else if !allowed.iter().any(|a| eq(a, value)) {
            self.push(
                field,
                Rule::NotAllowed {
                    value: value.to_string(),
                    allowed: allowed.iter().map(|a| a.to_string()).collect(),
                },
            );
        }
    }

    pub(crate) fn in_range(&mut self, field: impl Into<String>, value: i64, min: i64, max: i64) {
        if value < min || value > max {
            self.push(field, Rule::OutOfRange { value, min, max });
        }
    }

    pub(crate) fn malformed(
        &mut self,
        field: impl Into<String>,
        value: &str,
        reason: impl Into<String>,
    ) {
        self.push(
            field,
            Rule::Malformed {
                value: value.to_string(),
                reason: reason.into(),
            },
        );
    }

    pub(crate) fn inconsistent(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.push(
            field,
            Rule::Inconsistent {
                reason: reason.into(),
            },
        );
    }

    /// Rules shared by all variants: tagged identifier and a question
    pub(crate) fn check_base(&mut self, base: &BaseLabel, label_type: LabelType) {
        let prefix = format!("{}-", label_type);
        if self.required("id", base.id()) && !base.id().starts_with(&prefix) {
            self.malformed("id", base.id(), format!("must start with '{}'", prefix));
        }
        self.required("question", base.question());
    }

    pub(crate) fn into_result(
        self,
        label_type: LabelType,
        label_id: &str,
    ) -> Result<(), ValidationError> {
        if self.items.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                label_type,
                label_id: label_id.to_string(),
                violations: self.items,
            })
        }
    }
}
