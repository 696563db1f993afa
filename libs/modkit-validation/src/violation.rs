//! Violation records handed over by the validation engine.

use std::fmt;
use std::sync::Arc;

use crate::metadata::TypeName;
use crate::path::PropertyPath;

/// Identity of the rule (constraint tag) that produced a violation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleTag(Arc<str>);

impl RuleTag {
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(Arc::from(tag.as_ref()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata about the failed rule.
///
/// Cross-field rules validate relationships across several fields or
/// parameters; they attach to the owning bean or method instead of one value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstraintDescriptor {
    rule: RuleTag,
    cross_field: bool,
}

impl ConstraintDescriptor {
    /// Descriptor of a rule validating a single value.
    pub fn new(rule: impl AsRef<str>) -> Self {
        Self {
            rule: RuleTag::new(rule),
            cross_field: false,
        }
    }

    /// Descriptor of a rule validating a whole bean or method.
    pub fn cross_field(rule: impl AsRef<str>) -> Self {
        Self {
            rule: RuleTag::new(rule),
            cross_field: true,
        }
    }

    #[must_use]
    pub fn rule(&self) -> &RuleTag {
        &self.rule
    }

    #[must_use]
    pub fn is_cross_field_rule(&self) -> bool {
        self.cross_field
    }
}

/// One failed constraint.
#[derive(Debug, Clone)]
pub struct Violation {
    pub path: PropertyPath,
    pub descriptor: ConstraintDescriptor,
    /// Default (already interpolated) message from the validation engine.
    pub message: String,
    /// Type of the object on which the failure was found.
    pub leaf_bean_type: TypeName,
}

impl Violation {
    pub fn new(
        path: PropertyPath,
        descriptor: ConstraintDescriptor,
        message: impl Into<String>,
        leaf_bean_type: impl Into<TypeName>,
    ) -> Self {
        Self {
            path,
            descriptor,
            message: message.into(),
            leaf_bean_type: leaf_bean_type.into(),
        }
    }
}

/// A failed validation as signaled to the response layer.
///
/// `violations` may be empty when the engine failed without structured
/// details; `message` then carries whatever text it produced.
#[derive(Debug, Clone, Default)]
pub struct ViolationReport {
    pub violations: Vec<Violation>,
    pub message: Option<String>,
}

impl ViolationReport {
    #[must_use]
    pub fn new(violations: Vec<Violation>) -> Self {
        Self {
            violations,
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
