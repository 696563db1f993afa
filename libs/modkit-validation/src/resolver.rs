//! Turns one violation into a labeled, human-readable message.
//!
//! Resolution goes from most to least specific:
//! 1. violations inside a handler's return value are labeled `server response ...`;
//! 2. cross-field rules are formatted by a [`CrossFieldFormatter`];
//! 3. members of parameter-backed beans and handler parameters are labeled
//!    from their binding markers (`query param name`, `header X-Token`, ...);
//!    an un-annotated parameter of a registered handler is the request entity;
//! 4. anything else falls back to the raw property path.

use std::sync::Arc;

use crate::binding;
use crate::error::ValidationMessageError;
use crate::metadata::{BindingTable, HandlerMethodId};
use crate::navigator::{self, PathShape};
use crate::path::{ElementKind, Node};
use crate::registry::HandlerRegistry;
use crate::violation::Violation;

/// Label of an un-annotated parameter on a registered handler.
pub const REQUEST_ENTITY: &str = "The request entity";

/// Formats violations of cross-field rules that are not inside a return value.
pub trait CrossFieldFormatter: Send + Sync {
    fn format(&self, violation: &Violation) -> String;
}

/// Names every node but the last (the rule's own node), then the message.
///
/// A message starting with `.` is appended without a separating space so
/// that rules can extend the path themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCrossFieldFormatter;

impl CrossFieldFormatter for DefaultCrossFieldFormatter {
    fn format(&self, violation: &Violation) -> String {
        let nodes = violation.path.nodes();
        let owner = nodes[..nodes.len() - 1]
            .iter()
            .map(Node::name)
            .collect::<Vec<_>>()
            .join(".");

        let sep = if violation.message.starts_with('.') {
            ""
        } else {
            " "
        };
        format!("{owner}{sep}{}", violation.message)
            .trim()
            .to_owned()
    }
}

/// Resolves violation messages from path shape and binding metadata.
#[derive(Clone)]
pub struct MessageResolver {
    bindings: Arc<BindingTable>,
    cross_field: Arc<dyn CrossFieldFormatter>,
}

impl MessageResolver {
    #[must_use]
    pub fn new(bindings: Arc<BindingTable>) -> Self {
        Self::with_cross_field_formatter(bindings, Arc::new(DefaultCrossFieldFormatter))
    }

    #[must_use]
    pub fn with_cross_field_formatter(
        bindings: Arc<BindingTable>,
        cross_field: Arc<dyn CrossFieldFormatter>,
    ) -> Self {
        Self {
            bindings,
            cross_field,
        }
    }

    /// Resolve the caller-facing message of `violation`.
    ///
    /// # Errors
    /// Returns [`ValidationMessageError::MissingField`] or
    /// [`ValidationMessageError::MissingParameter`] when the binding metadata
    /// does not describe an element the validation engine reported on.
    pub fn resolve(
        &self,
        violation: &Violation,
        handlers: &dyn HandlerRegistry,
    ) -> Result<String, ValidationMessageError> {
        let cross_field = violation.descriptor.is_cross_field_rule();
        let shape = navigator::classify(&violation.path);

        if let PathShape::ReturnValue(label) = &shape {
            let label = if cross_field {
                strip_last_segment(label)
            } else {
                label.as_str()
            };
            return Ok(format!("{label} {}", violation.message));
        }

        if cross_field {
            return Ok(self.cross_field.format(violation));
        }

        let name = match shape {
            PathShape::Member { parent, member } => {
                self.member_name(violation, parent, member, handlers)?
            }
            _ => None,
        };

        let name = name.unwrap_or_else(|| violation.path.to_string());
        Ok(format!("{name} {}", violation.message))
    }

    fn member_name(
        &self,
        violation: &Violation,
        parent: &Node,
        member: &Node,
        handlers: &dyn HandlerRegistry,
    ) -> Result<Option<String>, ValidationMessageError> {
        match parent.kind() {
            ElementKind::Parameter => {
                let markers = self
                    .bindings
                    .field_markers(&violation.leaf_bean_type, member.name())
                    .ok_or_else(|| {
                        let err = ValidationMessageError::MissingField {
                            bean: violation.leaf_bean_type.clone(),
                            field: member.name().to_owned(),
                        };
                        tracing::error!(error = %err, path = %violation.path, "Inconsistent bean bindings");
                        err
                    })?;
                Ok(binding::describe(&markers))
            }
            ElementKind::Method => {
                let (Some(param_types), Some(index)) =
                    (parent.param_types(), member.parameter_index())
                else {
                    return Ok(None);
                };

                let id = HandlerMethodId::new(
                    violation.leaf_bean_type.clone(),
                    parent.name(),
                    param_types.iter().cloned(),
                );
                if !handlers.contains(&id) {
                    tracing::debug!(handler = %id, "Not a registered handler; using raw path");
                    return Ok(None);
                }

                let markers = self
                    .bindings
                    .parameter_markers(&id, index)
                    .ok_or_else(|| {
                        let err = ValidationMessageError::MissingParameter {
                            method: id.clone(),
                            index,
                        };
                        tracing::error!(error = %err, "Inconsistent handler bindings");
                        err
                    })?;
                Ok(Some(
                    binding::describe(&markers).unwrap_or_else(|| REQUEST_ENTITY.to_owned()),
                ))
            }
            _ => Ok(None),
        }
    }
}

/// Everything before the last `.`, or the whole label if it has none.
fn strip_last_segment(label: &str) -> &str {
    label.rsplit_once('.').map_or(label, |(head, _)| head)
}
