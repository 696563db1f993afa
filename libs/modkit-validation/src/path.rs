//! Property paths locating a violation inside a request or response object graph.

use std::fmt;
use std::sync::Arc;

use crate::error::ValidationMessageError;
use crate::metadata::TypeName;

/// Kind of element a path node refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Bean,
    Property,
    Method,
    Parameter,
    ReturnValue,
    CrossParameter,
    ContainerElement,
    Other,
}

/// Kind-specific data recorded on a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum NodeDetail {
    None,
    Method { param_types: Vec<TypeName> },
    Parameter { index: usize },
}

/// One named, kinded step of a [`PropertyPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    name: String,
    kind: ElementKind,
    detail: NodeDetail,
}

impl Node {
    const RETURN_VALUE_NAME: &'static str = "<return value>";
    const CROSS_PARAMETER_NAME: &'static str = "<cross-parameter>";

    fn simple(name: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            name: name.into(),
            kind,
            detail: NodeDetail::None,
        }
    }

    /// Root bean node; usually unnamed.
    pub fn bean(name: impl Into<String>) -> Self {
        Self::simple(name, ElementKind::Bean)
    }

    pub fn property(name: impl Into<String>) -> Self {
        Self::simple(name, ElementKind::Property)
    }

    pub fn container_element(name: impl Into<String>) -> Self {
        Self::simple(name, ElementKind::ContainerElement)
    }

    pub fn other(name: impl Into<String>) -> Self {
        Self::simple(name, ElementKind::Other)
    }

    #[must_use]
    pub fn return_value() -> Self {
        Self::simple(Self::RETURN_VALUE_NAME, ElementKind::ReturnValue)
    }

    #[must_use]
    pub fn cross_parameter() -> Self {
        Self::simple(Self::CROSS_PARAMETER_NAME, ElementKind::CrossParameter)
    }

    /// Method node carrying the parameter types of the validated signature.
    pub fn method<T: Into<TypeName>>(
        name: impl Into<String>,
        param_types: impl IntoIterator<Item = T>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: ElementKind::Method,
            detail: NodeDetail::Method {
                param_types: param_types.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Parameter node with its zero-based position in the signature.
    pub fn parameter(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            kind: ElementKind::Parameter,
            detail: NodeDetail::Parameter { index },
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Parameter types, for method nodes.
    #[must_use]
    pub fn param_types(&self) -> Option<&[TypeName]> {
        match &self.detail {
            NodeDetail::Method { param_types } => Some(param_types),
            _ => None,
        }
    }

    /// Position in the signature, for parameter nodes.
    #[must_use]
    pub fn parameter_index(&self) -> Option<usize> {
        match self.detail {
            NodeDetail::Parameter { index } => Some(index),
            _ => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Immutable, non-empty sequence of nodes.
///
/// Equality and hashing are structural, which makes paths usable as cache keys.
/// Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath(Arc<[Node]>);

impl PropertyPath {
    /// # Errors
    /// Returns [`ValidationMessageError::EmptyPath`] if `nodes` is empty.
    pub fn new(nodes: impl IntoIterator<Item = Node>) -> Result<Self, ValidationMessageError> {
        let nodes: Vec<Node> = nodes.into_iter().collect();
        if nodes.is_empty() {
            return Err(ValidationMessageError::EmptyPath);
        }
        Ok(Self(nodes.into()))
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.0.iter()
    }

    #[must_use]
    pub fn last(&self) -> &Node {
        // Non-empty by construction.
        &self.0[self.0.len() - 1]
    }
}

impl<'a> IntoIterator for &'a PropertyPath {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Dot-joined node names, e.g. `createUser.arg0`.
impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{node}")?;
        }
        Ok(())
    }
}
