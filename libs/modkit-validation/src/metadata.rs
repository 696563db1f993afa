//! Binding metadata for validated beans and handler signatures.
//!
//! The validation engine reports *where* a violation happened but not how the
//! offending value was bound from the request. This module holds that
//! knowledge as explicit lookup tables:
//!
//! - **Beans**: parameter-backed beans (aggregated query/header params and the
//!   like) declare their fields and the binding markers on each field. A bean
//!   may extend a supertype whose fields are visible through it.
//! - **Handlers**: every bound handler signature declares the markers on each
//!   of its parameters, in signature order.
//!
//! Tables are filled while routes are bound and read concurrently while
//! requests are served.

use dashmap::DashMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::binding::BindingMarker;

/// Identity of a Rust/API type as seen by the validation engine.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(Arc<str>);

impl TypeName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

/// Identity of a request handler: declaring type, name and parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerMethodId {
    pub declaring_type: TypeName,
    pub name: String,
    pub param_types: Vec<TypeName>,
}

impl HandlerMethodId {
    pub fn new<T: Into<TypeName>>(
        declaring_type: impl Into<TypeName>,
        name: impl Into<String>,
        param_types: impl IntoIterator<Item = T>,
    ) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            param_types: param_types.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for HandlerMethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}(", self.declaring_type, self.name)?;
        for (i, ty) in self.param_types.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ty}")?;
        }
        f.write_str(")")
    }
}

/// A handler signature together with the binding markers on each parameter.
#[derive(Debug, Clone)]
pub struct HandlerSignature {
    pub id: HandlerMethodId,
    pub params: Vec<Vec<BindingMarker>>,
}

impl HandlerSignature {
    #[must_use]
    pub fn new(id: HandlerMethodId) -> Self {
        Self {
            id,
            params: Vec::new(),
        }
    }

    /// Append the markers of the next parameter in signature order.
    #[must_use]
    pub fn param(mut self, markers: impl IntoIterator<Item = BindingMarker>) -> Self {
        self.params.push(markers.into_iter().collect());
        self
    }
}

/// Declared fields of one parameter-backed bean.
#[derive(Debug, Clone)]
pub struct BeanBindings {
    pub type_name: TypeName,
    pub supertype: Option<TypeName>,
    fields: HashMap<String, Arc<[BindingMarker]>>,
}

impl BeanBindings {
    pub fn new(type_name: impl Into<TypeName>) -> Self {
        Self {
            type_name: type_name.into(),
            supertype: None,
            fields: HashMap::new(),
        }
    }

    #[must_use]
    pub fn extends(mut self, supertype: impl Into<TypeName>) -> Self {
        self.supertype = Some(supertype.into());
        self
    }

    /// Declare a field. Fields without binding markers are still declared:
    /// they exist, they just cannot be labeled.
    #[must_use]
    pub fn field(
        mut self,
        name: impl Into<String>,
        markers: impl IntoIterator<Item = BindingMarker>,
    ) -> Self {
        self.fields
            .insert(name.into(), markers.into_iter().collect::<Vec<_>>().into());
        self
    }
}

/// Concurrent lookup tables for bean fields and handler parameters.
#[derive(Default)]
pub struct BindingTable {
    beans: DashMap<TypeName, BeanBindings>,
    handlers: DashMap<HandlerMethodId, Vec<Arc<[BindingMarker]>>>,
}

impl BindingTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or redeclare) a bean shape.
    pub fn declare_bean(&self, bean: BeanBindings) {
        tracing::trace!(bean = %bean.type_name, fields = bean.fields.len(), "Declaring bean bindings");
        self.beans.insert(bean.type_name.clone(), bean);
    }

    /// Declare the parameter markers of a handler signature.
    pub fn declare_handler(&self, signature: &HandlerSignature) {
        let params = signature
            .params
            .iter()
            .map(|markers| Arc::from(markers.as_slice()))
            .collect();
        self.handlers.insert(signature.id.clone(), params);
    }

    /// Markers on `field` of `bean`, searching declared supertypes.
    ///
    /// Returns `None` when no bean in the hierarchy declares the field.
    #[must_use]
    pub fn field_markers(&self, bean: &TypeName, field: &str) -> Option<Arc<[BindingMarker]>> {
        // A hierarchy can't be deeper than the number of declared beans;
        // anything longer is a supertype cycle.
        let max_hops = self.beans.len();
        let mut current = Some(bean.clone());
        let mut hops = 0;

        while let Some(ty) = current {
            if hops > max_hops {
                tracing::warn!(bean = %bean, "Supertype cycle in bean bindings");
                return None;
            }
            let entry = self.beans.get(&ty)?;
            if let Some(markers) = entry.fields.get(field) {
                return Some(Arc::clone(markers));
            }
            current = entry.supertype.clone();
            hops += 1;
        }
        None
    }

    /// Markers on the parameter at `index` of `method`.
    #[must_use]
    pub fn parameter_markers(
        &self,
        method: &HandlerMethodId,
        index: usize,
    ) -> Option<Arc<[BindingMarker]>> {
        self.handlers
            .get(method)
            .and_then(|params| params.get(index).map(Arc::clone))
    }

    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}
