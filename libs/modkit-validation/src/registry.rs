//! Registry of handler methods reachable from the outside.
//!
//! The routing layer announces each handler as its route is bound; the
//! resolver only asks membership questions. Registration may still be going
//! on while requests are served: a handler that is not registered yet simply
//! gets a less specific label.

use dashmap::DashSet;
use std::sync::Arc;

use crate::metadata::{BindingTable, HandlerMethodId, HandlerSignature};

/// Membership set of request handlers.
pub trait HandlerRegistry: Send + Sync {
    /// Record `id` as a reachable handler. Idempotent.
    fn register(&self, id: HandlerMethodId);

    /// Whether `id` has been registered.
    fn contains(&self, id: &HandlerMethodId) -> bool;
}

/// Thread-safe, insert-only [`HandlerRegistry`] backed by `DashSet`.
#[derive(Debug, Default)]
pub struct InMemoryHandlerRegistry {
    handlers: DashSet<HandlerMethodId>,
}

impl InMemoryHandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl HandlerRegistry for InMemoryHandlerRegistry {
    fn register(&self, id: HandlerMethodId) {
        if self.handlers.insert(id.clone()) {
            tracing::debug!(handler = %id, "Registered request handler");
        }
    }

    fn contains(&self, id: &HandlerMethodId) -> bool {
        self.handlers.contains(id)
    }
}

/// Hook for the routing layer: records a handler as its route is bound.
#[derive(Clone)]
pub struct RouteBinder {
    registry: Arc<dyn HandlerRegistry>,
    bindings: Arc<BindingTable>,
}

impl RouteBinder {
    #[must_use]
    pub fn new(registry: Arc<dyn HandlerRegistry>, bindings: Arc<BindingTable>) -> Self {
        Self { registry, bindings }
    }

    /// Declare the parameter markers of `signature`, then register its id.
    ///
    /// Markers go in first so that any reader seeing the handler as
    /// registered also finds its parameter metadata.
    pub fn bind(&self, signature: &HandlerSignature) {
        if signature.params.len() != signature.id.param_types.len() {
            tracing::warn!(
                handler = %signature.id,
                declared = signature.params.len(),
                expected = signature.id.param_types.len(),
                "Handler binding markers do not match its parameter count"
            );
        }
        self.bindings.declare_handler(signature);
        self.registry.register(signature.id.clone());
    }
}
