//! Human-readable messages for constraint violations
//!
//! This crate sits between a validation engine and the HTTP response layer.
//! It provides:
//! - property paths and violation records (`PropertyPath`, `Violation`)
//! - binding metadata for handler parameters and parameter-backed beans
//!   (`BindingTable`, `BindingMarker`)
//! - a registry of reachable request handlers (`HandlerRegistry`, `RouteBinder`)
//! - message resolution with an expiring cache (`MessageResolver`, `MessageCache`)
//! - packaging into an `{"errors": [...]}` payload (`ConstraintViolationMapper`)
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod binding;
pub mod cache;
pub mod config;
pub mod error;
pub mod formatter;
pub mod metadata;
pub mod navigator;
pub mod path;
pub mod registry;
pub mod resolver;
pub mod status;
pub mod violation;

// Re-export commonly used types
pub use binding::BindingMarker;
pub use cache::{CacheKey, Clock, MessageCache, SystemClock};
pub use config::{ConfigError, ConstraintMessageConfig};
pub use error::ValidationMessageError;
pub use formatter::{ConstraintViolationMapper, ValidationErrorMessage, ViolationResponse};
pub use metadata::{BeanBindings, BindingTable, HandlerMethodId, HandlerSignature, TypeName};
pub use path::{ElementKind, Node, PropertyPath};
pub use registry::{HandlerRegistry, InMemoryHandlerRegistry, RouteBinder};
pub use resolver::{CrossFieldFormatter, DefaultCrossFieldFormatter, MessageResolver};
pub use status::{DefaultStatusPolicy, StatusPolicy};
pub use violation::{ConstraintDescriptor, RuleTag, Violation, ViolationReport};
