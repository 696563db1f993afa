//! Packaging of resolved violation messages into an error payload.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

use crate::cache::{CacheKey, MessageCache};
use crate::config::ConstraintMessageConfig;
use crate::error::ValidationMessageError;
use crate::metadata::BindingTable;
use crate::registry::HandlerRegistry;
use crate::resolver::MessageResolver;
use crate::status::{DefaultStatusPolicy, StatusPolicy};
use crate::violation::{Violation, ViolationReport};

/// Error payload listing one message per violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[cfg_attr(feature = "utoipa", schema(title = "ValidationErrorMessage"))]
pub struct ValidationErrorMessage {
    /// Human-readable messages, in the order the violations were reported
    pub errors: Vec<String>,
}

/// Payload plus the status it should be sent with.
#[derive(Debug, Clone)]
pub struct ViolationResponse {
    pub status: StatusCode,
    pub body: ValidationErrorMessage,
}

/// Axum integration: make the response directly returnable from handlers
#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ViolationResponse {
    fn into_response(self) -> axum::response::Response {
        let mut resp = axum::Json(self.body).into_response();
        *resp.status_mut() = self.status;
        resp
    }
}

/// Maps failed validations to caller-facing error payloads.
pub struct ConstraintViolationMapper {
    resolver: MessageResolver,
    cache: MessageCache,
    handlers: Arc<dyn HandlerRegistry>,
    status: Arc<dyn StatusPolicy>,
}

impl ConstraintViolationMapper {
    /// Mapper with the default cache and status policy.
    #[must_use]
    pub fn new(resolver: MessageResolver, handlers: Arc<dyn HandlerRegistry>) -> Self {
        Self {
            resolver,
            cache: MessageCache::default(),
            handlers,
            status: Arc::new(DefaultStatusPolicy),
        }
    }

    /// Mapper whose cache follows `config`.
    #[must_use]
    pub fn from_config(
        config: &ConstraintMessageConfig,
        bindings: Arc<BindingTable>,
        handlers: Arc<dyn HandlerRegistry>,
    ) -> Self {
        Self::new(MessageResolver::new(bindings), handlers)
            .with_cache(MessageCache::new(config.cache_ttl, config.cache_max_entries))
    }

    #[must_use]
    pub fn with_cache(mut self, cache: MessageCache) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_status_policy(mut self, status: Arc<dyn StatusPolicy>) -> Self {
        self.status = status;
        self
    }

    /// Cached message for a single violation.
    ///
    /// # Errors
    /// Propagates resolver inconsistencies; see [`MessageResolver::resolve`].
    pub fn message(&self, violation: &Violation) -> Result<String, ValidationMessageError> {
        self.cache.get_or_compute(CacheKey::from(violation), || {
            self.resolver.resolve(violation, self.handlers.as_ref())
        })
    }

    /// Resolve every violation in order.
    ///
    /// Without any violation the payload carries `fallback_message` (or an
    /// empty string), so callers never get an empty error list.
    ///
    /// # Errors
    /// Propagates resolver inconsistencies; see [`MessageResolver::resolve`].
    pub fn format(
        &self,
        violations: &[Violation],
        fallback_message: Option<&str>,
    ) -> Result<ValidationErrorMessage, ValidationMessageError> {
        let mut errors = violations
            .iter()
            .map(|v| self.message(v))
            .collect::<Result<Vec<_>, _>>()?;

        if errors.is_empty() {
            errors.push(fallback_message.unwrap_or_default().to_owned());
        }
        Ok(ValidationErrorMessage { errors })
    }

    /// Format `report` and attach the status chosen by the status policy.
    ///
    /// # Errors
    /// Propagates resolver inconsistencies; see [`MessageResolver::resolve`].
    pub fn to_response(
        &self,
        report: &ViolationReport,
    ) -> Result<ViolationResponse, ValidationMessageError> {
        let body = self.format(&report.violations, report.message.as_deref())?;
        let status = self.status.status_for(&report.violations);
        tracing::debug!(%status, errors = body.errors.len(), "Mapped constraint violations");
        Ok(ViolationResponse { status, body })
    }
}
