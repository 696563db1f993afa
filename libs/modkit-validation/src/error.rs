//! Error types for violation message resolution

use crate::metadata::{HandlerMethodId, TypeName};

/// Errors raised while building paths or resolving violation messages.
///
/// Unresolvable names are not errors: the resolver degrades to a less
/// specific label instead. Only contract breaks between the validation
/// engine and the declared binding metadata surface here.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationMessageError {
    #[error("property path must contain at least one node")]
    EmptyPath,

    #[error("bean '{bean}' declares no field '{field}' backing a validated parameter")]
    MissingField { bean: TypeName, field: String },

    #[error("handler '{method}' has no binding metadata for parameter #{index}")]
    MissingParameter {
        method: HandlerMethodId,
        index: usize,
    },
}

impl ValidationMessageError {
    /// Whether the error signals inconsistent metadata rather than bad input.
    #[must_use]
    pub fn is_internal_inconsistency(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. } | Self::MissingParameter { .. }
        )
    }
}

/// Axum integration: an inconsistency is a server bug, so callers get a
/// generic 500 while the details go to the log.
#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ValidationMessageError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!(error = %self, "Failed to resolve constraint violation messages");

        let body = crate::formatter::ValidationErrorMessage {
            errors: vec!["An internal error occurred".to_owned()],
        };
        let mut resp = axum::Json(body).into_response();
        *resp.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
        resp
    }
}
