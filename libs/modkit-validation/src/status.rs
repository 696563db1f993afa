//! HTTP status selection for a failed validation.

use http::StatusCode;

use crate::path::ElementKind;
use crate::violation::Violation;

/// Chooses the response status for a set of violations.
pub trait StatusPolicy: Send + Sync {
    fn status_for(&self, violations: &[Violation]) -> StatusCode;
}

/// Status from the first violation's path.
///
/// The first `RETURN_VALUE` or `PARAMETER` node on that path decides:
/// - return value → `500 Internal Server Error`
/// - parameter → `400 Bad Request`
/// - neither, or no violations → `422 Unprocessable Entity`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStatusPolicy;

impl StatusPolicy for DefaultStatusPolicy {
    fn status_for(&self, violations: &[Violation]) -> StatusCode {
        let Some(first) = violations.first() else {
            return StatusCode::UNPROCESSABLE_ENTITY;
        };

        for node in &first.path {
            match node.kind() {
                ElementKind::ReturnValue => return StatusCode::INTERNAL_SERVER_ERROR,
                ElementKind::Parameter => return StatusCode::BAD_REQUEST,
                _ => {}
            }
        }
        StatusCode::UNPROCESSABLE_ENTITY
    }
}
