use axum::http::StatusCode;

use crate::api::rest::problem::{Problem, ProblemResponse, Violation};
use crate::domain::error::DomainError;

/// Map a domain error into an RFC 9457 problem for `instance`.
/// Database details, constraint text included, stay in the logs.
pub fn domain_error_to_problem(
    e: &DomainError,
    instance: &str,
    request_id: Option<String>,
) -> ProblemResponse {
    let problem = match e {
        DomainError::NotFound { .. } => {
            Problem::new(StatusCode::NOT_FOUND, "Not Found", e.to_string()).with_code("NOT_FOUND")
        }
        DomainError::UnknownEntity { .. } => {
            Problem::new(StatusCode::NOT_FOUND, "Not Found", e.to_string())
                .with_code("UNKNOWN_ENTITY")
        }
        DomainError::Validation { field, reason } => Problem::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Validation Failed",
            format!("{field}: {reason}"),
        )
        .with_code("VALIDATION_ERROR")
        .with_errors(vec![Violation {
            detail: reason.clone(),
            pointer: format!("/{field}"),
        }]),
        DomainError::Constraint { .. } => Problem::new(
            StatusCode::CONFLICT,
            "Conflict",
            "The record conflicts with existing data",
        )
        .with_code("CONFLICT"),
        DomainError::Database { .. } => Problem::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "An internal database error occurred",
        )
        .with_code("INTERNAL_ERROR"),
    };

    problem
        .with_instance(instance)
        .with_request_id(request_id)
        .into()
}
