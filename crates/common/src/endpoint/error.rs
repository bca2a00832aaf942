use std::fmt::Display;

use crate::catalog::CatalogError;

/// Failures surfaced to callers of the bucket endpoint.
///
/// `Internal` deliberately carries no detail; the cause is logged where the
/// error is created.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("invalid credential: {0}")]
    InvalidCredential(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),
    #[error("failed precondition: {0}")]
    FailedPrecondition(String),
    #[error("internal error")]
    Internal,
}

impl EndpointError {
    /// Log an unexpected collaborator failure and collapse it to `Internal`.
    pub fn internal(context: &str, err: impl Display) -> Self {
        tracing::error!(error = %err, "internal: {}", context);
        EndpointError::Internal
    }

    /// Map catalog failures. NotFound and AlreadyExists pass through, anything
    /// else is internal.
    pub fn from_catalog<E: Display>(context: &str, err: CatalogError<E>) -> Self {
        match err {
            CatalogError::NotFound(name) => {
                EndpointError::NotFound(format!("bucket not found: {}", name))
            }
            CatalogError::AlreadyExists(name) => {
                EndpointError::AlreadyExists(format!("bucket already exists: {}", name))
            }
            CatalogError::Provider(e) => Self::internal(context, e),
        }
    }

    /// Stable machine-readable code for the wire.
    pub fn code(&self) -> &'static str {
        match self {
            EndpointError::InvalidCredential(_) => "invalid_credential",
            EndpointError::Forbidden(_) => "forbidden",
            EndpointError::InvalidArgument(_) => "invalid_argument",
            EndpointError::NotFound(_) => "not_found",
            EndpointError::AlreadyExists(_) => "already_exists",
            EndpointError::ResourceExhausted(_) => "resource_exhausted",
            EndpointError::FailedPrecondition(_) => "failed_precondition",
            EndpointError::Internal => "internal",
        }
    }
}
