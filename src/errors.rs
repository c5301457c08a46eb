use serde::Serialize;
use thiserror::Error;

/// Error type shared by every service in the crate.
///
/// Nothing in this core is fatal to the process: each variant degrades to a
/// user-visible message plus an unchanged or safely-merged local state.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Local validation failed before any network call was made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The permission guard (or the collaborator itself) rejected the
    /// operation for this actor.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A refetched sub-collection did not match the just-submitted one.
    /// Resolved by preferring the local value; recorded for diagnostics.
    #[error("Reconciliation discrepancy on shipment {shipment_id}: {detail}")]
    ReconciliationDiscrepancy { shipment_id: i64, detail: String },

    /// Network failure, timeout, or malformed transport-level response.
    /// Transient and retryable; local optimistic state is left untouched.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The collaborator reports the entity no longer exists.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Collaborator answered with a non-2xx status outside the mapped set.
    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// True when retrying the same user action may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::ExternalService(_))
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::ExternalService(format!("undecodable response: {err}"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// Wire-friendly rendering of an error for the embedding frontend.
#[derive(Debug, Serialize)]
pub struct ErrorMessage {
    pub kind: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl From<&ServiceError> for ErrorMessage {
    fn from(err: &ServiceError) -> Self {
        let kind = match err {
            ServiceError::Validation(_) => "validation",
            ServiceError::PermissionDenied(_) => "permission_denied",
            ServiceError::ReconciliationDiscrepancy { .. } => "reconciliation_discrepancy",
            ServiceError::Transport(_) => "transport",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::ExternalService(_) => "external_service",
            ServiceError::Internal(_) => "internal",
        };
        Self {
            kind,
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}
