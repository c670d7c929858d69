use thiserror::Error;

use crate::domain::category::CategoryId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("category `{0}` referenced by a recommendation rule is missing from the catalog")]
    CategoryNotFound(CategoryId),
    #[error("recommendation invariant broken: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    /// Catalog/rule mismatches are deployment problems, not user errors.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::CategoryNotFound(_))
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("invalid submission: {0}")]
    Validation(String),
    #[error("collaborator call failed: {0}")]
    Integration(String),
    #[error("deployment misconfigured: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Maps onto the error surface shown to HTTP clients, stamped with the
    /// request's correlation id.
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        match self {
            Self::Validation(message) => InterfaceError::BadRequest { message, correlation_id },
            Self::Integration(message) => {
                InterfaceError::ServiceUnavailable { message, correlation_id }
            }
            Self::Domain(DomainError::CategoryNotFound(id)) => InterfaceError::Internal {
                message: format!("catalog has no `{id}` category"),
                correlation_id,
            },
            Self::Domain(DomainError::InvariantViolation(message)) | Self::Configuration(message) => {
                InterfaceError::Internal { message, correlation_id }
            }
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("request rejected: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("upstream unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal failure: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    /// Client-facing text; never includes internal detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "Some answers are invalid. Review the highlighted fields.",
            Self::ServiceUnavailable { .. } => {
                "A partner service did not respond. Please try again in a moment."
            }
            Self::Internal { .. } => "We could not prepare your recommendation right now.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}
