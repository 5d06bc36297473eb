use thiserror::Error;

use shopfloor_core::DomainError;

use crate::consumption::ConsumptionError;
use crate::store::StoreError;

/// Error returned by the application services.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The addressed record does not exist.
    #[error("{0} not found")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Stock consumption failed; the surrounding status change was not applied.
    #[error("stock consumption failed: {0}")]
    Consumption(#[from] ConsumptionError),

    #[error(transparent)]
    Store(StoreError),
}

impl ServiceError {
    pub fn not_found(what: impl core::fmt::Display) -> Self {
        Self::NotFound(what.to_string())
    }

    /// Stable machine-readable code.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Forbidden(_) => "forbidden",
            ServiceError::Domain(DomainError::Validation(_)) => "validation_error",
            ServiceError::Domain(DomainError::InvalidId(_)) => "invalid_id",
            ServiceError::Domain(DomainError::InvalidTransition { .. }) => "invalid_transition",
            ServiceError::Domain(DomainError::Conflict(_)) => "conflict",
            ServiceError::Consumption(e) => e.kind(),
            ServiceError::Store(StoreError::Duplicate(_)) => "conflict",
            ServiceError::Store(StoreError::Backend(_)) => "store_error",
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Duplicate(what) => ServiceError::Domain(DomainError::conflict(format!("{what} already exists"))),
            other => ServiceError::Store(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
