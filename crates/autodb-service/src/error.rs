use autodb_store::StoreError;
use autodb_types::{CarId, Principal};
use thiserror::Error;

/// Failure of a single service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing, empty, or malformed input.
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// The referenced id, name, or price has no live record.
    #[error("{0} not found")]
    NotFound(String),

    /// The caller does not own the record.
    #[error("{caller} is not the owner of car {id}")]
    Unauthorized { id: CarId, caller: Principal },

    /// A freshly generated id is already taken.
    #[error("car id collision: {0} already exists")]
    Conflict(CarId),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Flat classification of [`ServiceError`] for hosts that map errors onto
/// their own status conventions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unauthorized,
    Conflict,
    Storage,
}

impl ServiceError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Store(_) => ErrorKind::Storage,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
