//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Read back written rows so callers always get the persisted shape.
//!
//! # Invariants
//! - Services never bypass repository validation.
//! - Services remain storage-agnostic (generic over repository traits).

use crate::model::validation::{FieldError, ValidationErrors};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod catalog_service;
pub mod member_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for catalog and member use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Caller input failed field-level validation.
    Validation(ValidationErrors),
    /// Target entity does not exist.
    NotFound { entity: &'static str, id: Uuid },
    /// Password hashing backend failure.
    PasswordHash(String),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::PasswordHash(message) => write!(f, "password hashing failed: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(errors) => Self::Validation(errors),
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<FieldError> for ServiceError {
    fn from(value: FieldError) -> Self {
        Self::Validation(value.into())
    }
}
