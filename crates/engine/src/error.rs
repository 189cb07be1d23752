//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`Query`] thrown when list options fail to build or validate.
//! - [`KeyNotFound`] thrown when an item is not found (or not owned by the
//!   caller).
//! - [`ExistingKey`] thrown when an item already exists.
//! - [`InvalidInput`] thrown when a create/update payload breaks a rule.
//! - [`Internal`] thrown when password hashing fails.
//!
//!  [`Query`]: EngineError::Query
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`Internal`]: EngineError::Internal
use sea_orm::DbErr;
use thiserror::Error;

use crate::query::QueryError;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Query(a), Self::Query(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::Internal(a), Self::Internal(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
