use thiserror::Error;

use crate::auth::password::PasswordError;
use crate::database::DatabaseError;

/// A note's folder or tag references failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("The `{0}` is not a valid id")]
    InvalidId(&'static str),

    #[error("The `tags` property must be an array")]
    NotAnArray,

    #[error("The `folderId` does not exist")]
    FolderNotFound,

    #[error("An id in `tags` does not exist")]
    TagNotFound,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    InvalidField { message: String, location: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    DuplicateName(String),

    #[error("The username already exists")]
    DuplicateUsername,

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn invalid_field(message: impl Into<String>, location: impl Into<String>) -> Self {
        ServiceError::InvalidField {
            message: message.into(),
            location: location.into(),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::PasswordHash(err.to_string())
    }
}
