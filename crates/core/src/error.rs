//! Engine error taxonomy.
//!
//! Every public engine operation returns either its payload or one of these
//! variants. Each variant maps to a stable machine code and an HTTP status so
//! the API layer can render `{ "error": message, "code": CODE }` bodies.

use thiserror::Error;

use crate::store::StoreError;

/// Result alias used throughout the engine.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors returned by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    // ===== Access Errors =====
    /// No actor context was supplied.
    #[error("authentication required")]
    Unauthorized,

    /// The actor's role does not permit the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    // ===== Input Errors =====
    /// The first violated input constraint.
    #[error("{0}")]
    InvalidInput(String),

    /// The referenced record does not exist in the actor's dorm.
    #[error("{0} not found")]
    NotFound(String),

    /// No term is active and auto-creation is disabled.
    #[error("no active term for this dorm")]
    NoActiveTerm,

    /// An override supplied no field that differs from the stored row.
    #[error("no changes provided")]
    NoChangesProvided,

    // ===== Store Errors =====
    /// The backing store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Shorthand for [`EngineError::InvalidInput`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Shorthand for [`EngineError::NotFound`].
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Returns the machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::NoActiveTerm => "NO_ACTIVE_TERM",
            Self::NoChangesProvided => "NO_CHANGES_PROVIDED",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::Forbidden(_) => 403,
            Self::InvalidInput(_) => 400,
            Self::NotFound(_) => 404,
            Self::NoActiveTerm => 409,
            Self::NoChangesProvided => 422,
            Self::Store(_) => 500,
        }
    }

    /// Returns true for failures caused by the backing store rather than the caller.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}
