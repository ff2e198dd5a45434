use sqlx::error::ErrorKind;

/// Error taxonomy for all HMS core operations.
///
/// Each variant maps to one HTTP status class at the API boundary:
/// `Validation` to 422, `NotFound` to 404, `Conflict` to 409,
/// `Unauthorized` to 401/403, and `Database` to 500 (detail logged, never
/// returned to the client).
#[derive(Debug, thiserror::Error)]
pub enum HmsError {
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl HmsError {
    /// A validation failure for a named input field.
    pub fn validation(field: &'static str, message: impl ToString) -> Self {
        HmsError::Validation {
            field,
            message: message.to_string(),
        }
    }

    /// A not-found error with a standard `<Entity> not found.` message.
    pub fn not_found(entity: &str) -> Self {
        HmsError::NotFound(format!("{entity} not found."))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        HmsError::Conflict(message.into())
    }
}

pub type HmsResult<T> = std::result::Result<T, HmsError>;

/// Whether a database error is a unique-constraint violation.
///
/// The partial unique indexes are the authoritative guard for booking
/// conflicts; callers use this to translate a violation back into the
/// `Conflict` the pre-checks would have produced.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.kind() == ErrorKind::UniqueViolation)
}

/// The constraint or index named in a unique-violation message, if any.
pub fn violated_constraint(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) if db.kind() == ErrorKind::UniqueViolation => {
            Some(db.message().to_owned())
        }
        _ => None,
    }
}
