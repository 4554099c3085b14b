use sqlx::error::ErrorKind;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    DatabaseError(String),
    NotFound(String),
    Conflict(String),
    Forbidden(String),
    ValidationFailed(String),
    StoreUnavailable(String),
    ConfigurationError(String),
    SerializationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::ValidationFailed(msg) => write!(f, "Validation error: {}", msg),
            AppError::StoreUnavailable(msg) => write!(f, "Store unavailable: {}", msg),
            AppError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Business-rule rejections leave the store untouched and are reported
    /// without failing the process.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AppError::Conflict(_) | AppError::Forbidden(_))
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_fatal() {
            1
        } else {
            0
        }
    }

    /// Wraps an engine error with the operation that produced it, keeping
    /// constraint violations distinguishable from other failures.
    pub fn from_sqlx(context: &str, err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => {
                    AppError::ValidationFailed(format!("{}: {}", context, db_err.message()))
                }
                _ => AppError::DatabaseError(format!("{}: {}", context, err)),
            },
            sqlx::Error::RowNotFound => AppError::NotFound(context.to_string()),
            _ => AppError::DatabaseError(format!("{}: {}", context, err)),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::from_sqlx("Query failed", err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_rule_rejections_are_not_fatal() {
        assert!(!AppError::Conflict("overlap".into()).is_fatal());
        assert!(!AppError::Forbidden("not yours".into()).is_fatal());
        assert_eq!(AppError::Conflict("overlap".into()).exit_code(), 0);
    }

    #[test]
    fn lookup_and_store_failures_abort() {
        assert_eq!(AppError::NotFound("alice".into()).exit_code(), 1);
        assert_eq!(AppError::StoreUnavailable("missing".into()).exit_code(), 1);
        assert_eq!(AppError::ValidationFailed("fk".into()).exit_code(), 1);
        assert_eq!(AppError::DatabaseError("boom".into()).exit_code(), 1);
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = AppError::from_sqlx("listing 7", sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::NotFound(ref m) if m == "listing 7"));
    }

    #[test]
    fn display_carries_category() {
        let err = AppError::NotFound("No user found with name: bob".into());
        assert_eq!(err.to_string(), "Not found: No user found with name: bob");
    }
}
