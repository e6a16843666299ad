use sea_orm::DbErr;
use thiserror::Error;

/// Failure taxonomy shared by every service. The HTTP layer maps each variant
/// to a status code and a stable machine-readable `code`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Your account has been deactivated")]
    AccountDeactivated,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidAssignee(String),

    #[error("{0}")]
    InvalidTransition(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Db(#[from] DbErr),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Unauthenticated => "UNAUTHENTICATED",
            ServiceError::InvalidCredentials => "INVALID_CREDENTIALS",
            ServiceError::AccountDeactivated => "ACCOUNT_DEACTIVATED",
            ServiceError::Forbidden(_) => "FORBIDDEN",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::Validation(_) => "VALIDATION_ERROR",
            ServiceError::InvalidAssignee(_) => "INVALID_ASSIGNEE",
            ServiceError::InvalidTransition(_) => "INVALID_TRANSITION",
            ServiceError::Conflict(_) => "CONFLICT",
            ServiceError::Internal(_) | ServiceError::Db(_) | ServiceError::Io(_) => {
                "INTERNAL_ERROR"
            }
        }
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        ServiceError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ServiceError::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// True when a database error is a unique-constraint violation.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(
        err.sql_err(),
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
    )
}
