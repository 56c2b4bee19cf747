use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::{
    AuthError, CatalogError, InventoryError, OrgError, PeriodError, RequestError,
    StorefrontError, SystemError, UserError,
};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ValidationError(String),

    Conflict(String),

    InternalError(String),

    Unauthorized(String),

    Forbidden(String),

    PasswordChangeRequired,
}

const FORBIDDEN_MESSAGE: &str = "אין הרשאה לביצוע הפעולה";
const PASSWORD_CHANGE_MESSAGE: &str = "יש להחליף סיסמה לפני המשך השימוש במערכת";

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            Self::PasswordChangeRequired => write!(f, "Password change required"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "אירעה שגיאת מסד נתונים".to_string(),
                )
            }
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "אירעה שגיאה פנימית".to_string(),
                )
            }
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::PasswordChangeRequired => {
                (StatusCode::FORBIDDEN, PASSWORD_CHANGE_MESSAGE.to_string())
            }
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    #[must_use]
    pub fn forbidden() -> Self {
        Self::Forbidden(FORBIDDEN_MESSAGE.to_string())
    }

    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::Unauthorized("יש להתחבר למערכת".to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::AccountDisabled => {
                Self::Unauthorized(err.to_string())
            }
            AuthError::UserNotFound => Self::NotFound(err.to_string()),
            AuthError::Validation(msg) => Self::ValidationError(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Forbidden => Self::Forbidden(err.to_string()),
            UserError::NotFound => Self::NotFound(err.to_string()),
            UserError::PhoneTaken | UserError::BarcodeTaken => Self::Conflict(err.to_string()),
            UserError::CannotDeactivateSelf => Self::ValidationError(err.to_string()),
            UserError::Validation(msg) => Self::ValidationError(msg),
            UserError::Database(msg) => Self::DatabaseError(msg),
            UserError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<OrgError> for ApiError {
    fn from(err: OrgError) -> Self {
        match err {
            OrgError::Forbidden => Self::Forbidden(err.to_string()),
            OrgError::BaseNotFound | OrgError::DepartmentNotFound => {
                Self::NotFound(err.to_string())
            }
            OrgError::InvalidStorePeer(_) => Self::ValidationError(err.to_string()),
            OrgError::Validation(msg) => Self::ValidationError(msg),
            OrgError::Database(msg) => Self::DatabaseError(msg),
            OrgError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<PeriodError> for ApiError {
    fn from(err: PeriodError) -> Self {
        match err {
            PeriodError::Forbidden => Self::Forbidden(err.to_string()),
            PeriodError::EmptyName => Self::ValidationError(err.to_string()),
            PeriodError::ActivePeriodExists | PeriodError::AlreadyEnded => {
                Self::Conflict(err.to_string())
            }
            PeriodError::BaseNotFound | PeriodError::NotFound => Self::NotFound(err.to_string()),
            PeriodError::Database(msg) => Self::DatabaseError(msg),
            PeriodError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Forbidden => Self::Forbidden(err.to_string()),
            CatalogError::DepartmentNotFound
            | CatalogError::CategoryNotFound
            | CatalogError::ItemTypeNotFound
            | CatalogError::UnitNotFound => Self::NotFound(err.to_string()),
            CatalogError::CategoryExists
            | CatalogError::SerialExists
            | CatalogError::TotalBelowOnLoan { .. }
            | CatalogError::UnitOnLoan => Self::Conflict(err.to_string()),
            CatalogError::NotSerialTracked | CatalogError::InUseViaHandoverOnly => {
                Self::ValidationError(err.to_string())
            }
            CatalogError::Validation(msg) => Self::ValidationError(msg),
            CatalogError::Database(msg) => Self::DatabaseError(msg),
            CatalogError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Forbidden => Self::Forbidden(err.to_string()),
            RequestError::NotFound
            | RequestError::ItemTypeNotFound
            | RequestError::UnitNotFound => Self::NotFound(err.to_string()),
            RequestError::InvalidTransition { .. }
            | RequestError::UnitUnavailable
            | RequestError::InsufficientStock { .. }
            | RequestError::SecondApproverRequired => Self::Conflict(err.to_string()),
            RequestError::InvalidQuantity
            | RequestError::ImmediateNotAllowed
            | RequestError::ScheduledNotAllowed
            | RequestError::InvalidSchedule
            | RequestError::LoanTooLong(_) => Self::ValidationError(err.to_string()),
            RequestError::Validation(msg) => Self::ValidationError(msg),
            RequestError::Database(msg) => Self::DatabaseError(msg),
            RequestError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<InventoryError> for ApiError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::Forbidden => Self::Forbidden(err.to_string()),
            InventoryError::ItemTypeNotFound => Self::NotFound(err.to_string()),
            InventoryError::Database(msg) => Self::DatabaseError(msg),
            InventoryError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<StorefrontError> for ApiError {
    fn from(err: StorefrontError) -> Self {
        match err {
            StorefrontError::InvalidToken | StorefrontError::TokenExpired => {
                Self::Unauthorized(err.to_string())
            }
            StorefrontError::UserNotFound => Self::NotFound(err.to_string()),
            StorefrontError::Validation(msg) => Self::ValidationError(msg),
            StorefrontError::Request(inner) => inner.into(),
            StorefrontError::Database(msg) => Self::DatabaseError(msg),
            StorefrontError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<SystemError> for ApiError {
    fn from(err: SystemError) -> Self {
        match err {
            SystemError::Forbidden => Self::Forbidden(err.to_string()),
            SystemError::ConfirmationMismatch => Self::ValidationError(err.to_string()),
            SystemError::ResetFailed => Self::InternalError(err.to_string()),
            SystemError::Database(msg) => Self::DatabaseError(msg),
            SystemError::Internal(msg) => Self::InternalError(msg),
        }
    }
}
