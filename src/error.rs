use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;

pub type AppResult<T> = Result<T, AppError>;

/// Table check keeping an event's capacity at or above its registrations
const CAPACITY_CONSTRAINT: &str = "events_capacity_covers_participants";

/// Errors surfaced at the route boundary as `{error, error_code, message}`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// Wrap a failed request check as a 400
    pub fn invalid(err: anyhow::Error) -> Self {
        AppError::Validation(err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Auth(err) => err.status(),
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Auth(err) => err.error_code(),
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Map constraint violations coming out of Postgres to client errors.
    fn classify(self) -> Self {
        let db_error = match &self {
            AppError::Database(sqlx::Error::Database(db_error)) => Some(db_error.as_ref()),
            AppError::Internal(err) => match err.downcast_ref::<sqlx::Error>() {
                Some(sqlx::Error::Database(db_error)) => Some(db_error.as_ref()),
                _ => None,
            },
            _ => None,
        };

        let Some((code, constraint, message)) = db_error.map(|e| {
            (
                e.code().map(|code| code.into_owned()),
                e.constraint().map(str::to_string),
                e.message().to_string(),
            )
        }) else {
            return self;
        };

        match code.as_deref() {
            Some("23505") => AppError::Conflict(message),
            Some("23503") => {
                AppError::Validation(format!("referenced record does not exist ({message})"))
            }
            Some("23514") if constraint.as_deref() == Some(CAPACITY_CONSTRAINT) => {
                AppError::Conflict("Capacity cannot be lower than current participants".to_string())
            }
            Some("23514") => AppError::Validation(message),
            _ => self,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let this = self.classify();
        let status = this.status();

        let error_message = match &this {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Database error occurred".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                "Internal server error".to_string()
            }
            AppError::Validation(msg) | AppError::Conflict(msg) => msg.clone(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
            "error_code": this.error_code(),
            "message": this.to_string(),
        }));

        (status, body).into_response()
    }
}
