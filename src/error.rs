use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tokio_postgres::error::SqlState;

use crate::templates::{ErrorTemplate, Nav, NotFoundTemplate};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Template(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

// Error pages are rendered without the request, so the header always shows
// the anonymous navigation even for logged-in visitors.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            AppError::Database(ref err) => {
                if err.contains("connection") {
                    tracing::error!("PostgreSQL connection issue: {}", err);
                } else if err.contains("timeout") {
                    tracing::warn!("PostgreSQL operation timeout: {}", err);
                } else {
                    tracing::error!("PostgreSQL database error: {}", err);
                }

                if err.contains("timeout") {
                    "Сервер базы данных не ответил вовремя, попробуйте ещё раз"
                } else {
                    "Ошибка базы данных"
                }
                .to_string()
            }
            AppError::Validation(ref message) => {
                tracing::debug!("Validation error: {}", message);
                message.clone()
            }
            AppError::NotFound(ref resource) => {
                tracing::debug!("Resource not found: {}", resource);
                let page = NotFoundTemplate {
                    nav: Nav::anonymous(),
                    resource: resource.clone(),
                };
                return match page.render() {
                    Ok(html) => (status, Html(html)).into_response(),
                    Err(err) => {
                        tracing::error!("Failed to render not found page: {}", err);
                        (status, "Not Found").into_response()
                    }
                };
            }
            AppError::Conflict(ref message) => {
                tracing::debug!("Constraint conflict: {}", message);
                message.clone()
            }
            AppError::Template(ref err) => {
                tracing::error!("Template rendering failed: {}", err);
                "Внутренняя ошибка сервера".to_string()
            }
            AppError::Internal(ref err) => {
                tracing::error!("Internal server error: {:#}", err);
                "Внутренняя ошибка сервера".to_string()
            }
        };

        let page = ErrorTemplate {
            nav: Nav::anonymous(),
            status: status.as_u16(),
            message,
        };

        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => {
                tracing::error!("Failed to render error page: {}", err);
                status.into_response()
            }
        }
    }
}

// PostgreSQL error mapping
impl From<tokio_postgres::Error> for AppError {
    fn from(err: tokio_postgres::Error) -> Self {
        match err.code() {
            Some(&SqlState::UNIQUE_VIOLATION) => {
                let message = if err.to_string().contains("username") {
                    "Username already exists".to_string()
                } else if err.to_string().contains("slug") {
                    "Group slug already exists".to_string()
                } else {
                    "Resource already exists".to_string()
                };
                AppError::Conflict(message)
            }
            Some(&SqlState::FOREIGN_KEY_VIOLATION) => {
                AppError::Validation("Referenced resource does not exist".to_string())
            }
            Some(&SqlState::NOT_NULL_VIOLATION) => {
                AppError::Validation("Required field is missing".to_string())
            }
            Some(&SqlState::CHECK_VIOLATION) => {
                AppError::Validation("Data validation constraint violated".to_string())
            }
            Some(&SqlState::INVALID_TEXT_REPRESENTATION) => {
                AppError::Validation("Invalid data format provided".to_string())
            }
            Some(&SqlState::STRING_DATA_RIGHT_TRUNCATION) => {
                AppError::Validation("Text data exceeds maximum length".to_string())
            }
            Some(&SqlState::CONNECTION_EXCEPTION)
            | Some(&SqlState::CONNECTION_DOES_NOT_EXIST)
            | Some(&SqlState::CONNECTION_FAILURE) => {
                tracing::error!("PostgreSQL connection error: {}", err);
                AppError::Database("Database connection unavailable".to_string())
            }
            _ => {
                tracing::error!("Unhandled PostgreSQL error: {} (code: {:?})", err, err.code());
                AppError::Database("Database operation failed".to_string())
            }
        }
    }
}

// Connection pool error mapping
impl From<deadpool_postgres::PoolError> for AppError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        match err {
            deadpool_postgres::PoolError::Timeout(_) => {
                tracing::warn!("Database connection pool timeout: {}", err);
                AppError::Database("Database connection timeout".to_string())
            }
            deadpool_postgres::PoolError::Closed => {
                tracing::error!("Database connection pool is closed: {}", err);
                AppError::Database("Database service unavailable".to_string())
            }
            deadpool_postgres::PoolError::NoRuntimeSpecified => {
                tracing::error!("Database pool runtime error: {}", err);
                AppError::Internal(anyhow::anyhow!("Database configuration error"))
            }
            _ => {
                tracing::error!("Database connection pool error: {}", err);
                AppError::Database("Database connection unavailable".to_string())
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
