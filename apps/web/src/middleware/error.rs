//! Error handling - failures rendered as HTML error pages.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use yatube_core::error::RepoError;

use crate::views::{self, ErrorTemplate};

/// Application-level error type rendered as an HTML page.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let page = match self {
            AppError::NotFound(detail) => {
                tracing::debug!(%detail, "Responding 404");
                ErrorTemplate::not_found()
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorTemplate::server_error()
            }
        };

        views::html_response(self.status_code(), page)
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("record".to_string()),
            other => {
                tracing::error!(error = %other, "Storage failure");
                AppError::Internal("storage failure".to_string())
            }
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
