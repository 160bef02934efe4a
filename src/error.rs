use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    /// A precondition on the request failed before anything was written.
    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized {0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("{0}")]
    MethodNotAllowed(String),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        let err = AppError::Validation("There is no cart with this cart id".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "There is no cart with this cart id");
    }

    #[test]
    fn referenced_rows_map_to_method_not_allowed() {
        let err = AppError::MethodNotAllowed("in use".into());
        assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn storage_failures_hide_details() {
        let err = AppError::OrmError(sea_orm::DbErr::Custom("boom".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "ORM error");
    }
}
