use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("resource not found")]
    NotFound,
    #[error("unprocessable")]
    Unprocessable,
    #[error("bad request")]
    BadRequest,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("internal server error")]
    Internal(#[source] sqlx::Error),
}

pub type ApiResponse<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// For mutations, where any storage failure is reported as unprocessable.
    pub fn unprocessable(error: sqlx::Error) -> ApiError {
        tracing::warn!(error = %error, "Mutation failed");
        ApiError::Unprocessable
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Internal(error) = &self {
            tracing::error!(error = ?error, "Database error");
        }
        let body = Json(json!({
            "success": false,
            "error": status.as_u16(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> ApiError {
        match error {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            error => ApiError::Internal(error),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> ApiError {
        tracing::debug!(rejection = %rejection.body_text(), "Rejected JSON body");
        ApiError::Unprocessable
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> ApiError {
        tracing::debug!(rejection = %rejection.body_text(), "Rejected query string");
        ApiError::BadRequest
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> ApiError {
        tracing::debug!(rejection = %rejection.body_text(), "Rejected path parameters");
        ApiError::BadRequest
    }
}
