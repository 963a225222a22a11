use axum::http::StatusCode;
use axum::response::IntoResponse;
use thiserror::Error;

/// Errors that cross the HTTP boundary. Component-local errors (parse,
/// extraction, evaluation) convert into one of these at the route layer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Db(sqlx::Error),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("upload too large")]
    UploadTooLarge,
    #[error("upload empty")]
    UploadEmpty,
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::UploadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "upload too large").into_response(),
            AppError::UploadEmpty => (StatusCode::BAD_REQUEST, "upload empty").into_response(),
            AppError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response(),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(value: sqlx::Error) -> Self {
        AppError::Db(value)
    }
}

impl From<String> for AppError {
    fn from(value: String) -> Self {
        AppError::Validation(value)
    }
}

impl From<crate::pipeline::orchestrator::PipelineError> for AppError {
    fn from(value: crate::pipeline::orchestrator::PipelineError) -> Self {
        AppError::Internal(value.to_string())
    }
}

/// Errors from the PDF extraction boundary: row reconstruction, bank
/// detection, and per-bank column mapping.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported bank")]
    UnsupportedBank,
    #[error("no transaction tables found")]
    NoTables,
    #[error("pdf access error: {0}")]
    Access(String),
    #[error("invalid date: {0}")]
    InvalidDate(String),
}

/// Errors from the rule DSL tokenizer/parser.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DslError {
    #[error("unexpected character {found:?} at position {position}")]
    UnexpectedChar { position: usize, found: char },
    #[error("parse error at position {position}: expected {expected}, got {got}")]
    ParseError {
        position: usize,
        expected: String,
        got: String,
    },
    #[error("unexpected end of input")]
    UnexpectedEof,
}
