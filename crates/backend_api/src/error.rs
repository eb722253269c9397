use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No data loaded. Upload a file first.")]
    NoDataLoaded,

    #[error("Invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },

    #[error("Only .xlsx files are supported, got: {0}")]
    UnsupportedFileType(String),

    #[error("Multipart upload is missing the 'file' field")]
    MissingFile,

    #[error("Failed to parse report: {0}")]
    Ingest(#[from] report_parser::ParseError),

    #[error("Invalid multipart request: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::NoDataLoaded => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::InvalidParameter { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::UnsupportedFileType(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::MissingFile => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Ingest(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            ApiError::Multipart(_) => (StatusCode::BAD_REQUEST, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
