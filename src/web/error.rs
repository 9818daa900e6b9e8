use crate::analysis::AnalysisError;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;

/// 接口层错误，统一转成 `{"error": "..."}`
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("No file uploaded")]
    NoFile,
    #[error("No file selected")]
    NoFileSelected,
    #[error("Invalid file type. Allowed: PNG, JPG, JPEG, GIF, WEBP")]
    InvalidFileType,
    #[error("Invalid filename")]
    InvalidFilename,
    #[error("Invalid multipart request: {0}")]
    Multipart(#[from] MultipartError),
    #[error("Failed to store upload: {0}")]
    Storage(#[source] std::io::Error),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoFile
            | ApiError::NoFileSelected
            | ApiError::InvalidFileType
            | ApiError::InvalidFilename => StatusCode::BAD_REQUEST,
            ApiError::Multipart(e) => e.status(),
            ApiError::Storage(_) | ApiError::Analysis(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
