// src/errors.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("MongoDB error: {0}")]
    Storage(#[from] mongodb::error::Error),

    #[error("Multipart error: {0}")]
    Multipart(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Access denied")]
    Forbidden,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid or expired OTP")]
    InvalidOrExpiredOtp,

    #[error("No image file provided")]
    MissingInput,

    #[error("Extraction service error: {0}")]
    ExtractionService(String),

    #[error("Malformed extraction output: {0}")]
    MalformedExtraction(String),

    #[error("Marks data not found")]
    RecordNotFound,

    #[error("Failed to send OTP email: {0}")]
    NotificationFailed(String),

    #[error("Password hashing error")]
    PasswordHash,

    #[error("Token generation failed")]
    TokenGeneration,

    #[error("Validation error: {0}")]
    Validation(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Storage(e) => {
                tracing::error!("database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::Multipart(_) => (StatusCode::BAD_REQUEST, "Invalid multipart data".to_string()),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()),
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, "Authentication required".to_string()),
            AppError::InvalidToken => (StatusCode::FORBIDDEN, "Invalid token".to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Access denied. Teachers only.".to_string()),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
            AppError::InvalidOrExpiredOtp => (StatusCode::BAD_REQUEST, "Invalid or expired OTP.".to_string()),
            AppError::MissingInput => (StatusCode::BAD_REQUEST, "No image file provided".to_string()),
            AppError::ExtractionService(e) => {
                tracing::error!("extraction service error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to process image".to_string())
            }
            AppError::MalformedExtraction(e) => {
                tracing::error!("malformed extraction output: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to process image".to_string())
            }
            AppError::RecordNotFound => (StatusCode::NOT_FOUND, "Marks data not found".to_string()),
            AppError::NotificationFailed(e) => {
                tracing::error!("mail dispatch error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to send OTP.".to_string())
            }
            AppError::PasswordHash => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password".to_string()),
            AppError::TokenGeneration => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate token".to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = Json(json!({
            "error": error_message,
            "success": false,
        }));

        (status, body).into_response()
    }
}

impl From<axum_extra::extract::multipart::MultipartError> for AppError {
    fn from(err: axum_extra::extract::multipart::MultipartError) -> Self {
        AppError::Multipart(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ExtractionService(format!("HTTP request failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
