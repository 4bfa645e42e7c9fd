//! Error handling for the MADUREX server
//!
//! Provides consistent error responses in English and Spanish

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use shared::validation::FieldError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Store errors
    #[error("Store read failed for {view}: {message}")]
    StoreRead { view: String, message: String },

    #[error("Store write failed: {0}")]
    StoreWrite(String),

    // External service errors
    #[error("QR generation failed: {0}")]
    QrGeneration(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_es: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {message}")]
    Conflict {
        resource: String,
        message: String,
        message_es: String,
    },

    #[error("Confirmation required to {0}")]
    ConfirmationRequired(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AppError {
    /// Read failure attributed to the view that issued it
    pub fn store_read(view: &str, message: impl Into<String>) -> Self {
        AppError::StoreRead {
            view: view.to_string(),
            message: message.into(),
        }
    }

    /// Bad query parameter
    pub fn invalid_param(field: &str, message: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
            message_es: format!("Valor no válido para {}", field),
        }
    }
}

impl From<FieldError> for AppError {
    fn from(err: FieldError) -> Self {
        AppError::Validation {
            message_es: format!("Valor no válido para {}", err.field),
            field: err.field,
            message: err.message,
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_es: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::StoreRead { view, .. } => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "STORE_READ_ERROR".to_string(),
                    message_en: format!("Could not load {} data", view),
                    message_es: "Error al cargar los datos".to_string(),
                    field: None,
                },
            ),
            AppError::StoreWrite(_) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "STORE_WRITE_ERROR".to_string(),
                    message_en: "Could not save the plant".to_string(),
                    message_es: "Error al guardar la planta".to_string(),
                    field: None,
                },
            ),
            AppError::QrGeneration(_) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "QR_GENERATION_ERROR".to_string(),
                    message_en: "Could not generate the QR image".to_string(),
                    message_es: "Error al generar el código QR".to_string(),
                    field: None,
                },
            ),
            AppError::Validation { field, message, message_es } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_es: message_es.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_es: format!("No se encontró {}", resource),
                    field: None,
                },
            ),
            AppError::Conflict { resource, message, message_es } => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "CONFLICT".to_string(),
                    message_en: message.clone(),
                    message_es: message_es.clone(),
                    field: Some(resource.clone()),
                },
            ),
            AppError::ConfirmationRequired(action) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "CONFIRMATION_REQUIRED".to_string(),
                    message_en: format!("Pass confirm=true to {}", action),
                    message_es: "Se requiere confirmación".to_string(),
                    field: Some("confirm".to_string()),
                },
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "CONFIGURATION_ERROR".to_string(),
                    message_en: format!("Configuration error: {}", msg),
                    message_es: "Error de configuración".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
