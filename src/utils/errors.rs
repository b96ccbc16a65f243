//! Sistema de manejo de errores
//!
//! Este módulo define los errores del sistema de estacionamiento
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] validator::ValidationErrors),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Capacity exceeded: {0}")]
    Capacity(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    code: String,
}

impl AppError {
    /// Código HTTP asociado a cada tipo de error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::InvalidPayload(_)
            | AppError::Conflict(_)
            | AppError::Capacity(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Código estable que el cliente puede usar para distinguir errores
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) | AppError::InvalidPayload(_) => "VALIDATION_ERROR",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Capacity(_) => "CAPACITY_FULL",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Database(_) => "DB_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code().to_string();

        let (error, message) = match self {
            AppError::Database(e) => {
                // El error original se registra, nunca se devuelve al cliente
                error!("❌ Database error: {:?}", e);
                (
                    "Internal Server Error".to_string(),
                    "An unexpected error occurred".to_string(),
                )
            }
            AppError::Internal(msg) => {
                error!("❌ Internal error: {}", msg);
                (
                    "Internal Server Error".to_string(),
                    "An unexpected error occurred".to_string(),
                )
            }
            AppError::InvalidPayload(e) => {
                warn!("⚠️ Invalid payload: {}", e);
                ("Validation Error".to_string(), e.to_string())
            }
            AppError::Validation(msg) => {
                warn!("⚠️ Validation error: {}", msg);
                ("Validation Error".to_string(), msg)
            }
            AppError::Conflict(msg) => {
                warn!("⚠️ Conflict: {}", msg);
                ("Conflict".to_string(), msg)
            }
            AppError::Capacity(msg) => {
                warn!("🚧 Capacity exceeded: {}", msg);
                ("Capacity Full".to_string(), msg)
            }
            AppError::NotFound(msg) => {
                warn!("🔍 Resource not found: {}", msg);
                ("Not Found".to_string(), msg)
            }
        };

        (status, Json(ErrorResponse { error, message, code })).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de conflicto
pub fn conflict_error(resource: &str, field: &str, value: &str) -> AppError {
    AppError::Conflict(format!("{} with {} '{}' already exists", resource, field, value))
}

/// Función helper para crear errores internos
pub fn internal_error(message: &str) -> AppError {
    AppError::Internal(message.to_string())
}
