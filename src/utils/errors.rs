//! Sistema de manejo de errores
//!
//! Este módulo define los errores clasificados del núcleo de consistencia
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::order::OrderStatus;
use crate::repositories::{constraints, StoreError};

/// Clasificación de errores visible para el llamador
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    Internal,
}

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Conflict(_) | AppError::InvalidStatusTransition { .. } => ErrorKind::Conflict,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(constraint) => {
                AppError::Conflict(constraints::describe(&constraint).to_string())
            }
            StoreError::NoRowsAffected(table) => {
                tracing::error!("Escritura transaccional sin filas afectadas en {}", table);
                AppError::Internal(format!("write to {} affected no rows", table))
            }
            StoreError::MissingReference(table) => {
                AppError::NotFound(format!("referenced row in {} is missing or deleted", table))
            }
            StoreError::Backend(detail) => {
                tracing::error!("Error del almacén: {}", detail);
                AppError::Internal("storage failure".to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
        fields.sort_unstable();
        AppError::Validation(format!("invalid fields: {}", fields.join(", ")))
    }
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, title) = match self.kind() {
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "Not Found"),
            ErrorKind::Conflict => (StatusCode::CONFLICT, "Conflict"),
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, "Validation Error"),
            ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        };

        // Los errores internos nunca exponen el detalle del almacén
        let message = match &self {
            AppError::Internal(_) => "An unexpected error occurred".to_string(),
            AppError::NotFound(msg) | AppError::Conflict(msg) | AppError::Validation(msg) => msg.clone(),
            AppError::InvalidStatusTransition { .. } => self.to_string(),
        };

        let body = ErrorResponse {
            error: title.to_string(),
            message,
            code: self.code().to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de conflicto por clave natural
pub fn conflict_error(resource: &str, field: &str, value: &str) -> AppError {
    AppError::Conflict(format!("{} with {} '{}' already exists", resource, field, value))
}

/// Función helper para crear errores de validación
pub fn validation_error(message: &str) -> AppError {
    AppError::Validation(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_is_conflict_class() {
        let err = AppError::InvalidStatusTransition {
            from: OrderStatus::Completed,
            to: OrderStatus::Draft,
        };
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.code(), "INVALID_STATUS_TRANSITION");
        assert_eq!(err.to_string(), "invalid status transition from COMPLETED to DRAFT");
    }

    #[test]
    fn test_store_errors_do_not_leak_backend_text() {
        let err: AppError = StoreError::Backend("connection refused on 10.0.0.3".into()).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(!err.to_string().contains("10.0.0.3"));

        let err: AppError = StoreError::UniqueViolation(constraints::TRANSPORT_CURRENT_DRIVER.into()).into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.to_string().contains("driver already assigned"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(not_found_error("Driver", "x").into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(validation_error("bad").into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Internal("boom".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
