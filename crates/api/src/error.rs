use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use steward_core::error::CoreError;
use steward_integrations::{GeocodeError, SyncError};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `steward_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Internal(msg) => internal(msg),
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Integrations ---
            AppError::Geocode(err) => classify_geocode_error(err),
            AppError::Sync(err) => classify_sync_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => internal(msg),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal(detail: &str) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %detail, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                );
            }
            // Foreign key violation: 23503
            if db_err.code().as_deref() == Some("23503") {
                return (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    "Referenced record does not exist".to_string(),
                );
            }
            internal(&db_err.to_string())
        }
        other => internal(&other.to_string()),
    }
}

/// Permission problems are surfaced distinctly from a missing location so
/// the caller can tell a configuration issue from a bad address.
fn classify_geocode_error(err: &GeocodeError) -> (StatusCode, &'static str, String) {
    match err {
        GeocodeError::InvalidAddress => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
        }
        GeocodeError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        GeocodeError::PermissionDenied(detail) => {
            tracing::warn!(detail = %detail, "Geocoding permission denied");
            (
                StatusCode::FORBIDDEN,
                "GEOCODE_PERMISSION_DENIED",
                "Geocoding was denied; check the API key and its billing settings".to_string(),
            )
        }
        GeocodeError::Provider(_) | GeocodeError::Http(_) => {
            tracing::error!(error = %err, "Geocoding provider failed");
            (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", err.to_string())
        }
    }
}

fn classify_sync_error(err: &SyncError) -> (StatusCode, &'static str, String) {
    match err {
        SyncError::UnknownProvider(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        SyncError::NotConfigured(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "NOT_CONFIGURED",
            err.to_string(),
        ),
        SyncError::Disabled(_) => (StatusCode::CONFLICT, "CONFLICT", err.to_string()),
        SyncError::Client(_) | SyncError::Http(_) => {
            tracing::error!(error = %err, "Integration client failed");
            (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", err.to_string())
        }
        SyncError::Store(msg) => internal(msg),
        SyncError::Database(db) => classify_sqlx_error(db),
    }
}
