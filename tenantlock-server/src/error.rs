//! Mapping from domain errors to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use tenantlock_license::LicenseError;
use tenantlock_tenant::TenantError;
use thiserror::Error;
use tracing::error;

/// Any error a handler can return. Rendered as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    License(#[from] LicenseError),

    #[error(transparent)]
    Tenant(#[from] TenantError),

    #[error("missing or invalid admin token")]
    Unauthorized,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Maps the error to its HTTP status:
    /// - missing license, tenant, or config key: 404 Not Found
    /// - malformed key, id, range, or input: 400 Bad Request
    /// - license bound to another machine: 409 Conflict
    /// - license or tenant not usable right now: 403 Forbidden
    /// - key space exhausted: 503 Service Unavailable
    /// - storage and runtime failures: 500 Internal Server Error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::License(e) => match e {
                LicenseError::NotFound | LicenseError::TenantNotFound(_) => StatusCode::NOT_FOUND,
                LicenseError::InvalidRange(_)
                | LicenseError::InvalidInput(_)
                | LicenseError::InvalidKey(_) => StatusCode::BAD_REQUEST,
                LicenseError::AlreadyBound => StatusCode::CONFLICT,
                LicenseError::Revoked
                | LicenseError::Expired(_)
                | LicenseError::NotYetValid(_)
                | LicenseError::NotActivated
                | LicenseError::MachineMismatch => StatusCode::FORBIDDEN,
                LicenseError::KeyGenerationExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
                LicenseError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Tenant(e) => match e {
                TenantError::TenantNotFound(_) | TenantError::ConfigNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                TenantError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                TenantError::Blocked(_) => StatusCode::FORBIDDEN,
                TenantError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<tenantlock_storage::StorageError> for ApiError {
    fn from(err: tenantlock_storage::StorageError) -> Self {
        Self::Tenant(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Server-side failures are logged in full and answered generically.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self);
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tenantlock_storage::StorageError;

    #[test]
    fn error_status_codes() {
        assert_eq!(
            ApiError::from(LicenseError::NotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(LicenseError::InvalidKey("x".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(LicenseError::AlreadyBound).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(LicenseError::MachineMismatch).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(LicenseError::KeyGenerationExhausted(5)).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(TenantError::ConfigNotFound("k".into())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StorageError::Poisoned).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let response = ApiError::Internal("secret database path".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = ApiError::from(LicenseError::Revoked).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
