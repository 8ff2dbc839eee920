//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::OrderNotFound
            | Self::VendorNotFound
            | Self::RiderNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists | Self::Conflict | Self::NotCancellable => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            Self::PermissionDenied
            | Self::RoleRequired
            | Self::RiderMismatch
            | Self::VendorMismatch => StatusCode::FORBIDDEN,

            // 422 Unprocessable - valid request shape, rejected business rule
            Self::InvalidTransition => StatusCode::UNPROCESSABLE_ENTITY,

            // 400 Bad Request
            Self::Unknown
            | Self::ValidationFailed
            | Self::InvalidRequest
            | Self::InvalidItem
            | Self::InvalidAddOn
            | Self::MissingRequiredAddOn
            | Self::AddOnQuantityExceeded
            | Self::VendorInactive => StatusCode::BAD_REQUEST,

            // 500 Internal Server Error
            Self::InternalError | Self::StorageError | Self::SerializationError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
