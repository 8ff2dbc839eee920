//! Unified error codes for the Pelican platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Concurrent modification conflict
    Conflict = 6,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Status transition not allowed for this actor / current status
    InvalidTransition = 4002,
    /// Order is outside the cancellable status set
    NotCancellable = 4003,
    /// Acting rider is not the assigned rider
    RiderMismatch = 4004,
    /// Acting vendor does not own this order
    VendorMismatch = 4005,
    /// Menu item does not resolve to an available item of the vendor
    InvalidItem = 4101,
    /// Add-on does not belong to the menu item
    InvalidAddOn = 4102,
    /// Required add-on missing from the selection
    MissingRequiredAddOn = 4103,
    /// Selected add-on quantity exceeds its maximum
    AddOnQuantityExceeded = 4104,
    /// Vendor exists but is not active
    VendorInactive = 4105,
    /// Vendor not found
    VendorNotFound = 4106,
    /// Rider not found
    RiderNotFound = 4107,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Storage layer error
    StorageError = 9002,
    /// Serialization error
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get the numeric value of this error code
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default English message for this error code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "OK",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",
            Self::Conflict => "Concurrent modification conflict",
            Self::NotAuthenticated => "Authentication required",
            Self::TokenExpired => "Token expired",
            Self::TokenInvalid => "Invalid token",
            Self::PermissionDenied => "Permission denied",
            Self::RoleRequired => "Role required",
            Self::OrderNotFound => "Order not found",
            Self::InvalidTransition => "Status transition not allowed",
            Self::NotCancellable => "Order can no longer be cancelled",
            Self::RiderMismatch => "Not the assigned rider",
            Self::VendorMismatch => "Order belongs to another vendor",
            Self::InvalidItem => "Invalid menu item",
            Self::InvalidAddOn => "Invalid add-on",
            Self::MissingRequiredAddOn => "Required add-on missing",
            Self::AddOnQuantityExceeded => "Add-on quantity exceeds maximum",
            Self::VendorInactive => "Vendor is not active",
            Self::VendorNotFound => "Vendor not found",
            Self::RiderNotFound => "Rider not found",
            Self::InternalError => "Internal server error",
            Self::StorageError => "Storage error",
            Self::SerializationError => "Serialization error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 to [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,
            6 => Self::Conflict,
            1001 => Self::NotAuthenticated,
            1003 => Self::TokenExpired,
            1004 => Self::TokenInvalid,
            2001 => Self::PermissionDenied,
            2002 => Self::RoleRequired,
            4001 => Self::OrderNotFound,
            4002 => Self::InvalidTransition,
            4003 => Self::NotCancellable,
            4004 => Self::RiderMismatch,
            4005 => Self::VendorMismatch,
            4101 => Self::InvalidItem,
            4102 => Self::InvalidAddOn,
            4103 => Self::MissingRequiredAddOn,
            4104 => Self::AddOnQuantityExceeded,
            4105 => Self::VendorInactive,
            4106 => Self::VendorNotFound,
            4107 => Self::RiderNotFound,
            9001 => Self::InternalError,
            9002 => Self::StorageError,
            9003 => Self::SerializationError,
            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}
