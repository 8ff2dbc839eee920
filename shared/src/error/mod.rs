//! Unified error system shared by the fulfillment server and clients
//!
//! - [`ErrorCode`]: numeric error codes, stable across Rust and TypeScript
//! - [`ErrorCategory`]: classification of errors by domain
//! - [`AppError`]: rich error type with code, message and details
//! - [`ApiResponse`]: unified API response envelope
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::with_message(ErrorCode::InvalidItem, "menu item m-9 not available")
//!     .with_detail("menuItemId", "m-9");
//! assert_eq!(err.http_status().as_u16(), 400);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
