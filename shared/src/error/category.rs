//! Error category classification

use super::codes::ErrorCode;

/// High-level error category, derived from the code range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// 0xxx - general validation / lookup errors
    General,
    /// 1xxx - authentication
    Auth,
    /// 2xxx - permission
    Permission,
    /// 4xxx - order domain
    Order,
    /// 9xxx - system / infrastructure
    System,
}

impl ErrorCode {
    /// Classify this code into its category range
    pub fn category(&self) -> ErrorCategory {
        match self.code() {
            0..=999 => ErrorCategory::General,
            1000..=1999 => ErrorCategory::Auth,
            2000..=2999 => ErrorCategory::Permission,
            4000..=4999 => ErrorCategory::Order,
            _ => ErrorCategory::System,
        }
    }

    /// Whether this error should be retried by the caller after a re-read
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCode::Conflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_ranges() {
        assert_eq!(ErrorCode::Conflict.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::TokenExpired.category(), ErrorCategory::Auth);
        assert_eq!(
            ErrorCode::PermissionDenied.category(),
            ErrorCategory::Permission
        );
        assert_eq!(ErrorCode::InvalidItem.category(), ErrorCategory::Order);
        assert_eq!(ErrorCode::StorageError.category(), ErrorCategory::System);
    }
}
