//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 4xxx: Order errors
/// - 5xxx: Billing errors
/// - 6xxx: Catalog / stock errors
/// - 7xxx: Prescription errors
/// - 8xxx: Delivery errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Order errors (4xxx)
    Order,
    /// Billing errors (5xxx)
    Billing,
    /// Catalog / stock errors (6xxx)
    Catalog,
    /// Prescription errors (7xxx)
    Prescription,
    /// Delivery errors (8xxx)
    Delivery,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..4000 => Self::Permission,
            4000..5000 => Self::Order,
            5000..6000 => Self::Billing,
            6000..7000 => Self::Catalog,
            7000..8000 => Self::Prescription,
            8000..9000 => Self::Delivery,
            _ => Self::System,
        }
    }
}

impl From<ErrorCode> for ErrorCategory {
    fn from(code: ErrorCode) -> Self {
        Self::from_code(code.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_ranges() {
        assert_eq!(
            ErrorCategory::from(ErrorCode::InsufficientStock),
            ErrorCategory::Catalog
        );
        assert_eq!(
            ErrorCategory::from(ErrorCode::OtpInvalid),
            ErrorCategory::Delivery
        );
        assert_eq!(
            ErrorCategory::from(ErrorCode::PrescriptionNotPending),
            ErrorCategory::Prescription
        );
        assert_eq!(
            ErrorCategory::from(ErrorCode::DatabaseError),
            ErrorCategory::System
        );
    }
}
