//! Unified error codes for the pharmacy platform
//!
//! This module defines all error codes used across the server and its clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 5xxx: Billing errors
//! - 6xxx: Catalog / stock errors
//! - 7xxx: Prescription errors
//! - 8xxx: Delivery errors
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
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1005,
    /// Username already exists
    UsernameExists = 1006,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Administrator or pharmacist role required
    PharmacistRequired = 2003,
    /// Resource belongs to another user
    NotResourceOwner = 2004,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Status transition is not allowed
    InvalidStatusTransition = 4002,
    /// Order has already been delivered
    OrderAlreadyDelivered = 4003,
    /// Order is empty
    OrderEmpty = 4004,
    /// Order is not assigned to this agent
    OrderNotAssigned = 4005,

    // ==================== 5xxx: Billing ====================
    /// Billing record not found
    BillingNotFound = 5001,

    // ==================== 6xxx: Catalog / Stock ====================
    /// Medicine not found
    MedicineNotFound = 6001,
    /// Requested quantity exceeds available stock
    InsufficientStock = 6002,
    /// Medicine has invalid price
    MedicineInvalidPrice = 6003,
    /// Inventory record not found
    InventoryNotFound = 6101,

    // ==================== 65xx: File Upload ====================
    /// File too large
    FileTooLarge = 6501,
    /// Unsupported file format
    UnsupportedFileFormat = 6502,
    /// No file provided in request
    NoFileProvided = 6503,
    /// Empty file provided
    EmptyFile = 6504,
    /// File storage failed
    FileStorageFailed = 6505,

    // ==================== 7xxx: Prescription ====================
    /// Prescription not found
    PrescriptionNotFound = 7001,
    /// Prescription has already been resolved
    PrescriptionNotPending = 7002,
    /// Prescription is not verified
    PrescriptionNotVerified = 7003,
    /// A verified prescription is required for this order
    PrescriptionRequired = 7004,
    /// Rejection reason is required when rejecting
    RejectionReasonRequired = 7005,
    /// Prescription image is required
    PrescriptionImageRequired = 7006,
    /// Prescription belongs to another customer
    PrescriptionOwnerMismatch = 7007,

    // ==================== 8xxx: Delivery ====================
    /// Supplied OTP does not match
    OtpInvalid = 8001,
    /// OTP has already been consumed
    OtpConsumed = 8002,
    /// Delivery agent not found
    DeliveryAgentNotFound = 8003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// Notification dispatch failed
    NotificationFailed = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::UsernameExists => "Username already exists",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::PharmacistRequired => "Pharmacist or administrator role is required",
            ErrorCode::NotResourceOwner => "Resource belongs to another user",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::InvalidStatusTransition => "Status transition is not allowed",
            ErrorCode::OrderAlreadyDelivered => "Order has already been delivered",
            ErrorCode::OrderEmpty => "Order must contain at least one item",
            ErrorCode::OrderNotAssigned => "Order is not assigned to this agent",

            // Billing
            ErrorCode::BillingNotFound => "Billing record not found",

            // Catalog / Stock
            ErrorCode::MedicineNotFound => "Medicine not found",
            ErrorCode::InsufficientStock => "Requested quantity exceeds available stock",
            ErrorCode::MedicineInvalidPrice => "Medicine has invalid price",
            ErrorCode::InventoryNotFound => "Inventory record not found",

            // File Upload
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::FileStorageFailed => "File storage failed",

            // Prescription
            ErrorCode::PrescriptionNotFound => "Prescription not found",
            ErrorCode::PrescriptionNotPending => "Prescription has already been resolved",
            ErrorCode::PrescriptionNotVerified => "Prescription is not verified",
            ErrorCode::PrescriptionRequired => {
                "A verified prescription is required for this order"
            }
            ErrorCode::RejectionReasonRequired => "Rejection reason is required when rejecting",
            ErrorCode::PrescriptionImageRequired => "Prescription image is required",
            ErrorCode::PrescriptionOwnerMismatch => "Prescription belongs to another customer",

            // Delivery
            ErrorCode::OtpInvalid => "Invalid OTP",
            ErrorCode::OtpConsumed => "OTP has already been consumed",
            ErrorCode::DeliveryAgentNotFound => "Delivery agent not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::NotificationFailed => "Notification dispatch failed",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
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
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::AccountDisabled),
            1006 => Ok(ErrorCode::UsernameExists),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::PharmacistRequired),
            2004 => Ok(ErrorCode::NotResourceOwner),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::InvalidStatusTransition),
            4003 => Ok(ErrorCode::OrderAlreadyDelivered),
            4004 => Ok(ErrorCode::OrderEmpty),
            4005 => Ok(ErrorCode::OrderNotAssigned),

            // Billing
            5001 => Ok(ErrorCode::BillingNotFound),

            // Catalog / Stock
            6001 => Ok(ErrorCode::MedicineNotFound),
            6002 => Ok(ErrorCode::InsufficientStock),
            6003 => Ok(ErrorCode::MedicineInvalidPrice),
            6101 => Ok(ErrorCode::InventoryNotFound),

            // File Upload
            6501 => Ok(ErrorCode::FileTooLarge),
            6502 => Ok(ErrorCode::UnsupportedFileFormat),
            6503 => Ok(ErrorCode::NoFileProvided),
            6504 => Ok(ErrorCode::EmptyFile),
            6505 => Ok(ErrorCode::FileStorageFailed),

            // Prescription
            7001 => Ok(ErrorCode::PrescriptionNotFound),
            7002 => Ok(ErrorCode::PrescriptionNotPending),
            7003 => Ok(ErrorCode::PrescriptionNotVerified),
            7004 => Ok(ErrorCode::PrescriptionRequired),
            7005 => Ok(ErrorCode::RejectionReasonRequired),
            7006 => Ok(ErrorCode::PrescriptionImageRequired),
            7007 => Ok(ErrorCode::PrescriptionOwnerMismatch),

            // Delivery
            8001 => Ok(ErrorCode::OtpInvalid),
            8002 => Ok(ErrorCode::OtpConsumed),
            8003 => Ok(ErrorCode::DeliveryAgentNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9004 => Ok(ErrorCode::NotificationFailed),

            other => Err(InvalidErrorCode(other)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_roundtrip() {
        for code in [
            ErrorCode::Success,
            ErrorCode::InsufficientStock,
            ErrorCode::PrescriptionNotPending,
            ErrorCode::OtpConsumed,
            ErrorCode::DatabaseError,
        ] {
            let raw: u16 = code.into();
            assert_eq!(ErrorCode::try_from(raw), Ok(code));
        }
    }

    #[test]
    fn invalid_code_is_rejected() {
        assert_eq!(ErrorCode::try_from(12345), Err(InvalidErrorCode(12345)));
    }

    #[test]
    fn display_format() {
        assert_eq!(ErrorCode::InsufficientStock.to_string(), "E6002");
        assert_eq!(ErrorCode::Success.to_string(), "E0000");
    }
}
