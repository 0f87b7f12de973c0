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
            | Self::BillingNotFound
            | Self::MedicineNotFound
            | Self::InventoryNotFound
            | Self::PrescriptionNotFound
            | Self::DeliveryAgentNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::UsernameExists
            | Self::InvalidStatusTransition
            | Self::OrderAlreadyDelivered
            | Self::PrescriptionNotPending
            | Self::PrescriptionNotVerified
            | Self::PrescriptionOwnerMismatch
            | Self::OtpConsumed => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::RoleRequired
            | Self::PharmacistRequired
            | Self::NotResourceOwner
            | Self::OrderNotAssigned => StatusCode::FORBIDDEN,

            // 413 Payload Too Large
            Self::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::NotificationFailed
            | Self::FileStorageFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            // Includes InsufficientStock, OtpInvalid, PrescriptionRequired,
            // RejectionReasonRequired and the upload validation errors.
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_failures_are_4xx() {
        assert_eq!(
            ErrorCode::InsufficientStock.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorCode::OtpInvalid.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::PrescriptionNotPending.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::OrderNotAssigned.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCode::MedicineNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn system_failures_are_5xx() {
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
