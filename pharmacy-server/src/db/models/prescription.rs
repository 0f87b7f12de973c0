//! Prescription Model

use super::serde_helpers;
use super::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Prescription ID type
pub type PrescriptionId = RecordId;

/// Verification lifecycle of an uploaded prescription
///
/// `pending` prescriptions may be resolved exactly once to `verified` or
/// `rejected`; there is no reopen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PrescriptionStatus {
    Pending,
    Processing,
    Verified,
    Rejected,
}

impl PrescriptionStatus {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Verified | Self::Rejected)
    }
}

/// Prescription model matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<PrescriptionId>,
    #[serde(with = "serde_helpers::record_id")]
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescription_date: Option<DateTime<Utc>>,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    #[serde(default)]
    pub medicines: Vec<String>,
    pub status: PrescriptionStatus,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub verified_by: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Verification decision (`PUT /api/prescriptions/:id/verify`)
#[derive(Debug, Clone, Deserialize)]
pub struct PrescriptionVerify {
    pub status: PrescriptionStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_snake_case() {
        assert_eq!(
            serde_json::to_string(&PrescriptionStatus::Verified).expect("serialize"),
            r#""verified""#
        );
        assert!(PrescriptionStatus::Rejected.is_resolved());
        assert!(!PrescriptionStatus::Pending.is_resolved());
    }
}
