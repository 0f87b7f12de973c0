//! Prescription Repository
//!
//! 处方验证是一次性的：条件更新只命中 status = 'pending' 的记录，
//! 并发的第二次验证拿不到行，映射为冲突错误。

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Prescription, PrescriptionStatus, PrescriptionVerify};
use chrono::{DateTime, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const PRESCRIPTION_TABLE: &str = "prescription";
const USER_TABLE: &str = "user";

/// Fields for a freshly uploaded prescription
#[derive(Debug, Clone)]
pub struct PrescriptionNew {
    pub user_id: String,
    pub doctor_name: Option<String>,
    pub doctor_license: Option<String>,
    pub prescription_date: Option<DateTime<Utc>>,
    pub image_url: String,
    pub extracted_text: Option<String>,
    pub medicines: Vec<String>,
}

#[derive(Clone)]
pub struct PrescriptionRepository {
    base: BaseRepository,
}

impl PrescriptionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a pending prescription from an upload
    pub async fn create(&self, data: PrescriptionNew) -> RepoResult<Prescription> {
        let user_thing = parse_record_id(USER_TABLE, &data.user_id)?;

        let prescription = Prescription {
            id: None,
            user_id: user_thing,
            doctor_name: data.doctor_name,
            doctor_license: data.doctor_license,
            prescription_date: data.prescription_date,
            image_url: data.image_url,
            extracted_text: data.extracted_text,
            medicines: data.medicines,
            status: PrescriptionStatus::Pending,
            verified_by: None,
            rejection_reason: None,
            notes: None,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        };

        let created: Option<Prescription> = self
            .base
            .db()
            .create(PRESCRIPTION_TABLE)
            .content(prescription)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create prescription".to_string()))
    }

    /// Find prescription by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Prescription>> {
        let thing = parse_record_id(PRESCRIPTION_TABLE, id)?;
        let prescription: Option<Prescription> = self.base.db().select(thing).await?;
        Ok(prescription)
    }

    /// A customer's own prescriptions, newest first
    pub async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<Prescription>> {
        let user_thing = parse_record_id(USER_TABLE, user_id)?;
        let prescriptions: Vec<Prescription> = self
            .base
            .db()
            .query("SELECT * FROM prescription WHERE user_id = $user ORDER BY created_at DESC")
            .bind(("user", user_thing.to_string()))
            .await?
            .take(0)?;
        Ok(prescriptions)
    }

    /// Pharmacist verification queue, oldest upload first
    pub async fn find_pending(&self) -> RepoResult<Vec<Prescription>> {
        let prescriptions: Vec<Prescription> = self
            .base
            .db()
            .query("SELECT * FROM prescription WHERE status = 'pending' ORDER BY created_at ASC")
            .await?
            .take(0)?;
        Ok(prescriptions)
    }

    /// Resolve a pending prescription to verified or rejected
    ///
    /// The update is conditional on `status = 'pending'`; when two pharmacists
    /// race, the loser gets [`RepoError::PrescriptionNotPending`].
    pub async fn verify(
        &self,
        id: &str,
        verifier_id: &str,
        decision: PrescriptionVerify,
    ) -> RepoResult<Prescription> {
        match decision.status {
            PrescriptionStatus::Verified | PrescriptionStatus::Rejected => {}
            _ => {
                return Err(RepoError::Validation(
                    "status must be 'verified' or 'rejected'".into(),
                ));
            }
        }
        if decision.status == PrescriptionStatus::Rejected
            && decision
                .rejection_reason
                .as_deref()
                .is_none_or(|r| r.trim().is_empty())
        {
            return Err(RepoError::Validation(
                "rejection_reason is required when rejecting".into(),
            ));
        }

        let thing = parse_record_id(PRESCRIPTION_TABLE, id)?;
        let verifier_thing = parse_record_id(USER_TABLE, verifier_id)?;

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    status = $status,
                    verified_by = $verifier,
                    rejection_reason = $reason,
                    notes = $notes,
                    updated_at = $now
                WHERE status = 'pending'
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("now", Utc::now()))
            .bind(("status", decision.status))
            .bind(("verifier", verifier_thing))
            .bind(("reason", decision.rejection_reason))
            .bind(("notes", decision.notes))
            .await?;

        if let Some(updated) = result.take::<Option<Prescription>>(0)? {
            return Ok(updated);
        }

        // No row updated: either the record is gone or it was already resolved
        match self.find_by_id(id).await? {
            Some(_) => Err(RepoError::PrescriptionNotPending),
            None => Err(RepoError::NotFound(format!("Prescription {} not found", id))),
        }
    }
}
