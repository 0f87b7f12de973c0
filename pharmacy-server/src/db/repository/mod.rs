//! Repository Module
//!
//! Provides CRUD and domain operations for SurrealDB tables.

// Auth
pub mod user;

// Catalog
pub mod medicine;

// Prescriptions
pub mod prescription;

// Orders
pub mod billing;
pub mod order;

// Inventory
pub mod inventory;

// Re-exports
pub use billing::BillingRepository;
pub use inventory::InventoryRepository;
pub use medicine::MedicineRepository;
pub use order::OrderRepository;
pub use prescription::PrescriptionRepository;
pub use user::UserRepository;

use shared::{AppError, ErrorCode};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
///
/// Domain outcomes (race losers, illegal transitions) are explicit variants so
/// handlers can map them to stable error codes instead of parsing strings.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient stock for {0}")]
    InsufficientStock(String),

    #[error("Illegal status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Prescription has already been resolved")]
    PrescriptionNotPending,

    #[error("Prescription is not verified")]
    PrescriptionNotVerified,

    #[error("A verified prescription is required")]
    PrescriptionRequired,

    #[error("Prescription belongs to another customer")]
    PrescriptionOwnerMismatch,

    #[error("Order is not assigned to this agent")]
    NotAssignedAgent,

    #[error("Invalid OTP")]
    OtpInvalid,

    #[error("OTP has already been consumed")]
    OtpConsumed,
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(what) => AppError::not_found(what),
            RepoError::Duplicate(what) => {
                AppError::with_message(ErrorCode::AlreadyExists, format!("{what} already exists"))
            }
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::InsufficientStock(medicine) => AppError::insufficient_stock(&medicine),
            RepoError::InvalidTransition { from, to } => AppError::with_message(
                ErrorCode::InvalidStatusTransition,
                format!("Cannot move order from '{from}' to '{to}'"),
            ),
            RepoError::PrescriptionNotPending => AppError::new(ErrorCode::PrescriptionNotPending),
            RepoError::PrescriptionNotVerified => AppError::new(ErrorCode::PrescriptionNotVerified),
            RepoError::PrescriptionRequired => AppError::new(ErrorCode::PrescriptionRequired),
            RepoError::PrescriptionOwnerMismatch => {
                AppError::new(ErrorCode::PrescriptionOwnerMismatch)
            }
            RepoError::NotAssignedAgent => AppError::new(ErrorCode::OrderNotAssigned),
            RepoError::OtpInvalid => AppError::new(ErrorCode::OtpInvalid),
            RepoError::OtpConsumed => AppError::new(ErrorCode::OtpConsumed),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全栈统一使用 "table:id" 格式
// =============================================================================
//
// 使用 surrealdb::RecordId 处理所有 ID：
//   - 解析: let id: RecordId = "medicine:abc".parse()?;
//   - 创建: let id = RecordId::from_table_key("medicine", "abc");
//   - 获取表名: id.table()
//   - 获取纯ID: id.key().to_string()
//   - CRUD: db.select(id) / db.delete(id) 直接使用 RecordId

/// Parse a "table:id" or bare id into a RecordId for the given table
pub(crate) fn parse_record_id(table: &str, id: &str) -> RepoResult<surrealdb::RecordId> {
    if let Some(rest) = id.strip_prefix(&format!("{table}:")) {
        return Ok(surrealdb::RecordId::from_table_key(table, rest));
    }
    if id.contains(':') {
        return Err(RepoError::Validation(format!(
            "expected a {table} id, got '{id}'"
        )));
    }
    Ok(surrealdb::RecordId::from_table_key(table, id))
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
