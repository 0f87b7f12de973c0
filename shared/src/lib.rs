//! Shared types for the pharmacy platform
//!
//! Common types used by the server and its clients: error codes,
//! response envelopes, roles and authentication DTOs.

pub mod client;
pub mod error;
pub mod role;

// Re-exports
pub use axum::{Json, body};
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use http;
pub use role::Role;
pub use serde::{Deserialize, Serialize};
