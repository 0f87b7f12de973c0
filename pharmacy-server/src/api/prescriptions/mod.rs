//! Prescription API 模块

mod handler;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_pharmacy_staff;
use crate::core::ServerState;
use crate::services::MAX_UPLOAD_BYTES;

pub fn router() -> Router<ServerState> {
    let customer = Router::new()
        .route(
            "/upload",
            post(handler::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024)),
        )
        .route("/my-prescriptions", get(handler::my_prescriptions));

    let staff = Router::new()
        .route("/pending", get(handler::pending))
        .route("/{id}/verify", put(handler::verify))
        .layer(middleware::from_fn(require_pharmacy_staff));

    Router::new().nest("/api/prescriptions", customer.merge(staff))
}
