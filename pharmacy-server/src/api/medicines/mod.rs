//! Medicine Catalog API 模块

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_pharmacy_staff;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    // Public catalog reads
    let public = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    // Catalog management - pharmacist/admin only
    let staff = Router::new()
        .route("/", axum::routing::post(handler::create))
        .route(
            "/{id}",
            axum::routing::put(handler::update).delete(handler::delete),
        )
        .layer(middleware::from_fn(require_pharmacy_staff));

    Router::new().nest("/api/medicines", public.merge(staff))
}
