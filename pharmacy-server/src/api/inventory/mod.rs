//! Inventory API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::require_pharmacy_staff;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest(
        "/api/inventory",
        Router::new()
            .route("/", get(handler::list).post(handler::create))
            .route("/low-stock", get(handler::low_stock))
            .route("/{id}", put(handler::update).delete(handler::delete))
            .layer(middleware::from_fn(require_pharmacy_staff)),
    )
}
