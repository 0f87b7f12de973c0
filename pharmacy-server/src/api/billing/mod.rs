//! Billing API 模块

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest(
        "/api/billing",
        Router::new()
            .route("/my-bills", get(handler::my_bills))
            .route("/order/{order_id}", get(handler::by_order)),
    )
}
