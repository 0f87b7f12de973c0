//! Delivery Fulfillment API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_delivery_agent;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest(
        "/api/delivery",
        Router::new()
            .route("/my-deliveries", get(handler::my_deliveries))
            .route("/{id}/status", put(handler::set_status))
            .route("/{id}/verify-otp", post(handler::verify_otp))
            .layer(middleware::from_fn(require_delivery_agent)),
    )
}
