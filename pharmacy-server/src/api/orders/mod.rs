//! Order API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_pharmacy_staff;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let customer = Router::new()
        .route("/", post(handler::place))
        .route("/my-orders", get(handler::my_orders));

    // Shared read: owner or staff, checked in the handler
    let shared = Router::new().route("/{id}", get(handler::get_by_id));

    let staff = Router::new()
        .route("/", get(handler::list))
        .route("/{id}/status", put(handler::set_status))
        .route("/{id}/assign", put(handler::assign))
        .layer(middleware::from_fn(require_pharmacy_staff));

    Router::new().nest("/api/orders", customer.merge(shared).merge(staff))
}
