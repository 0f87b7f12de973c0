//! Delivery Fulfillment Handlers
//!
//! 配送员只能看到/操作指派给自己的订单；OTP 永不回传给配送端。

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderStatus};
use crate::db::repository::OrderRepository;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult, ErrorCode};

/// GET /api/delivery/my-deliveries - 自己名下 assigned / picked_up 的订单
pub async fn my_deliveries(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    let repo = OrderRepository::new(state.db.clone());
    let orders = repo.find_deliveries_for_agent(&user.id).await?;
    Ok(Json(orders.into_iter().map(Order::sanitized).collect()))
}

/// Agent status update payload
#[derive(Debug, Deserialize)]
pub struct DeliveryStatusUpdate {
    pub status: OrderStatus,
    #[serde(default)]
    pub signature: Option<String>,
}

/// PUT /api/delivery/:id/status - assigned → picked_up
///
/// 配送端唯一允许的直接状态变更；送达必须走 OTP 核销。
pub async fn set_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(update): Json<DeliveryStatusUpdate>,
) -> AppResult<Json<Order>> {
    if update.status != OrderStatus::PickedUp {
        return Err(AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            "delivery agents may only set status to 'picked_up'",
        ));
    }
    validate_optional_text(&update.signature, "signature", MAX_NOTE_LEN)?;

    let repo = OrderRepository::new(state.db.clone());
    let order = repo
        .mark_picked_up(&id, &user.id, update.signature)
        .await?;

    tracing::info!(order_id = %order.order_id, agent_id = %user.id, "Order picked up");

    Ok(Json(order.sanitized()))
}

/// OTP verification payload
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub otp: String,
}

/// POST /api/delivery/:id/verify-otp - 核销 OTP 完成配送
pub async fn verify_otp(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<VerifyOtpRequest>,
) -> AppResult<Json<Order>> {
    let repo = OrderRepository::new(state.db.clone());
    let order = repo.complete_with_otp(&id, &user.id, &req.otp).await?;

    tracing::info!(order_id = %order.order_id, agent_id = %user.id, "Order delivered");

    Ok(Json(order.sanitized()))
}
