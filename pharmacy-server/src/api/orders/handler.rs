//! Order Handlers
//!
//! 下单属于顾客；状态推进、指派属于药房工作人员。
//! 所有响应都经过 `sanitized()`，配送 OTP 只存在于服务端。

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderAssign, OrderCreate, OrderStatus, OrderStatusUpdate};
use crate::db::repository::{OrderRepository, UserRepository};
use crate::services::dispatch_status_update;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::Role;

/// Statuses staff may set directly; assignment and fulfillment have their own
/// endpoints.
const STAFF_TARGETS: [OrderStatus; 3] = [
    OrderStatus::Verified,
    OrderStatus::Processing,
    OrderStatus::Rejected,
];

/// Look up the customer's phone and fire the status SMS after commit
async fn notify_customer(state: &ServerState, order: &Order) {
    let repo = UserRepository::new(state.get_db());
    let phone = match repo.find_by_id(&order.user_id.to_string()).await {
        Ok(user) => user.and_then(|u| u.phone),
        Err(e) => {
            tracing::warn!(order_id = %order.order_id, error = %e, "Failed to load customer for SMS");
            return;
        }
    };
    dispatch_status_update(
        state.get_notifier(),
        phone,
        order.order_id.clone(),
        order.status,
    );
}

/// POST /api/orders - 下单
pub async fn place(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(data): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<Order>)> {
    validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)?;
    if let Some(address) = &data.delivery_address {
        validate_optional_text(&address.street, "street", MAX_ADDRESS_LEN)?;
        validate_optional_text(&address.city, "city", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&address.state, "state", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&address.zip_code, "zip_code", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&address.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    }

    let repo = OrderRepository::new(state.db.clone());
    let order = repo.place_order(&user.id, data).await?;

    tracing::info!(
        order_id = %order.order_id,
        user_id = %user.id,
        total = %order.total_amount,
        "Order placed"
    );

    Ok((StatusCode::CREATED, Json(order.sanitized())))
}

/// GET /api/orders/my-orders - 本人订单，最新在前
pub async fn my_orders(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    let repo = OrderRepository::new(state.db.clone());
    let orders = repo.find_by_user(&user.id).await?;
    Ok(Json(orders.into_iter().map(Order::sanitized).collect()))
}

/// Staff list filter
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

/// GET /api/orders - 全部订单 (药房工作人员)，可按状态过滤
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let repo = OrderRepository::new(state.db.clone());
    let orders = repo.find_all(query.status).await?;
    Ok(Json(orders.into_iter().map(Order::sanitized).collect()))
}

/// GET /api/orders/:id - 订单详情 (本人或药房工作人员)
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let repo = OrderRepository::new(state.db.clone());
    let order = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    let is_owner = user.owns(&order.user_id.to_string());
    if !is_owner && !user.is_pharmacy_staff() {
        return Err(AppError::new(ErrorCode::NotResourceOwner));
    }

    Ok(Json(order.sanitized()))
}

/// PUT /api/orders/:id/status - 推进订单状态 (药房工作人员)
///
/// 只接受 verified / processing / rejected；指派与配送有专门接口。
/// 成功后异步发送顾客短信，短信失败不影响状态变更。
pub async fn set_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(update): Json<OrderStatusUpdate>,
) -> AppResult<Json<Order>> {
    if !STAFF_TARGETS.contains(&update.status) {
        return Err(AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            "status must be one of 'verified', 'processing', 'rejected'",
        ));
    }
    validate_optional_text(&update.notes, "notes", MAX_NOTE_LEN)?;

    let repo = OrderRepository::new(state.db.clone());
    let order = repo.set_status(&id, update.status, update.notes).await?;

    tracing::info!(order_id = %order.order_id, status = %order.status, "Order status updated");
    notify_customer(&state, &order).await;

    Ok(Json(order.sanitized()))
}

/// PUT /api/orders/:id/assign - 指派配送员并生成配送 OTP (药房工作人员)
pub async fn assign(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(req): Json<OrderAssign>,
) -> AppResult<Json<Order>> {
    // The assignee must be an active delivery agent
    let users = UserRepository::new(state.get_db());
    let agent = users
        .find_by_id(&req.agent_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::DeliveryAgentNotFound))?;
    if agent.role != Role::DeliveryAgent || !agent.is_active {
        return Err(AppError::new(ErrorCode::DeliveryAgentNotFound));
    }

    let otp = crate::utils::random::delivery_otp()
        .map_err(|_| AppError::internal("Failed to generate delivery OTP"))?;

    let repo = OrderRepository::new(state.db.clone());
    let order = repo.assign(&id, &req.agent_id, otp).await?;

    tracing::info!(
        order_id = %order.order_id,
        agent_id = %req.agent_id,
        "Order assigned to delivery agent"
    );
    notify_customer(&state, &order).await;

    Ok(Json(order.sanitized()))
}
