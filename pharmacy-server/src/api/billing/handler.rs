//! Billing Handlers
//!
//! 只读：账单随下单事务产生，结算在范围之外。

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::Billing;
use crate::db::repository::BillingRepository;
use crate::utils::{AppError, AppResult, ErrorCode};

/// GET /api/billing/my-bills - 本人账单，最新在前
pub async fn my_bills(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Billing>>> {
    let repo = BillingRepository::new(state.db.clone());
    let billings = repo.find_by_user(&user.id).await?;
    Ok(Json(billings))
}

/// GET /api/billing/order/:order_id - 指定订单的账单 (本人或药房工作人员)
pub async fn by_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(order_id): Path<String>,
) -> AppResult<Json<Billing>> {
    let repo = BillingRepository::new(state.db.clone());
    let billing = repo
        .find_by_order_id(&order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BillingNotFound))?;

    if !user.owns(&billing.user_id.to_string()) && !user.is_pharmacy_staff() {
        return Err(AppError::new(ErrorCode::NotResourceOwner));
    }

    Ok(Json(billing))
}
