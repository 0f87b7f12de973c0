//! Inventory Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::{Inventory, InventoryCreate, InventoryUpdate, InventoryWithMedicine};
use crate::db::repository::InventoryRepository;
use crate::utils::AppResult;
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_optional_text};

/// GET /api/inventory - 全部台账，带药品信息
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<InventoryWithMedicine>>> {
    let repo = InventoryRepository::new(state.db.clone());
    let records = repo.find_all().await?;
    Ok(Json(records))
}

/// Low-stock query
#[derive(Debug, Deserialize)]
pub struct LowStockQuery {
    #[serde(default)]
    pub threshold: Option<i64>,
}

/// GET /api/inventory/low-stock - 低于补货阈值的台账
pub async fn low_stock(
    State(state): State<ServerState>,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<Vec<InventoryWithMedicine>>> {
    let repo = InventoryRepository::new(state.db.clone());
    // 未显式给出阈值时用配置的告警阈值
    let threshold = query.threshold.unwrap_or(state.config.low_stock_threshold);
    let records = repo.find_low_stock(Some(threshold)).await?;
    Ok(Json(records))
}

/// POST /api/inventory - 新建台账记录 (数量同步加到药品库存)
pub async fn create(
    State(state): State<ServerState>,
    Json(data): Json<InventoryCreate>,
) -> AppResult<(StatusCode, Json<Inventory>)> {
    validate_optional_text(&data.supplier, "supplier", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.batch_number, "batch_number", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.location, "location", MAX_SHORT_TEXT_LEN)?;

    let repo = InventoryRepository::new(state.db.clone());
    let record = repo.create(data).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/inventory/:id - 更新台账 (数量增量同步到药品库存)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(data): Json<InventoryUpdate>,
) -> AppResult<Json<Inventory>> {
    validate_optional_text(&data.supplier, "supplier", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.batch_number, "batch_number", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.location, "location", MAX_SHORT_TEXT_LEN)?;

    let repo = InventoryRepository::new(state.db.clone());
    let record = repo.update(&id, data).await?;
    Ok(Json(record))
}

/// DELETE /api/inventory/:id - 删除台账 (剩余数量从药品库存扣除)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = InventoryRepository::new(state.db.clone());
    repo.delete(&id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
