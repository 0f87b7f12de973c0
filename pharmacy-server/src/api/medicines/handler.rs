//! Medicine Catalog Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::core::ServerState;
use crate::db::models::{Medicine, MedicineCreate, MedicineQuery, MedicineUpdate};
use crate::db::repository::MedicineRepository;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// GET /api/medicines - 公开目录，支持 search/category/requires_prescription 过滤
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<MedicineQuery>,
) -> AppResult<Json<Vec<Medicine>>> {
    let repo = MedicineRepository::new(state.db.clone());
    let medicines = repo.find_all(&query).await?;
    Ok(Json(medicines))
}

/// GET /api/medicines/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Medicine>> {
    let repo = MedicineRepository::new(state.db.clone());
    let medicine = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Medicine"))?;
    Ok(Json(medicine))
}

/// POST /api/medicines - 新增药品 (药房工作人员)
pub async fn create(
    State(state): State<ServerState>,
    Json(data): Json<MedicineCreate>,
) -> AppResult<Json<Medicine>> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&data.image_url, "image_url", MAX_URL_LEN)?;
    if data.price.is_sign_negative() {
        return Err(AppError::validation("price cannot be negative"));
    }

    let repo = MedicineRepository::new(state.db.clone());
    let medicine = repo.create(data).await?;
    Ok(Json(medicine))
}

/// PUT /api/medicines/:id - 更新药品 (药房工作人员)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(data): Json<MedicineUpdate>,
) -> AppResult<Json<Medicine>> {
    if let Some(ref name) = data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
    if data.price.is_some_and(|p| p.is_sign_negative()) {
        return Err(AppError::validation("price cannot be negative"));
    }

    let repo = MedicineRepository::new(state.db.clone());
    let medicine = repo.update(&id, data).await?;
    Ok(Json(medicine))
}

/// DELETE /api/medicines/:id - 删除药品 (药房工作人员)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = MedicineRepository::new(state.db.clone());
    repo.delete(&id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
