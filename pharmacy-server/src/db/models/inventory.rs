//! Inventory Model
//!
//! 库存台账与 `medicine.stock` 通过同一事务保持一致：
//! 每次数量变更都把相同增量应用到对应药品的 stock。

use super::medicine::{Medicine, MedicineId};
use super::serde_helpers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Inventory ID type
pub type InventoryId = RecordId;

/// Default reorder threshold for low-stock reporting
pub const DEFAULT_REORDER_LEVEL: i64 = 10;

/// Inventory ledger record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<InventoryId>,
    #[serde(with = "serde_helpers::record_id")]
    pub medicine: MedicineId,
    pub quantity: i64,
    #[serde(default = "default_reorder_level")]
    pub reorder_level: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_restocked: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_reorder_level() -> i64 {
    DEFAULT_REORDER_LEVEL
}

/// Inventory record with its medicine fetched (`FETCH medicine`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryWithMedicine {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<InventoryId>,
    pub medicine: Medicine,
    pub quantity: i64,
    #[serde(default = "default_reorder_level")]
    pub reorder_level: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_restocked: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create inventory payload
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryCreate {
    pub medicine_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub reorder_level: Option<i64>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub batch_number: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Update inventory payload (partial)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct InventoryUpdate {
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub reorder_level: Option<i64>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub batch_number: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
}
