//! Inventory Repository
//!
//! 台账数量变更同步到 `medicine.stock`：入库走单事务；数量修正先用
//! 条件更新仲裁 stock（向下修正不得越过已售出的数量），台账写入失败
//! 时回补。stock 任何时候不允许为负。

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{
    DEFAULT_REORDER_LEVEL, Inventory, InventoryCreate, InventoryUpdate, InventoryWithMedicine,
    Medicine,
};
use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const INVENTORY_TABLE: &str = "inventory";
const MEDICINE_TABLE: &str = "medicine";

#[derive(Clone)]
pub struct InventoryRepository {
    base: BaseRepository,
}

impl InventoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All inventory records with their medicine fetched
    pub async fn find_all(&self) -> RepoResult<Vec<InventoryWithMedicine>> {
        let records: Vec<InventoryWithMedicine> = self
            .base
            .db()
            .query("SELECT * FROM inventory ORDER BY updated_at DESC FETCH medicine")
            .await?
            .take(0)?;
        Ok(records)
    }

    /// Find inventory record by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Inventory>> {
        let thing = parse_record_id(INVENTORY_TABLE, id)?;
        let record: Option<Inventory> = self.base.db().select(thing).await?;
        Ok(record)
    }

    /// Records at or below the reorder threshold
    pub async fn find_low_stock(
        &self,
        threshold: Option<i64>,
    ) -> RepoResult<Vec<InventoryWithMedicine>> {
        let threshold = threshold.unwrap_or(DEFAULT_REORDER_LEVEL);
        let records: Vec<InventoryWithMedicine> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM inventory
                    WHERE quantity <= $threshold
                    ORDER BY quantity ASC
                    FETCH medicine"#,
            )
            .bind(("threshold", threshold))
            .await?
            .take(0)?;
        Ok(records)
    }

    /// Create an inventory record; its quantity is added to the medicine stock
    /// in the same transaction.
    pub async fn create(&self, data: InventoryCreate) -> RepoResult<Inventory> {
        if data.quantity < 0 {
            return Err(RepoError::Validation("quantity cannot be negative".into()));
        }
        let med_thing = parse_record_id(MEDICINE_TABLE, &data.medicine_id)?;
        let medicine: Option<Medicine> = self.base.db().select(med_thing.clone()).await?;
        if medicine.is_none() {
            return Err(RepoError::NotFound(format!(
                "Medicine {} not found",
                data.medicine_id
            )));
        }

        let now = Utc::now();
        let mut result = self
            .base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                CREATE inventory SET
                    medicine = $med,
                    quantity = $quantity,
                    reorder_level = $reorder_level,
                    last_restocked = $now,
                    supplier = $supplier,
                    batch_number = $batch_number,
                    expiry_date = $expiry_date,
                    location = $location,
                    updated_at = $now
                RETURN AFTER;
                UPDATE $med SET stock += $quantity, updated_at = $now;
                COMMIT TRANSACTION;"#,
            )
            .bind(("med", med_thing))
            .bind(("quantity", data.quantity))
            .bind((
                "reorder_level",
                data.reorder_level.unwrap_or(DEFAULT_REORDER_LEVEL),
            ))
            .bind(("supplier", data.supplier))
            .bind(("batch_number", data.batch_number))
            .bind(("expiry_date", data.expiry_date))
            .bind(("location", data.location))
            .bind(("now", now))
            .await?;

        let created: Option<Inventory> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create inventory record".to_string()))
    }

    /// Update an inventory record; a quantity change applies the same delta to
    /// the medicine stock.
    ///
    /// The stock write is conditional: a downward correction larger than the
    /// remaining stock (units already sold) is rejected, so `medicine.stock`
    /// can never go negative through the ledger.
    pub async fn update(&self, id: &str, data: InventoryUpdate) -> RepoResult<Inventory> {
        let thing = parse_record_id(INVENTORY_TABLE, id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Inventory record {} not found", id)))?;

        let new_quantity = data.quantity.unwrap_or(existing.quantity);
        if new_quantity < 0 {
            return Err(RepoError::Validation("quantity cannot be negative".into()));
        }
        let delta = new_quantity - existing.quantity;
        let restocked = delta > 0;
        let now = Utc::now();

        // 1. 条件更新仲裁 stock：WHERE 不满足即为非法修正
        if delta != 0 {
            let needed = (-delta).max(0);
            let adjusted: Option<Medicine> = self
                .base
                .db()
                .query(
                    r#"UPDATE $med SET stock += $delta, updated_at = $now
                        WHERE stock >= $needed
                        RETURN AFTER"#,
                )
                .bind(("med", existing.medicine.clone()))
                .bind(("delta", delta))
                .bind(("needed", needed))
                .bind(("now", now))
                .await?
                .take(0)?;
            if adjusted.is_none() {
                return Err(RepoError::Validation(
                    "quantity correction exceeds the medicine's remaining stock".into(),
                ));
            }
        }

        // 2. 写台账，失败则回补 stock
        let ledger = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    quantity = $quantity,
                    reorder_level = $reorder_level OR reorder_level,
                    last_restocked = IF $restocked THEN $now ELSE last_restocked END,
                    supplier = $supplier OR supplier,
                    batch_number = $batch_number OR batch_number,
                    expiry_date = $expiry_date OR expiry_date,
                    location = $location OR location,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("quantity", new_quantity))
            .bind(("restocked", restocked))
            .bind(("reorder_level", data.reorder_level))
            .bind(("supplier", data.supplier))
            .bind(("batch_number", data.batch_number))
            .bind(("expiry_date", data.expiry_date))
            .bind(("location", data.location))
            .bind(("now", now))
            .await;

        let mut result = match ledger {
            Ok(result) => result,
            Err(e) => {
                self.revert_stock(&existing.medicine, delta).await;
                return Err(e.into());
            }
        };
        let updated: Option<Inventory> = match result.take(0) {
            Ok(updated) => updated,
            Err(e) => {
                self.revert_stock(&existing.medicine, delta).await;
                return Err(e.into());
            }
        };
        match updated {
            Some(updated) => Ok(updated),
            None => {
                self.revert_stock(&existing.medicine, delta).await;
                Err(RepoError::NotFound(format!(
                    "Inventory record {} not found",
                    id
                )))
            }
        }
    }

    /// Best-effort rollback of a stock adjustment after a failed ledger write
    async fn revert_stock(&self, medicine: &surrealdb::RecordId, delta: i64) {
        if delta == 0 {
            return;
        }
        if let Err(e) = self
            .base
            .db()
            .query("UPDATE $med SET stock -= $delta, updated_at = $now")
            .bind(("med", medicine.clone()))
            .bind(("delta", delta))
            .bind(("now", Utc::now()))
            .await
        {
            tracing::error!(
                medicine = %medicine,
                delta,
                error = %e,
                "Failed to revert stock adjustment"
            );
        }
    }

    /// Delete an inventory record; its remaining quantity is subtracted from
    /// the medicine stock in the same transaction.
    ///
    /// The subtraction clamps at zero: units of the batch already sold must
    /// not push the stock negative. A clamp means ledger and stock had
    /// drifted apart, which is logged.
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(INVENTORY_TABLE, id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Inventory record {} not found", id)))?;

        let medicine: Option<Medicine> = self.base.db().select(existing.medicine.clone()).await?;
        if let Some(med) = &medicine
            && med.stock < existing.quantity
        {
            tracing::warn!(
                medicine = %existing.medicine,
                ledger_quantity = existing.quantity,
                stock = med.stock,
                "Batch quantity exceeds remaining stock, clamping at zero"
            );
        }

        self.base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                DELETE $thing;
                UPDATE $med SET stock = math::max([stock - $quantity, 0]), updated_at = $now;
                COMMIT TRANSACTION;"#,
            )
            .bind(("thing", thing))
            .bind(("med", existing.medicine))
            .bind(("quantity", existing.quantity))
            .bind(("now", Utc::now()))
            .await?;
        Ok(true)
    }
}
