//! Medicine Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Medicine, MedicineCreate, MedicineQuery, MedicineUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const MEDICINE_TABLE: &str = "medicine";

#[derive(Clone)]
pub struct MedicineRepository {
    base: BaseRepository,
}

impl MedicineRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find medicines matching the catalog filters
    ///
    /// Category and prescription-flag filters run in the database; the free
    /// text `search` matches name, generic name, and symptom entries
    /// case-insensitively.
    pub async fn find_all(&self, query: &MedicineQuery) -> RepoResult<Vec<Medicine>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"SELECT * FROM medicine
                    WHERE ($has_category = false OR category = $category)
                      AND ($has_rx = false OR requires_prescription = $rx)
                    ORDER BY name"#,
            )
            .bind(("has_category", query.category.is_some()))
            .bind(("category", query.category))
            .bind(("has_rx", query.requires_prescription.is_some()))
            .bind(("rx", query.requires_prescription.unwrap_or(false)))
            .await?;
        let mut medicines: Vec<Medicine> = result.take(0)?;

        if let Some(ref search) = query.search {
            let needle = search.to_lowercase();
            medicines.retain(|m| {
                m.name.to_lowercase().contains(&needle)
                    || m.generic_name
                        .as_deref()
                        .is_some_and(|g| g.to_lowercase().contains(&needle))
                    || m.symptoms
                        .iter()
                        .any(|s| s.to_lowercase().contains(&needle))
            });
        }

        Ok(medicines)
    }

    /// Find medicine by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Medicine>> {
        let thing = parse_record_id(MEDICINE_TABLE, id)?;
        let medicine: Option<Medicine> = self.base.db().select(thing).await?;
        Ok(medicine)
    }

    /// Create a new medicine
    pub async fn create(&self, data: MedicineCreate) -> RepoResult<Medicine> {
        if data.stock < 0 {
            return Err(RepoError::Validation("stock cannot be negative".into()));
        }

        let medicine = Medicine {
            id: None,
            name: data.name,
            generic_name: data.generic_name,
            brand: data.brand,
            category: data.category,
            description: data.description,
            price: data.price,
            stock: data.stock,
            image_url: data.image_url,
            symptoms: data.symptoms,
            dosage: data.dosage,
            side_effects: data.side_effects,
            manufacturer: data.manufacturer,
            expiry_date: data.expiry_date,
            requires_prescription: data.requires_prescription,
            created_at: Some(chrono::Utc::now()),
            updated_at: Some(chrono::Utc::now()),
        };

        let created: Option<Medicine> = self
            .base
            .db()
            .create(MEDICINE_TABLE)
            .content(medicine)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create medicine".to_string()))
    }

    /// Update a medicine (partial)
    ///
    /// `stock` set through this path is an absolute value; relative stock
    /// movements go through the inventory ledger or order placement.
    pub async fn update(&self, id: &str, data: MedicineUpdate) -> RepoResult<Medicine> {
        let thing = parse_record_id(MEDICINE_TABLE, id)?;

        if data.stock.is_some_and(|s| s < 0) {
            return Err(RepoError::Validation("stock cannot be negative".into()));
        }

        let mut patch = serde_json::to_value(&data)
            .map_err(|e| RepoError::Validation(format!("Invalid update payload: {e}")))?;
        patch["updated_at"] = serde_json::json!(chrono::Utc::now());

        let mut result = self
            .base
            .db()
            .query("UPDATE $thing MERGE $data RETURN AFTER")
            .bind(("thing", thing))
            .bind(("data", patch))
            .await?;

        result
            .take::<Option<Medicine>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Medicine {} not found", id)))
    }

    /// Hard delete a medicine
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(MEDICINE_TABLE, id)?;
        let existing: Option<Medicine> = self.base.db().select(thing.clone()).await?;
        if existing.is_none() {
            return Err(RepoError::NotFound(format!("Medicine {} not found", id)));
        }
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}
