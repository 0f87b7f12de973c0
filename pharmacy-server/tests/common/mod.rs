//! 集成测试公共辅助：临时数据库 + 基础数据种子
#![allow(dead_code)]

use pharmacy_server::db::DbService;
use pharmacy_server::db::models::{Medicine, MedicineCategory, MedicineCreate, User, UserCreate};
use pharmacy_server::db::repository::{MedicineRepository, UserRepository};
use rust_decimal::Decimal;
use shared::Role;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tempfile::TempDir;

/// Open a fresh embedded database in a tempdir (schema applied)
pub async fn open_db() -> (TempDir, Surreal<Db>) {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("pharmacy.db");
    let service = DbService::new(path.to_str().unwrap()).await.unwrap();
    (tmp, service.db)
}

pub async fn seed_user(db: &Surreal<Db>, username: &str, role: Role) -> User {
    let repo = UserRepository::new(db.clone());
    repo.create(UserCreate {
        username: username.to_string(),
        password: "test-password".to_string(),
        display_name: Some(username.to_string()),
        phone: Some("555-0100".to_string()),
        role,
    })
    .await
    .unwrap()
}

pub async fn seed_medicine(
    db: &Surreal<Db>,
    name: &str,
    price: Decimal,
    stock: i64,
    requires_prescription: bool,
) -> Medicine {
    let repo = MedicineRepository::new(db.clone());
    repo.create(MedicineCreate {
        name: name.to_string(),
        generic_name: None,
        brand: None,
        category: if requires_prescription {
            MedicineCategory::Prescription
        } else {
            MedicineCategory::Otc
        },
        description: None,
        price,
        stock,
        image_url: None,
        symptoms: vec![],
        dosage: None,
        side_effects: None,
        manufacturer: None,
        expiry_date: None,
        requires_prescription,
    })
    .await
    .unwrap()
}

/// Record id of a seeded entity as the string form repositories accept
pub fn id_of(id: &Option<surrealdb::RecordId>) -> String {
    id.as_ref().unwrap().to_string()
}
