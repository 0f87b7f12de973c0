//! 库存台账集成测试：台账数量与 `medicine.stock` 的同事务同步

mod common;

use common::{id_of, open_db, seed_medicine};
use pharmacy_server::db::models::{InventoryCreate, InventoryUpdate, MedicineUpdate};
use pharmacy_server::db::repository::{InventoryRepository, MedicineRepository, RepoError};
use rust_decimal_macros::dec;

fn batch(medicine_id: String, quantity: i64, reorder_level: Option<i64>) -> InventoryCreate {
    InventoryCreate {
        medicine_id,
        quantity,
        reorder_level,
        supplier: Some("Acme Pharma".to_string()),
        batch_number: Some("B-2026-01".to_string()),
        expiry_date: None,
        location: Some("A3".to_string()),
    }
}

#[tokio::test]
async fn creating_a_batch_adds_to_medicine_stock() {
    let (_tmp, db) = open_db().await;
    let med = seed_medicine(&db, "Loratadine", dec!(7), 5, false).await;

    let inventory = InventoryRepository::new(db.clone());
    let record = inventory
        .create(batch(id_of(&med.id), 40, None))
        .await
        .unwrap();
    assert_eq!(record.quantity, 40);

    let meds = MedicineRepository::new(db.clone());
    let after = meds.find_by_id(&id_of(&med.id)).await.unwrap().unwrap();
    assert_eq!(after.stock, 45);
}

#[tokio::test]
async fn create_validates_quantity_and_medicine() {
    let (_tmp, db) = open_db().await;
    let med = seed_medicine(&db, "Simvastatin", dec!(11), 0, false).await;

    let inventory = InventoryRepository::new(db.clone());

    let err = inventory
        .create(batch(id_of(&med.id), -1, None))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let err = inventory
        .create(batch("medicine:does_not_exist".to_string(), 10, None))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn quantity_updates_apply_the_delta_to_stock() {
    let (_tmp, db) = open_db().await;
    let med = seed_medicine(&db, "Lisinopril", dec!(13), 0, false).await;

    let inventory = InventoryRepository::new(db.clone());
    let meds = MedicineRepository::new(db.clone());

    let record = inventory
        .create(batch(id_of(&med.id), 30, None))
        .await
        .unwrap();

    // 30 -> 12，库存应同步 -18
    let updated = inventory
        .update(
            &id_of(&record.id),
            InventoryUpdate {
                quantity: Some(12),
                reorder_level: None,
                supplier: None,
                batch_number: None,
                expiry_date: None,
                location: Some("B1".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.quantity, 12);
    assert_eq!(updated.location.as_deref(), Some("B1"));
    // 未提供的字段保持原值
    assert_eq!(updated.supplier.as_deref(), Some("Acme Pharma"));
    // 减量不算补货，入库时间保持不变
    assert_eq!(updated.last_restocked, record.last_restocked);

    let after = meds.find_by_id(&id_of(&med.id)).await.unwrap().unwrap();
    assert_eq!(after.stock, 12);

    // 12 -> 20 是补货，打上补货时间
    let restocked = inventory
        .update(
            &id_of(&record.id),
            InventoryUpdate {
                quantity: Some(20),
                reorder_level: None,
                supplier: None,
                batch_number: None,
                expiry_date: None,
                location: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(restocked.quantity, 20);
    assert!(restocked.last_restocked.is_some());

    let after = meds.find_by_id(&id_of(&med.id)).await.unwrap().unwrap();
    assert_eq!(after.stock, 20);
}

#[tokio::test]
async fn deleting_a_batch_subtracts_its_quantity() {
    let (_tmp, db) = open_db().await;
    let med = seed_medicine(&db, "Atorvastatin", dec!(18), 3, false).await;

    let inventory = InventoryRepository::new(db.clone());
    let record = inventory
        .create(batch(id_of(&med.id), 25, None))
        .await
        .unwrap();

    let deleted = inventory.delete(&id_of(&record.id)).await.unwrap();
    assert!(deleted);
    assert!(inventory.find_by_id(&id_of(&record.id)).await.unwrap().is_none());

    let meds = MedicineRepository::new(db.clone());
    let after = meds.find_by_id(&id_of(&med.id)).await.unwrap().unwrap();
    assert_eq!(after.stock, 3);

    let err = inventory.delete(&id_of(&record.id)).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn correction_cannot_push_stock_negative() {
    let (_tmp, db) = open_db().await;
    let med = seed_medicine(&db, "Metformin", dec!(9), 0, false).await;

    let inventory = InventoryRepository::new(db.clone());
    let meds = MedicineRepository::new(db.clone());

    let record = inventory
        .create(batch(id_of(&med.id), 30, None))
        .await
        .unwrap();

    // 模拟销售：当前存量已低于台账记录的数量
    meds.update(
        &id_of(&med.id),
        MedicineUpdate {
            stock: Some(5),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // 30 -> 2 需要扣 28，存量只有 5，必须拒绝
    let err = inventory
        .update(
            &id_of(&record.id),
            InventoryUpdate {
                quantity: Some(2),
                reorder_level: None,
                supplier: None,
                batch_number: None,
                expiry_date: None,
                location: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    // 拒绝后存量和台账都不动
    let after = meds.find_by_id(&id_of(&med.id)).await.unwrap().unwrap();
    assert_eq!(after.stock, 5);
    let untouched = inventory.find_by_id(&id_of(&record.id)).await.unwrap().unwrap();
    assert_eq!(untouched.quantity, 30);

    // 存量范围内的修正照常通过
    let updated = inventory
        .update(
            &id_of(&record.id),
            InventoryUpdate {
                quantity: Some(27),
                reorder_level: None,
                supplier: None,
                batch_number: None,
                expiry_date: None,
                location: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.quantity, 27);
    let after = meds.find_by_id(&id_of(&med.id)).await.unwrap().unwrap();
    assert_eq!(after.stock, 2);
}

#[tokio::test]
async fn deleting_a_batch_clamps_stock_at_zero() {
    let (_tmp, db) = open_db().await;
    let med = seed_medicine(&db, "Omeprazole", dec!(14), 0, false).await;

    let inventory = InventoryRepository::new(db.clone());
    let meds = MedicineRepository::new(db.clone());

    let record = inventory
        .create(batch(id_of(&med.id), 25, None))
        .await
        .unwrap();

    // 存量被销售到低于批次数量
    meds.update(
        &id_of(&med.id),
        MedicineUpdate {
            stock: Some(4),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let deleted = inventory.delete(&id_of(&record.id)).await.unwrap();
    assert!(deleted);

    // 削到底但绝不为负
    let after = meds.find_by_id(&id_of(&med.id)).await.unwrap().unwrap();
    assert_eq!(after.stock, 0);
}

#[tokio::test]
async fn low_stock_report_honors_the_threshold() {
    let (_tmp, db) = open_db().await;
    let low = seed_medicine(&db, "Warfarin", dec!(22), 0, false).await;
    let high = seed_medicine(&db, "Fish Oil", dec!(6), 0, false).await;

    let inventory = InventoryRepository::new(db.clone());
    inventory.create(batch(id_of(&low.id), 4, None)).await.unwrap();
    inventory.create(batch(id_of(&high.id), 90, None)).await.unwrap();

    // 默认阈值 10
    let report = inventory.find_low_stock(None).await.unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].medicine.name, "Warfarin");
    assert_eq!(report[0].quantity, 4);

    // 自定义阈值覆盖默认值
    let report = inventory.find_low_stock(Some(100)).await.unwrap();
    assert_eq!(report.len(), 2);
    // 升序：存量最低的排最前
    assert_eq!(report[0].medicine.name, "Warfarin");

    let report = inventory.find_low_stock(Some(3)).await.unwrap();
    assert!(report.is_empty());
}
