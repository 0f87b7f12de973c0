//! 订单生命周期集成测试
//!
//! 覆盖下单（库存扣减 + 账单同事务写入）、余额不足、并发抢最后一件、
//! 状态机推进与拒绝窗口。

mod common;

use common::{id_of, open_db, seed_medicine, seed_user};
use pharmacy_server::db::models::{DeliveryType, OrderCreate, OrderItemRequest, OrderStatus};
use pharmacy_server::db::repository::{BillingRepository, MedicineRepository, OrderRepository, RepoError};
use rust_decimal_macros::dec;
use shared::Role;

fn order_of(items: Vec<OrderItemRequest>) -> OrderCreate {
    OrderCreate {
        items,
        prescription_id: None,
        delivery_address: None,
        delivery_type: DeliveryType::default(),
        notes: None,
    }
}

#[tokio::test]
async fn place_order_snapshots_items_and_writes_billing() {
    let (_tmp, db) = open_db().await;
    let customer = seed_user(&db, "alice", Role::Customer).await;
    let med = seed_medicine(&db, "Paracetamol", dec!(10.50), 20, false).await;

    let orders = OrderRepository::new(db.clone());
    let order = orders
        .place_order(
            &id_of(&customer.id),
            order_of(vec![OrderItemRequest {
                medicine_id: id_of(&med.id),
                quantity: 2,
            }]),
        )
        .await
        .unwrap();

    assert!(order.order_id.starts_with("ORD-"));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].name, "Paracetamol");
    assert_eq!(order.items[0].quantity, 2);
    assert_eq!(order.items[0].price, dec!(10.50));
    assert_eq!(order.total_amount, dec!(21.00));

    // 库存已扣减
    let meds = MedicineRepository::new(db.clone());
    let after = meds.find_by_id(&id_of(&med.id)).await.unwrap().unwrap();
    assert_eq!(after.stock, 18);

    // 账单与订单同事务创建，税率 18%
    let bills = BillingRepository::new(db.clone());
    let bill = bills.find_by_order_id(&order.order_id).await.unwrap().unwrap();
    assert_eq!(bill.amount, dec!(21.00));
    assert_eq!(bill.tax, dec!(3.7800));
    assert_eq!(bill.total, dec!(24.7800));
}

#[tokio::test]
async fn place_order_rejects_insufficient_stock_without_touching_it() {
    let (_tmp, db) = open_db().await;
    let customer = seed_user(&db, "bob", Role::Customer).await;
    let med = seed_medicine(&db, "Ibuprofen", dec!(5), 3, false).await;

    let orders = OrderRepository::new(db.clone());
    let err = orders
        .place_order(
            &id_of(&customer.id),
            order_of(vec![OrderItemRequest {
                medicine_id: id_of(&med.id),
                quantity: 4,
            }]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, RepoError::InsufficientStock(ref name) if name == "Ibuprofen"));

    let meds = MedicineRepository::new(db.clone());
    let after = meds.find_by_id(&id_of(&med.id)).await.unwrap().unwrap();
    assert_eq!(after.stock, 3);
}

#[tokio::test]
async fn place_order_rejects_empty_and_zero_quantity() {
    let (_tmp, db) = open_db().await;
    let customer = seed_user(&db, "carol", Role::Customer).await;
    let med = seed_medicine(&db, "Cetirizine", dec!(4), 10, false).await;

    let orders = OrderRepository::new(db.clone());

    let err = orders
        .place_order(&id_of(&customer.id), order_of(vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let err = orders
        .place_order(
            &id_of(&customer.id),
            order_of(vec![OrderItemRequest {
                medicine_id: id_of(&med.id),
                quantity: 0,
            }]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[tokio::test]
async fn last_unit_goes_to_exactly_one_order() {
    let (_tmp, db) = open_db().await;
    let a = seed_user(&db, "racer_a", Role::Customer).await;
    let b = seed_user(&db, "racer_b", Role::Customer).await;
    let med = seed_medicine(&db, "Insulin", dec!(30), 1, false).await;

    let orders = OrderRepository::new(db.clone());
    let request = |med_id: String| {
        order_of(vec![OrderItemRequest {
            medicine_id: med_id,
            quantity: 1,
        }])
    };

    orders
        .place_order(&id_of(&a.id), request(id_of(&med.id)))
        .await
        .unwrap();
    let err = orders
        .place_order(&id_of(&b.id), request(id_of(&med.id)))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::InsufficientStock(_)));

    let meds = MedicineRepository::new(db.clone());
    let after = meds.find_by_id(&id_of(&med.id)).await.unwrap().unwrap();
    assert_eq!(after.stock, 0);
}

#[tokio::test]
async fn simultaneous_orders_for_the_last_unit_admit_at_most_one() {
    let (_tmp, db) = open_db().await;
    let a = seed_user(&db, "sprinter_a", Role::Customer).await;
    let b = seed_user(&db, "sprinter_b", Role::Customer).await;
    let med = seed_medicine(&db, "Adrenaline", dec!(55), 1, false).await;
    let med_id = id_of(&med.id);

    let race = |uid: String, med_id: String, db: surrealdb::Surreal<surrealdb::engine::local::Db>| {
        tokio::spawn(async move {
            OrderRepository::new(db)
                .place_order(
                    &uid,
                    order_of(vec![OrderItemRequest {
                        medicine_id: med_id,
                        quantity: 1,
                    }]),
                )
                .await
        })
    };

    // 两个请求同时在跑，谁输谁赢不确定，但赢家至多一个
    let (left, right) = tokio::join!(
        race(id_of(&a.id), med_id.clone(), db.clone()),
        race(id_of(&b.id), med_id.clone(), db.clone())
    );
    let outcomes = [left.unwrap(), right.unwrap()];
    let winners = outcomes.iter().filter(|r| r.is_ok()).count();
    assert!(winners <= 1, "both orders claimed the last unit");

    // 库存与成交数严格对账，绝不为负
    let meds = MedicineRepository::new(db.clone());
    let after = meds.find_by_id(&med_id).await.unwrap().unwrap();
    assert_eq!(after.stock, 1 - winners as i64);
}

#[tokio::test]
async fn status_advances_one_step_at_a_time() {
    let (_tmp, db) = open_db().await;
    let customer = seed_user(&db, "dora", Role::Customer).await;
    let med = seed_medicine(&db, "Vitamin C", dec!(8), 10, false).await;

    let orders = OrderRepository::new(db.clone());
    let order = orders
        .place_order(
            &id_of(&customer.id),
            order_of(vec![OrderItemRequest {
                medicine_id: id_of(&med.id),
                quantity: 1,
            }]),
        )
        .await
        .unwrap();
    let oid = id_of(&order.id);

    // 跳级被拒绝
    let err = orders
        .set_status(&oid, OrderStatus::Processing, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidTransition { .. }));

    let order = orders
        .set_status(&oid, OrderStatus::Verified, Some("checked against rx".to_string()))
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Verified);
    // 随状态一并写入的备注
    assert_eq!(order.notes.as_deref(), Some("checked against rx"));

    let order = orders
        .set_status(&oid, OrderStatus::Processing, None)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Processing);
    // 未给备注时保留原值
    assert_eq!(order.notes.as_deref(), Some("checked against rx"));

    // 回退被拒绝
    let err = orders
        .set_status(&oid, OrderStatus::Pending, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidTransition { .. }));
}

#[tokio::test]
async fn rejection_window_closes_after_processing() {
    let (_tmp, db) = open_db().await;
    let customer = seed_user(&db, "eve", Role::Customer).await;
    let agent = seed_user(&db, "agent_eve", Role::DeliveryAgent).await;
    let med = seed_medicine(&db, "Aspirin", dec!(6), 10, false).await;

    let orders = OrderRepository::new(db.clone());
    let order = orders
        .place_order(
            &id_of(&customer.id),
            order_of(vec![OrderItemRequest {
                medicine_id: id_of(&med.id),
                quantity: 1,
            }]),
        )
        .await
        .unwrap();
    let oid = id_of(&order.id);

    // pending -> rejected 合法且终态
    let order = orders
        .set_status(&oid, OrderStatus::Rejected, None)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Rejected);
    let err = orders
        .set_status(&oid, OrderStatus::Verified, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidTransition { .. }));

    // 已分配后不可再拒绝
    let order2 = orders
        .place_order(
            &id_of(&customer.id),
            order_of(vec![OrderItemRequest {
                medicine_id: id_of(&med.id),
                quantity: 1,
            }]),
        )
        .await
        .unwrap();
    let oid2 = id_of(&order2.id);
    orders
        .set_status(&oid2, OrderStatus::Verified, None)
        .await
        .unwrap();
    orders
        .assign(&oid2, &id_of(&agent.id), "1234".to_string())
        .await
        .unwrap();
    let err = orders
        .set_status(&oid2, OrderStatus::Rejected, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidTransition { .. }));
}
