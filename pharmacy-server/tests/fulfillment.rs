//! 配送履约集成测试：派单、取货、OTP 核销

mod common;

use common::{id_of, open_db, seed_medicine, seed_user};
use pharmacy_server::db::models::{DeliveryType, Order, OrderCreate, OrderItemRequest, OrderStatus};
use pharmacy_server::db::repository::{OrderRepository, RepoError};
use rust_decimal_macros::dec;
use shared::Role;

/// 下一个已入库订单，推进到 `verified`
async fn verified_order(
    db: &surrealdb::Surreal<surrealdb::engine::local::Db>,
    customer_id: &str,
) -> Order {
    let med = seed_medicine(db, "Metformin", dec!(15), 50, false).await;
    let orders = OrderRepository::new(db.clone());
    let order = orders
        .place_order(
            customer_id,
            OrderCreate {
                items: vec![OrderItemRequest {
                    medicine_id: id_of(&med.id),
                    quantity: 1,
                }],
                prescription_id: None,
                delivery_address: None,
                delivery_type: DeliveryType::default(),
                notes: None,
            },
        )
        .await
        .unwrap();
    orders
        .set_status(&id_of(&order.id), OrderStatus::Verified, None)
        .await
        .unwrap()
}

#[tokio::test]
async fn assign_stores_otp_and_sanitized_view_strips_it() {
    let (_tmp, db) = open_db().await;
    let customer = seed_user(&db, "kate", Role::Customer).await;
    let agent = seed_user(&db, "agent_kate", Role::DeliveryAgent).await;

    let orders = OrderRepository::new(db.clone());
    let order = verified_order(&db, &id_of(&customer.id)).await;

    let assigned = orders
        .assign(&id_of(&order.id), &id_of(&agent.id), "4821".to_string())
        .await
        .unwrap();
    assert_eq!(assigned.status, OrderStatus::Assigned);
    assert_eq!(assigned.assigned_to, agent.id);
    assert_eq!(assigned.delivery_otp.as_deref(), Some("4821"));

    // 对外视图不得携带 OTP
    assert!(assigned.clone().sanitized().delivery_otp.is_none());

    // 代理的任务列表包含该订单
    let jobs = orders
        .find_deliveries_for_agent(&id_of(&agent.id))
        .await
        .unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].id, order.id);
}

#[tokio::test]
async fn assign_requires_verified_or_processing() {
    let (_tmp, db) = open_db().await;
    let customer = seed_user(&db, "liam", Role::Customer).await;
    let agent = seed_user(&db, "agent_liam", Role::DeliveryAgent).await;
    let med = seed_medicine(&db, "Omeprazole", dec!(9), 10, false).await;

    let orders = OrderRepository::new(db.clone());
    let order = orders
        .place_order(
            &id_of(&customer.id),
            OrderCreate {
                items: vec![OrderItemRequest {
                    medicine_id: id_of(&med.id),
                    quantity: 1,
                }],
                prescription_id: None,
                delivery_address: None,
                delivery_type: DeliveryType::default(),
                notes: None,
            },
        )
        .await
        .unwrap();

    // pending 不可派单
    let err = orders
        .assign(&id_of(&order.id), &id_of(&agent.id), "9999".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidTransition { .. }));
}

#[tokio::test]
async fn pickup_is_limited_to_the_assigned_agent() {
    let (_tmp, db) = open_db().await;
    let customer = seed_user(&db, "mia", Role::Customer).await;
    let agent = seed_user(&db, "agent_mia", Role::DeliveryAgent).await;
    let intruder = seed_user(&db, "agent_other", Role::DeliveryAgent).await;

    let orders = OrderRepository::new(db.clone());
    let order = verified_order(&db, &id_of(&customer.id)).await;
    orders
        .assign(&id_of(&order.id), &id_of(&agent.id), "3141".to_string())
        .await
        .unwrap();

    let err = orders
        .mark_picked_up(&id_of(&order.id), &id_of(&intruder.id), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotAssignedAgent));

    let picked = orders
        .mark_picked_up(
            &id_of(&order.id),
            &id_of(&agent.id),
            Some("sig-data".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(picked.status, OrderStatus::PickedUp);
    assert_eq!(picked.delivery_signature.as_deref(), Some("sig-data"));

    // 二次取货无效
    let err = orders
        .mark_picked_up(&id_of(&order.id), &id_of(&agent.id), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidTransition { .. }));
}

#[tokio::test]
async fn otp_completes_the_delivery_exactly_once() {
    let (_tmp, db) = open_db().await;
    let customer = seed_user(&db, "nina", Role::Customer).await;
    let agent = seed_user(&db, "agent_nina", Role::DeliveryAgent).await;
    let intruder = seed_user(&db, "agent_fake", Role::DeliveryAgent).await;

    let orders = OrderRepository::new(db.clone());
    let order = verified_order(&db, &id_of(&customer.id)).await;
    orders
        .assign(&id_of(&order.id), &id_of(&agent.id), "7777".to_string())
        .await
        .unwrap();
    orders
        .mark_picked_up(&id_of(&order.id), &id_of(&agent.id), None)
        .await
        .unwrap();

    // 非派单代理不可核销
    let err = orders
        .complete_with_otp(&id_of(&order.id), &id_of(&intruder.id), "7777")
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotAssignedAgent));

    // 错误 OTP
    let err = orders
        .complete_with_otp(&id_of(&order.id), &id_of(&agent.id), "0000")
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::OtpInvalid));

    // 正确 OTP：送达并清除 OTP
    let delivered = orders
        .complete_with_otp(&id_of(&order.id), &id_of(&agent.id), "7777")
        .await
        .unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);
    assert!(delivered.delivery_otp.is_none());

    // 重放同一 OTP
    let err = orders
        .complete_with_otp(&id_of(&order.id), &id_of(&agent.id), "7777")
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::OtpConsumed));

    // 送达后不在任务列表里
    let jobs = orders
        .find_deliveries_for_agent(&id_of(&agent.id))
        .await
        .unwrap();
    assert!(jobs.is_empty());
}

#[tokio::test]
async fn simultaneous_otp_submissions_deliver_at_most_once() {
    let (_tmp, db) = open_db().await;
    let customer = seed_user(&db, "pia", Role::Customer).await;
    let agent = seed_user(&db, "agent_pia", Role::DeliveryAgent).await;

    let orders = OrderRepository::new(db.clone());
    let order = verified_order(&db, &id_of(&customer.id)).await;
    let oid = id_of(&order.id);
    let agent_id = id_of(&agent.id);
    orders
        .assign(&oid, &agent_id, "6060".to_string())
        .await
        .unwrap();
    orders.mark_picked_up(&oid, &agent_id, None).await.unwrap();

    // 同一 OTP 被并发提交两次，核销至多一次
    let submit = |oid: String, agent_id: String, db: surrealdb::Surreal<surrealdb::engine::local::Db>| {
        tokio::spawn(async move {
            OrderRepository::new(db)
                .complete_with_otp(&oid, &agent_id, "6060")
                .await
        })
    };
    let (left, right) = tokio::join!(
        submit(oid.clone(), agent_id.clone(), db.clone()),
        submit(oid.clone(), agent_id.clone(), db.clone())
    );
    let outcomes = [left.unwrap(), right.unwrap()];
    let successes = outcomes.iter().filter(|r| r.is_ok()).count();
    assert!(successes <= 1, "the same OTP was consumed twice");

    // 有人核销成功时订单必须已送达且 OTP 已清除
    if successes == 1 {
        let after = orders.find_by_id(&oid).await.unwrap().unwrap();
        assert_eq!(after.status, OrderStatus::Delivered);
        assert!(after.delivery_otp.is_none());
    }
}

#[tokio::test]
async fn otp_works_straight_from_assigned() {
    let (_tmp, db) = open_db().await;
    let customer = seed_user(&db, "oscar", Role::Customer).await;
    let agent = seed_user(&db, "agent_oscar", Role::DeliveryAgent).await;

    let orders = OrderRepository::new(db.clone());
    let order = verified_order(&db, &id_of(&customer.id)).await;
    orders
        .assign(&id_of(&order.id), &id_of(&agent.id), "2468".to_string())
        .await
        .unwrap();

    // 上门自提场景下可跳过 picked_up 直接核销
    let delivered = orders
        .complete_with_otp(&id_of(&order.id), &id_of(&agent.id), "2468")
        .await
        .unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);
}
