//! Order Repository
//!
//! 订单生命周期的持久层。并发控制策略：
//! - 扣库存用条件更新 (`WHERE stock >= $qty`)，抢不到库存的请求直接落败；
//! - 订单 + 账单在同一个 SurrealQL 事务里创建，失败时回补已扣库存;
//! - OTP 核销用条件更新 (`WHERE delivery_otp = $otp AND status IN ...`)，
//!   核销同时清除 OTP，重放自然失败。

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{
    Billing, Medicine, Order, OrderCreate, OrderItem, OrderStatus, PaymentStatus,
    Prescription, PrescriptionStatus,
};
use chrono::Utc;
use rust_decimal::Decimal;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

const ORDER_TABLE: &str = "order";
const MEDICINE_TABLE: &str = "medicine";
const PRESCRIPTION_TABLE: &str = "prescription";
const USER_TABLE: &str = "user";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Find order by record id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let thing = parse_record_id(ORDER_TABLE, id)?;
        let order: Option<Order> = self.base.db().select(thing).await?;
        Ok(order)
    }

    /// A customer's own orders, newest first
    pub async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<Order>> {
        let user_thing = parse_record_id(USER_TABLE, user_id)?;
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE user_id = $user ORDER BY created_at DESC")
            .bind(("user", user_thing))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// All orders for staff, optional status filter, newest first
    pub async fn find_all(&self, status: Option<OrderStatus>) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM order
                    WHERE ($has_status = false OR status = $status)
                    ORDER BY created_at DESC"#,
            )
            .bind(("has_status", status.is_some()))
            .bind(("status", status))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Active deliveries for an agent (assigned or picked up)
    pub async fn find_deliveries_for_agent(&self, agent_id: &str) -> RepoResult<Vec<Order>> {
        let agent_thing = parse_record_id(USER_TABLE, agent_id)?;
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM order
                    WHERE assigned_to = $agent AND status IN ['assigned', 'picked_up']
                    ORDER BY created_at DESC"#,
            )
            .bind(("agent", agent_thing))
            .await?
            .take(0)?;
        Ok(orders)
    }

    // =========================================================================
    // Placement
    // =========================================================================

    /// Place an order: snapshot items, gate on prescription, decrement stock,
    /// then persist order and billing in one transaction.
    ///
    /// Stock decrements are conditional per medicine; losing a last-unit race
    /// fails with [`RepoError::InsufficientStock`] and rolls back decrements
    /// already applied. A failure while writing order/billing compensates the
    /// same way, so the store never holds an oversold medicine or an order
    /// without its billing row.
    pub async fn place_order(&self, user_id: &str, data: OrderCreate) -> RepoResult<Order> {
        if data.items.is_empty() {
            return Err(RepoError::Validation(
                "order must contain at least one item".into(),
            ));
        }

        let user_thing = parse_record_id(USER_TABLE, user_id)?;

        // 1. Snapshot each requested medicine
        let mut items: Vec<OrderItem> = Vec::with_capacity(data.items.len());
        for req in &data.items {
            if req.quantity == 0 {
                return Err(RepoError::Validation(format!(
                    "quantity for '{}' must be at least 1",
                    req.medicine_id
                )));
            }
            let med_thing = parse_record_id(MEDICINE_TABLE, &req.medicine_id)?;
            let medicine: Option<Medicine> = self.base.db().select(med_thing.clone()).await?;
            let medicine = medicine.ok_or_else(|| {
                RepoError::NotFound(format!("Medicine {} not found", req.medicine_id))
            })?;
            if i64::from(req.quantity) > medicine.stock {
                return Err(RepoError::InsufficientStock(medicine.name));
            }
            items.push(OrderItem {
                medicine: med_thing,
                name: medicine.name,
                quantity: req.quantity,
                price: medicine.price,
                requires_prescription: medicine.requires_prescription,
            });
        }

        // 2. Prescription gate
        let prescription_link = if items.iter().any(|i| i.requires_prescription) {
            let prescription_id = data
                .prescription_id
                .as_deref()
                .ok_or(RepoError::PrescriptionRequired)?;
            let rx_thing = parse_record_id(PRESCRIPTION_TABLE, prescription_id)?;
            let prescription: Option<Prescription> =
                self.base.db().select(rx_thing.clone()).await?;
            let prescription = prescription.ok_or_else(|| {
                RepoError::NotFound(format!("Prescription {} not found", prescription_id))
            })?;
            if prescription.user_id != user_thing {
                return Err(RepoError::PrescriptionOwnerMismatch);
            }
            if prescription.status != PrescriptionStatus::Verified {
                return Err(RepoError::PrescriptionNotVerified);
            }
            Some(rx_thing)
        } else {
            None
        };

        // 3. Totals over the snapshot
        let total_amount: Decimal = items
            .iter()
            .map(|i| i.price * Decimal::from(i.quantity))
            .sum();

        let order_id = crate::utils::random::order_reference()
            .map_err(|e| RepoError::Database(format!("Failed to generate order id: {e}")))?;

        // 4. Decrement stock, remembering what to compensate on failure
        let mut decremented: Vec<(RecordId, u32)> = Vec::with_capacity(items.len());
        for item in &items {
            let updated: Option<Medicine> = self
                .base
                .db()
                .query(
                    r#"UPDATE $med SET stock -= $qty, updated_at = $now
                        WHERE stock >= $qty
                        RETURN AFTER"#,
                )
                .bind(("med", item.medicine.clone()))
                .bind(("qty", i64::from(item.quantity)))
                .bind(("now", Utc::now()))
                .await?
                .take(0)?;

            if updated.is_none() {
                // Lost the race since the snapshot read
                let name = item.name.clone();
                self.restore_stock(&decremented).await;
                return Err(RepoError::InsufficientStock(name));
            }
            decremented.push((item.medicine.clone(), item.quantity));
        }

        // 5. Order + billing in a single transaction
        let now = Utc::now();
        let order = Order {
            id: None,
            order_id: order_id.clone(),
            user_id: user_thing.clone(),
            prescription: prescription_link,
            items,
            total_amount,
            delivery_address: data.delivery_address,
            delivery_type: data.delivery_type,
            status: OrderStatus::Pending,
            assigned_to: None,
            delivery_otp: None,
            delivery_signature: None,
            notes: data.notes,
            created_at: Some(now),
            updated_at: Some(now),
        };
        let (tax, total) = Billing::compute(total_amount);
        let billing = Billing {
            id: None,
            order_id,
            user_id: user_thing,
            amount: total_amount,
            tax,
            total,
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            created_at: Some(now),
        };

        let created = self.create_order_with_billing(&order, &billing).await;
        match created {
            Ok(order) => Ok(order),
            Err(e) => {
                self.restore_stock(&decremented).await;
                Err(e)
            }
        }
    }

    async fn create_order_with_billing(
        &self,
        order: &Order,
        billing: &Billing,
    ) -> RepoResult<Order> {
        let mut order_value = serde_json::to_value(order)
            .map_err(|e| RepoError::Database(format!("Failed to serialize order: {e}")))?;
        let mut billing_value = serde_json::to_value(billing)
            .map_err(|e| RepoError::Database(format!("Failed to serialize billing: {e}")))?;
        // Let the database assign record ids
        order_value.as_object_mut().map(|o| o.remove("id"));
        billing_value.as_object_mut().map(|o| o.remove("id"));

        let mut result = self
            .base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                CREATE order CONTENT $order;
                CREATE billing CONTENT $billing;
                COMMIT TRANSACTION;"#,
            )
            .bind(("order", order_value))
            .bind(("billing", billing_value))
            .await?;

        let created: Vec<Order> = result.take(0)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Best-effort compensation after a failed placement
    async fn restore_stock(&self, decremented: &[(RecordId, u32)]) {
        for (medicine, qty) in decremented {
            let restore = self
                .base
                .db()
                .query("UPDATE $med SET stock += $qty")
                .bind(("med", medicine.clone()))
                .bind(("qty", i64::from(*qty)))
                .await;
            if let Err(e) = restore {
                tracing::error!(
                    medicine = %medicine,
                    qty,
                    error = %e,
                    "Failed to restore stock after aborted order"
                );
            }
        }
    }

    // =========================================================================
    // Staff transitions
    // =========================================================================

    /// Staff status update, conditional on the status the caller saw
    ///
    /// The `WHERE status = $from` guard makes concurrent updates serialize:
    /// the loser observes a different current status and gets
    /// [`RepoError::InvalidTransition`]. Optional notes are written onto the
    /// order alongside the status.
    pub async fn set_status(
        &self,
        id: &str,
        to: OrderStatus,
        notes: Option<String>,
    ) -> RepoResult<Order> {
        let order = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))?;
        let from = order.status;
        if !from.can_transition(to) {
            return Err(RepoError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        let thing = parse_record_id(ORDER_TABLE, id)?;
        let updated: Option<Order> = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    status = $to,
                    notes = $notes OR notes,
                    updated_at = $now
                    WHERE status = $from
                    RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("to", to))
            .bind(("from", from))
            .bind(("notes", notes))
            .bind(("now", Utc::now()))
            .await?
            .take(0)?;

        updated.ok_or(RepoError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    /// Assign an order to a delivery agent and arm it with a fresh OTP
    ///
    /// Legal only from `verified` or `processing`; the generated OTP is
    /// persisted here and stripped before any agent-facing response.
    pub async fn assign(&self, id: &str, agent_id: &str, otp: String) -> RepoResult<Order> {
        let order = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))?;
        if !order.status.can_transition(OrderStatus::Assigned)
            // verified -> assigned skips processing; the original flow allows it
            && order.status != OrderStatus::Verified
        {
            return Err(RepoError::InvalidTransition {
                from: order.status.to_string(),
                to: OrderStatus::Assigned.to_string(),
            });
        }

        let thing = parse_record_id(ORDER_TABLE, id)?;
        let agent_thing = parse_record_id(USER_TABLE, agent_id)?;
        let updated: Option<Order> = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    status = 'assigned',
                    assigned_to = $agent,
                    delivery_otp = $otp,
                    updated_at = $now
                WHERE status IN ['verified', 'processing']
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("agent", agent_thing))
            .bind(("otp", otp))
            .bind(("now", Utc::now()))
            .await?
            .take(0)?;

        updated.ok_or(RepoError::InvalidTransition {
            from: order.status.to_string(),
            to: OrderStatus::Assigned.to_string(),
        })
    }

    // =========================================================================
    // Agent transitions
    // =========================================================================

    /// Agent marks an assigned order as picked up
    pub async fn mark_picked_up(
        &self,
        id: &str,
        agent_id: &str,
        signature: Option<String>,
    ) -> RepoResult<Order> {
        let thing = parse_record_id(ORDER_TABLE, id)?;
        let agent_thing = parse_record_id(USER_TABLE, agent_id)?;

        let updated: Option<Order> = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    status = 'picked_up',
                    delivery_signature = $signature OR delivery_signature,
                    updated_at = $now
                WHERE assigned_to = $agent AND status = 'assigned'
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("agent", agent_thing.clone()))
            .bind(("signature", signature))
            .bind(("now", Utc::now()))
            .await?
            .take(0)?;

        if let Some(order) = updated {
            return Ok(order);
        }

        // Distinguish the failure for the caller
        let order = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))?;
        if order.assigned_to != Some(agent_thing) {
            return Err(RepoError::NotAssignedAgent);
        }
        Err(RepoError::InvalidTransition {
            from: order.status.to_string(),
            to: OrderStatus::PickedUp.to_string(),
        })
    }

    /// Verify the delivery OTP and complete the order
    ///
    /// The compare is constant-time, and the completing update both checks and
    /// clears the stored OTP in one conditional statement, so a replay of the
    /// same OTP after success finds nothing to match.
    pub async fn complete_with_otp(
        &self,
        id: &str,
        agent_id: &str,
        otp: &str,
    ) -> RepoResult<Order> {
        let order = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))?;

        let agent_thing = parse_record_id(USER_TABLE, agent_id)?;
        if order.assigned_to != Some(agent_thing) {
            return Err(RepoError::NotAssignedAgent);
        }
        if order.status == OrderStatus::Delivered {
            return Err(RepoError::OtpConsumed);
        }

        let stored = order.delivery_otp.as_deref().ok_or(RepoError::OtpConsumed)?;
        if ring::constant_time::verify_slices_are_equal(stored.as_bytes(), otp.as_bytes()).is_err()
        {
            return Err(RepoError::OtpInvalid);
        }

        let thing = parse_record_id(ORDER_TABLE, id)?;
        let updated: Option<Order> = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    status = 'delivered',
                    delivery_otp = NONE,
                    updated_at = $now
                WHERE delivery_otp = $otp AND status IN ['assigned', 'picked_up']
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("otp", otp.to_string()))
            .bind(("now", Utc::now()))
            .await?
            .take(0)?;

        // A concurrent verification consumed the OTP between the read and the update
        updated.ok_or(RepoError::OtpConsumed)
    }
}
