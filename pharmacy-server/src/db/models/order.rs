//! Order Model
//!
//! 订单是下单时刻的快照：条目冻结药品名称与单价，后续目录变更不影响已下订单。

use super::medicine::MedicineId;
use super::prescription::PrescriptionId;
use super::serde_helpers;
use super::user::UserId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Order ID type (internal record id; the human-readable id is `order_id`)
pub type OrderRecordId = RecordId;

// =============================================================================
// Status state machine
// =============================================================================

/// Order lifecycle status
///
/// Transitions are forward-only along the rank order
/// pending → verified → processing → assigned → picked_up → delivered.
/// `rejected` is terminal and reachable only before assignment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Verified,
    Processing,
    Assigned,
    PickedUp,
    Delivered,
    Rejected,
}

impl OrderStatus {
    /// Position along the forward path; `rejected` has no rank
    fn rank(&self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Verified => Some(1),
            Self::Processing => Some(2),
            Self::Assigned => Some(3),
            Self::PickedUp => Some(4),
            Self::Delivered => Some(5),
            Self::Rejected => None,
        }
    }

    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Rejected)
    }

    /// Whether `self → to` is a legal transition
    pub fn can_transition(&self, to: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match to {
            // Rejection allowed only before the order reaches fulfillment
            OrderStatus::Rejected => matches!(
                self,
                Self::Pending | Self::Verified | Self::Processing
            ),
            _ => match (self.rank(), to.rank()) {
                (Some(from), Some(to)) => to == from + 1,
                _ => false,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Processing => "processing",
            Self::Assigned => "assigned",
            Self::PickedUp => "picked_up",
            Self::Delivered => "delivered",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Order entity
// =============================================================================

/// Fulfillment channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    #[default]
    Delivery,
    Pickup,
}

/// Snapshot of a medicine at order time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(with = "serde_helpers::record_id")]
    pub medicine: MedicineId,
    pub name: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub requires_prescription: bool,
}

/// Delivery address embedded in the order
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DeliveryAddress {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<OrderRecordId>,
    /// Human-readable id, e.g. `ORD-1735689600000-A1B2C3D4E`
    pub order_id: String,
    #[serde(with = "serde_helpers::record_id")]
    pub user_id: UserId,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub prescription: Option<PrescriptionId>,
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<DeliveryAddress>,
    #[serde(default)]
    pub delivery_type: DeliveryType,
    pub status: OrderStatus,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub assigned_to: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_otp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Agent/customer-facing view: the stored OTP must never leave the server
    pub fn sanitized(mut self) -> Self {
        self.delivery_otp = None;
        self
    }
}

// =============================================================================
// API payloads
// =============================================================================

/// One requested line of `POST /api/orders`
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemRequest {
    pub medicine_id: String,
    pub quantity: u32,
}

/// Create order payload
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreate {
    pub items: Vec<OrderItemRequest>,
    #[serde(default)]
    pub prescription_id: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<DeliveryAddress>,
    #[serde(default)]
    pub delivery_type: DeliveryType,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Staff status update payload (`PUT /api/orders/:id/status`)
#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
    /// 附加说明，写到订单备注上
    #[serde(default)]
    pub notes: Option<String>,
}

/// Assignment payload (`PUT /api/orders/:id/assign`)
#[derive(Debug, Clone, Deserialize)]
pub struct OrderAssign {
    pub agent_id: String,
}

#[cfg(test)]
mod tests {
    use super::OrderStatus::*;
    use super::*;

    const ALL: [OrderStatus; 7] = [
        Pending, Verified, Processing, Assigned, PickedUp, Delivered, Rejected,
    ];

    #[test]
    fn forward_chain_is_legal() {
        assert!(Pending.can_transition(Verified));
        assert!(Verified.can_transition(Processing));
        assert!(Processing.can_transition(Assigned));
        assert!(Assigned.can_transition(PickedUp));
        assert!(PickedUp.can_transition(Delivered));
    }

    #[test]
    fn backward_and_skip_are_illegal() {
        assert!(!Verified.can_transition(Pending));
        assert!(!Pending.can_transition(Processing));
        assert!(!Assigned.can_transition(Delivered));
        assert!(!Delivered.can_transition(PickedUp));
    }

    #[test]
    fn rejection_only_before_fulfillment() {
        assert!(Pending.can_transition(Rejected));
        assert!(Verified.can_transition(Rejected));
        assert!(Processing.can_transition(Rejected));
        assert!(!Assigned.can_transition(Rejected));
        assert!(!PickedUp.can_transition(Rejected));
        assert!(!Delivered.can_transition(Rejected));
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for to in ALL {
            assert!(!Delivered.can_transition(to), "delivered -> {to}");
            assert!(!Rejected.can_transition(to), "rejected -> {to}");
        }
    }

    #[test]
    fn no_self_transitions() {
        for s in ALL {
            assert!(!s.can_transition(s), "{s} -> {s}");
        }
    }

    #[test]
    fn sanitized_strips_otp() {
        let order = Order {
            id: None,
            order_id: "ORD-1-ABC".into(),
            user_id: "user:alice".parse().expect("record id"),
            prescription: None,
            items: vec![],
            total_amount: Decimal::ZERO,
            delivery_address: None,
            delivery_type: DeliveryType::Delivery,
            status: OrderStatus::Assigned,
            assigned_to: None,
            delivery_otp: Some("1234".into()),
            delivery_signature: None,
            notes: None,
            created_at: None,
            updated_at: None,
        };
        assert_eq!(order.sanitized().delivery_otp, None);
    }
}
