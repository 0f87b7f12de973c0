//! Billing Model
//!
//! 账单与订单同一事务创建，金额关系固定：tax = amount × 0.18，total = amount + tax。

use super::serde_helpers;
use super::user::UserId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Billing ID type
pub type BillingId = RecordId;

/// GST rate applied to every order
pub const TAX_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2); // 0.18

/// Settlement status (settlement itself is out of scope; records stay pending)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

/// Billing record, one per order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Billing {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<BillingId>,
    /// Human-readable order id (unique across billing)
    pub order_id: String,
    #[serde(with = "serde_helpers::record_id")]
    pub user_id: UserId,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Billing {
    /// Compute tax and total for an order amount
    pub fn compute(amount: Decimal) -> (Decimal, Decimal) {
        let tax = amount * TAX_RATE;
        (tax, amount + tax)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn tax_is_eighteen_percent() {
        let (tax, total) = Billing::compute(dec!(100));
        assert_eq!(tax, dec!(18.00));
        assert_eq!(total, dec!(118.00));
    }

    #[test]
    fn no_float_drift() {
        // 0.1 + 0.2 style amounts stay exact under Decimal
        let (tax, total) = Billing::compute(dec!(19.99));
        assert_eq!(tax, dec!(3.5982));
        assert_eq!(total, dec!(23.5882));
    }
}
