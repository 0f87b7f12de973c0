//! Billing Repository
//!
//! 账单由下单事务创建 (见 OrderRepository::place_order)，此处只读。

use super::{BaseRepository, RepoResult, parse_record_id};
use crate::db::models::Billing;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const USER_TABLE: &str = "user";

#[derive(Clone)]
pub struct BillingRepository {
    base: BaseRepository,
}

impl BillingRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find the billing record for a human-readable order id
    pub async fn find_by_order_id(&self, order_id: &str) -> RepoResult<Option<Billing>> {
        let order_id_owned = order_id.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM billing WHERE order_id = $order_id LIMIT 1")
            .bind(("order_id", order_id_owned))
            .await?;
        let billings: Vec<Billing> = result.take(0)?;
        Ok(billings.into_iter().next())
    }

    /// A customer's billing history, newest first
    pub async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<Billing>> {
        let user_thing = parse_record_id(USER_TABLE, user_id)?;
        let billings: Vec<Billing> = self
            .base
            .db()
            .query("SELECT * FROM billing WHERE user_id = $user ORDER BY created_at DESC")
            .bind(("user", user_thing))
            .await?
            .take(0)?;
        Ok(billings)
    }
}
