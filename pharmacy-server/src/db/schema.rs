//! Startup schema definition
//!
//! SurrealDB tables are schemaless by default; the statements here only pin
//! down the uniqueness constraints the application relies on. `DEFINE ... IF
//! NOT EXISTS` keeps re-application on every boot idempotent.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Schema statements applied on every startup
const SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
DEFINE INDEX IF NOT EXISTS user_username ON TABLE user COLUMNS username UNIQUE;

DEFINE TABLE IF NOT EXISTS medicine SCHEMALESS;
DEFINE INDEX IF NOT EXISTS medicine_name ON TABLE medicine COLUMNS name;

DEFINE TABLE IF NOT EXISTS prescription SCHEMALESS;
DEFINE INDEX IF NOT EXISTS prescription_user ON TABLE prescription COLUMNS user_id;

DEFINE TABLE IF NOT EXISTS order SCHEMALESS;
DEFINE INDEX IF NOT EXISTS order_order_id ON TABLE order COLUMNS order_id UNIQUE;
DEFINE INDEX IF NOT EXISTS order_user ON TABLE order COLUMNS user_id;

DEFINE TABLE IF NOT EXISTS billing SCHEMALESS;
DEFINE INDEX IF NOT EXISTS billing_order ON TABLE billing COLUMNS order_id UNIQUE;

DEFINE TABLE IF NOT EXISTS inventory SCHEMALESS;
DEFINE INDEX IF NOT EXISTS inventory_medicine ON TABLE inventory COLUMNS medicine;
"#;

/// Apply the schema statements
pub async fn apply(db: &Surreal<Db>) -> Result<(), surrealdb::Error> {
    db.query(SCHEMA).await?.check()?;
    Ok(())
}
