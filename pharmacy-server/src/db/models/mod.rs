//! Database Models

// Serde helpers
pub mod serde_helpers;

// Auth
pub mod user;

// Catalog
pub mod medicine;

// Prescriptions
pub mod prescription;

// Orders
pub mod billing;
pub mod order;

// Inventory
pub mod inventory;

// Re-exports
pub use billing::{Billing, BillingId, PaymentStatus, TAX_RATE};
pub use inventory::{
    DEFAULT_REORDER_LEVEL, Inventory, InventoryCreate, InventoryId, InventoryUpdate,
    InventoryWithMedicine,
};
pub use medicine::{Medicine, MedicineCategory, MedicineCreate, MedicineId, MedicineQuery, MedicineUpdate};
pub use order::{
    DeliveryAddress, DeliveryType, Order, OrderAssign, OrderCreate, OrderItem, OrderItemRequest,
    OrderRecordId, OrderStatus, OrderStatusUpdate,
};
pub use prescription::{Prescription, PrescriptionId, PrescriptionStatus, PrescriptionVerify};
pub use user::{User, UserCreate, UserId};
