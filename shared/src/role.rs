//! User roles
//!
//! Roles are a closed enumeration so authorization checks stay exhaustive.
//! The wire representation is the snake_case string used in JWT claims and
//! user records ("customer", "pharmacist", "admin", "delivery_agent").

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Browses the catalog, uploads prescriptions, places orders
    Customer,
    /// Verifies prescriptions, manages orders and inventory
    Pharmacist,
    /// Everything a pharmacist can do, plus user management
    Admin,
    /// Fulfills assigned deliveries with OTP proof of handoff
    DeliveryAgent,
}

impl Role {
    /// The wire string for this role
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Pharmacist => "pharmacist",
            Role::Admin => "admin",
            Role::DeliveryAgent => "delivery_agent",
        }
    }

    /// Pharmacist-level access (pharmacist or admin)
    pub const fn is_pharmacy_staff(&self) -> bool {
        matches!(self, Role::Pharmacist | Role::Admin)
    }

    /// All roles, for seeding and validation
    pub const ALL: [Role; 4] = [
        Role::Customer,
        Role::Pharmacist,
        Role::Admin,
        Role::DeliveryAgent,
    ];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized role strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "pharmacist" => Ok(Role::Pharmacist),
            "admin" => Ok(Role::Admin),
            "delivery_agent" => Ok(Role::DeliveryAgent),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_wire_strings() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn staff_check_is_exhaustive() {
        assert!(Role::Pharmacist.is_pharmacy_staff());
        assert!(Role::Admin.is_pharmacy_staff());
        assert!(!Role::Customer.is_pharmacy_staff());
        assert!(!Role::DeliveryAgent.is_pharmacy_staff());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Role::DeliveryAgent).unwrap();
        assert_eq!(json, "\"delivery_agent\"");
        let back: Role = serde_json::from_str("\"pharmacist\"").unwrap();
        assert_eq!(back, Role::Pharmacist);
    }
}
