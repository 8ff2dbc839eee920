//! Actor roles - who is calling the API

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of the acting principal, as established by the upstream gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Customer,
    Vendor,
    Rider,
    Admin,
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorRole::Customer => write!(f, "customer"),
            ActorRole::Vendor => write!(f, "vendor"),
            ActorRole::Rider => write!(f, "rider"),
            ActorRole::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for ActorRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "customer" => Ok(ActorRole::Customer),
            "vendor" => Ok(ActorRole::Vendor),
            "rider" => Ok(ActorRole::Rider),
            "admin" => Ok(ActorRole::Admin),
            _ => Err(()),
        }
    }
}

/// The acting principal: id + role
///
/// For vendors `id` is the vendor id; for riders the rider id; for
/// customers the customer id. Ownership checks compare these against the
/// corresponding order fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: ActorRole) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn customer(id: impl Into<String>) -> Self {
        Self::new(id, ActorRole::Customer)
    }

    pub fn vendor(id: impl Into<String>) -> Self {
        Self::new(id, ActorRole::Vendor)
    }

    pub fn rider(id: impl Into<String>) -> Self {
        Self::new(id, ActorRole::Rider)
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self::new(id, ActorRole::Admin)
    }
}
