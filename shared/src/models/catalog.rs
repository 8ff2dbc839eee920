//! Catalog read model - vendor and menu records consumed by pricing and
//! dispatch
//!
//! Catalog CRUD lives in a separate service; the fulfillment core only ever
//! reads these records.

use super::order::GeoPoint;
use serde::{Deserialize, Serialize};

/// Vendor record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: String,
    pub name: String,
    /// Inactive vendors reject new orders
    pub active: bool,
    /// Registered pickup address (free text)
    pub address: String,
    pub location: GeoPoint,
}

/// Add-on attached to a menu item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOn {
    pub id: String,
    pub name: String,
    /// Unit price in cents
    pub price: i64,
    /// Required add-ons must appear in every selection with quantity ≥ 1
    pub required: bool,
    pub max_quantity: i32,
}

/// Menu item record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub vendor_id: String,
    pub name: String,
    /// Unit price in cents
    pub price: i64,
    pub available: bool,
    #[serde(default)]
    pub add_ons: Vec<AddOn>,
}

impl MenuItem {
    /// Look up an add-on belonging to this item
    pub fn add_on(&self, add_on_id: &str) -> Option<&AddOn> {
        self.add_ons.iter().find(|a| a.id == add_on_id)
    }
}
