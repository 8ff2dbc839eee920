//! Push channel naming
//!
//! One channel per scope; names are stable wire identifiers, so clients can
//! subscribe by string without sharing this enum.

use std::fmt;

/// A push channel scope
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Per-order room; all observers of one order
    Order(String),
    /// A vendor's device channel
    Vendor(String),
    /// A vendor's order-list channel (list screens, badge counts)
    VendorOrders(String),
    /// A customer's device channel
    Customer(String),
    /// Broadcast group reaching the whole courier fleet
    Couriers,
}

impl Channel {
    /// Wire name of the channel
    pub fn name(&self) -> String {
        match self {
            Channel::Order(id) => format!("order:{}", id),
            Channel::Vendor(id) => format!("vendor:{}", id),
            Channel::VendorOrders(id) => format!("vendor_orders:{}", id),
            Channel::Customer(id) => format!("customer:{}", id),
            Channel::Couriers => "couriers".to_string(),
        }
    }

    pub fn order(id: impl Into<String>) -> Self {
        Channel::Order(id.into())
    }

    pub fn vendor(id: impl Into<String>) -> Self {
        Channel::Vendor(id.into())
    }

    pub fn vendor_orders(id: impl Into<String>) -> Self {
        Channel::VendorOrders(id.into())
    }

    pub fn customer(id: impl Into<String>) -> Self {
        Channel::Customer(id.into())
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names() {
        assert_eq!(Channel::order("o-1").name(), "order:o-1");
        assert_eq!(Channel::vendor_orders("v-1").name(), "vendor_orders:v-1");
        assert_eq!(Channel::Couriers.name(), "couriers");
    }
}
