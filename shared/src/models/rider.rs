//! Rider model - availability state owned by the persistence layer

use super::order::GeoPoint;
use serde::{Deserialize, Serialize};

/// Vehicle type, shown to customers after assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Bicycle,
    Motorbike,
    Car,
}

/// Rider record: contact info plus the dispatch availability flags
///
/// `available == false` while the rider has an active job. Only riders with
/// `online && available && location.is_some()` count toward the dispatch
/// availability probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiderProfile {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub vehicle_type: VehicleType,
    pub online: bool,
    pub available: bool,
    /// Last reported location, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    pub updated_at: i64,
}

impl RiderProfile {
    /// Dispatchable = online, free, and with a known location
    pub fn is_dispatchable(&self) -> bool {
        self.online && self.available && self.location.is_some()
    }

    /// Contact projection pushed to the customer on assignment
    pub fn contact(&self) -> RiderContact {
        RiderContact {
            id: self.id.clone(),
            name: self.name.clone(),
            phone: self.phone.clone(),
            vehicle_type: self.vehicle_type,
            location: self.location,
        }
    }
}

/// Rider contact details included in `rider_assigned` pushes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiderContact {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub vehicle_type: VehicleType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}
