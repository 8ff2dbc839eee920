//! Domain models shared between server and clients

mod catalog;
mod order;
mod rider;
mod role;
mod view;

pub use catalog::{AddOn, MenuItem, Vendor};
pub use order::{
    AddOnSelection, DeliveryAddress, GeoPoint, Order, OrderItem, OrderStatus, Pricing,
};
pub use rider::{RiderContact, RiderProfile, VehicleType};
pub use role::{Actor, ActorRole};
pub use view::{OrderPage, OrderView, VendorSummary};
