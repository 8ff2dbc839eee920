//! Delivery dispatch - offering ready orders to the courier fleet

mod broadcaster;
mod geo;
mod queue;

pub use broadcaster::{DispatchBroadcaster, DispatchError, SweepReport};
pub use geo::haversine_km;
pub use queue::{DispatchQueue, EnqueueError};
