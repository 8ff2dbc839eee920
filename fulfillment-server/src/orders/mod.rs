//! Order lifecycle - manager, transition rules, storage, projection

pub mod manager;
pub mod projection;
pub mod storage;
pub mod transitions;

pub use manager::{
    CancelOrderRequest, CreateOrderRequest, OrderListQuery, OrderManager, UpdateStatusRequest,
};
pub use projection::hydrate_order;
pub use shared::models::{OrderPage, OrderView, VendorSummary};
pub use storage::{OrderFilter, OrderStorage, StorageError, StorageResult};
