//! Catalog read model - vendors and menu items
//!
//! Catalog CRUD is owned by a separate service; this module keeps the
//! read-side cache the fulfillment core consults for pricing and dispatch.

mod service;

pub use service::CatalogService;
