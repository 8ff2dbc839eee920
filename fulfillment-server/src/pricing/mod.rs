//! Order pricing - pure total computation from items and catalog records

mod calculator;

pub use calculator::{
    price_order, AddOnRequest, OrderItemRequest, PricedOrder, PricingError, DELIVERY_FEE_CENTS,
};
