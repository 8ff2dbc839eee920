//! Order API Handlers
//!
//! Thin layer over [`OrderManager`]: extract the actor, parse the query,
//! delegate, return the projection. Mutations answer synchronously for the
//! state change itself; the asynchronous fan-out behind a transition is
//! invisible here.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::auth::CurrentActor;
use crate::core::AppState;
use crate::orders::{
    CancelOrderRequest, CreateOrderRequest, OrderListQuery, OrderPage, OrderView,
    UpdateStatusRequest,
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{ActorRole, OrderStatus};

/// Query params for listing orders
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub vendor_id: Option<String>,
    pub customer_id: Option<String>,
    pub rider_id: Option<String>,
    /// Single status or comma-separated set, e.g. `PENDING,CONFIRMED`
    pub status: Option<String>,
    /// created_at lower bound (unix millis)
    pub from: Option<i64>,
    /// created_at upper bound (unix millis)
    pub to: Option<i64>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

fn parse_statuses(raw: &str) -> AppResult<Vec<OrderStatus>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            serde_json::from_value::<OrderStatus>(serde_json::Value::String(s.to_string()))
                .map_err(|_| {
                    AppError::with_message(
                        ErrorCode::InvalidRequest,
                        format!("unknown order status: {}", s),
                    )
                })
        })
        .collect()
}

impl ListQuery {
    fn into_manager_query(self) -> AppResult<OrderListQuery> {
        let statuses = match &self.status {
            Some(raw) => Some(parse_statuses(raw)?),
            None => None,
        };
        Ok(OrderListQuery {
            vendor_id: self.vendor_id,
            customer_id: self.customer_id,
            rider_id: self.rider_id,
            statuses,
            created_from: self.from,
            created_to: self.to,
            page: self.page,
            limit: self.limit,
        })
    }
}

/// POST /orders - place an order (customers only)
pub async fn create(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<OrderView>> {
    if actor.role != ActorRole::Customer {
        return Err(AppError::with_message(
            ErrorCode::RoleRequired,
            "only customers may place orders",
        ));
    }
    let view = state.orders.create_order(&actor.id, &payload)?;
    Ok(Json(view))
}

/// GET /orders/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> AppResult<Json<OrderView>> {
    let view = state.orders.get_order(&id, &actor)?;
    Ok(Json(view))
}

/// PATCH /orders/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<OrderView>> {
    let view = state.orders.update_status(&id, &actor, &payload)?;
    Ok(Json(view))
}

/// PATCH /orders/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(payload): Json<CancelOrderRequest>,
) -> AppResult<Json<OrderView>> {
    let view = state.orders.cancel_order(&id, &actor, &payload)?;
    Ok(Json(view))
}

/// GET /orders - role-scoped listing
pub async fn list(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<OrderPage>> {
    let query = query.into_manager_query()?;
    let page = state.orders.list_orders(&actor, &query)?;
    Ok(Json(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_statuses_single_and_set() {
        assert_eq!(
            parse_statuses("PENDING").unwrap(),
            vec![OrderStatus::Pending]
        );
        assert_eq!(
            parse_statuses("READY_FOR_PICKUP, DELIVERED").unwrap(),
            vec![OrderStatus::ReadyForPickup, OrderStatus::Delivered]
        );
    }

    #[test]
    fn test_parse_statuses_rejects_garbage() {
        assert!(parse_statuses("SHIPPED").is_err());
    }
}
