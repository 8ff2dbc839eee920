//! Order API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /orders | POST | 下单 |
//! | /orders | GET | 角色过滤的订单列表 |
//! | /orders/{id} | GET | 订单详情 |
//! | /orders/{id}/status | PATCH | 状态流转 |
//! | /orders/{id}/cancel | PATCH | 取消订单 |

mod handler;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::core::AppState;

/// Order router (nested under /orders)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", patch(handler::update_status))
        .route("/{id}/cancel", patch(handler::cancel))
}
