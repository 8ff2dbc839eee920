//! Rider API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /riders/{id} | PUT | 录入/更新骑手档案 (admin) |
//! | /riders/{id}/presence | PATCH | 上下线与位置上报 |

mod handler;

use axum::{
    routing::{patch, put},
    Router,
};

use crate::core::AppState;

/// Rider router (nested under /riders)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", put(handler::upsert))
        .route("/{id}/presence", patch(handler::update_presence))
}
