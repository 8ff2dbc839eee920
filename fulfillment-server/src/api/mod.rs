//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 订单生命周期接口
//! - [`riders`] - 骑手档案与在线状态

pub mod health;
pub mod orders;
pub mod riders;

// Re-export common types for handlers
pub use shared::error::{AppError, AppResult};
