//! Pelican shared types - 服务端与客户端共享的数据模型
//!
//! # 模块结构
//!
//! - **错误** (`error`): 统一错误码与 API 响应结构
//! - **模型** (`models`): 订单、角色、骑手、目录读模型
//! - **实时** (`realtime`): 推送通道命名与线上事件载荷
//! - **派单** (`dispatch`): DeliveryJob 派单任务
//! - **通知** (`notification`): 延迟投递的通知信封

pub mod dispatch;
pub mod error;
pub mod models;
pub mod notification;
pub mod realtime;
pub mod util;

pub use dispatch::DeliveryJob;
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use models::{
    Actor, ActorRole, AddOnSelection, GeoPoint, Order, OrderItem, OrderStatus, Pricing,
    RiderProfile,
};
pub use notification::{NotificationPriority, NotificationTarget, OutboundNotification};
pub use realtime::{Channel, PushEvent};
