//! Pelican Fulfillment Server - 外卖市场履约核心
//!
//! # 架构概述
//!
//! 本模块是订单履约核心的主入口，提供以下核心功能：
//!
//! - **订单生命周期** (`orders`): 角色门控状态机 + redb 存储
//! - **定价** (`pricing`): 纯函数订单计价
//! - **派单** (`dispatch`): DeliveryJob 构建、入队与补扫
//! - **实时推送** (`realtime`): 主题通道的 fire-and-forget 推送
//! - **通知** (`notify`): 延迟感知的通知投递
//! - **HTTP API** (`api`): RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! fulfillment-server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── auth/          # 网关注入的身份提取
//! ├── api/           # HTTP 路由和处理器
//! ├── catalog/       # 商户/菜单读模型
//! ├── pricing/       # 订单计价
//! ├── orders/        # 订单生命周期
//! ├── dispatch/      # 派单广播
//! ├── realtime/      # 实时推送
//! ├── notify/        # 通知服务
//! └── utils/         # 日志等工具
//! ```

pub mod api;
pub mod auth;
pub mod catalog;
pub mod core;
pub mod dispatch;
pub mod notify;
pub mod orders;
pub mod pricing;
pub mod realtime;
pub mod utils;

// Re-export 公共类型
pub use auth::CurrentActor;
pub use catalog::CatalogService;
pub use crate::core::{AppState, BackgroundTasks, Config, Server};
pub use dispatch::{DispatchBroadcaster, DispatchQueue, SweepReport};
pub use notify::NotificationService;
pub use orders::{OrderManager, OrderStorage};
pub use realtime::RealtimeHub;
pub use utils::{AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
    ____       ___
   / __ \___  / (_)________ _____
  / /_/ / _ \/ / / ___/ __ `/ __ \
 / ____/  __/ / / /__/ /_/ / / / /
/_/    \___/_/_/\___/\__,_/_/ /_/
    ______      ______ ____
   / ____/_  __/ / __(_) / /___ ___  ___  ____  / /_
  / /_  / / / / / /_/ / / / __ `__ \/ _ \/ __ \/ __/
 / __/ / /_/ / / __/ / / / / / / / /  __/ / / / /_
/_/    \__,_/_/_/ /_/_/_/_/ /_/ /_/\___/_/ /_/\__/
    "#
    );
}
