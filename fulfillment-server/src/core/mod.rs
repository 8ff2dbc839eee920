//! 核心模块 - 配置、状态、服务器、后台任务

pub mod config;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use server::Server;
pub use state::{AppState, ServiceChannels};
pub use tasks::{BackgroundTasks, TaskKind};
