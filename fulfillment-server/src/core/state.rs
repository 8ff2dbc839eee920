//! 服务器状态 - 持有所有服务的单例引用
//!
//! AppState 是履约核心的根数据结构：所有服务在启动时显式构造一次，
//! 通过 Arc 浅拷贝共享，不存在任何模块级全局状态。

use std::sync::Arc;
use std::time::Duration;

use shared::dispatch::DeliveryJob;
use shared::notification::OutboundNotification;
use tokio::sync::mpsc;

use crate::catalog::CatalogService;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::Config;
use crate::dispatch::{DispatchBroadcaster, DispatchQueue};
use crate::notify::{run_notification_worker, NotificationService};
use crate::orders::{OrderManager, OrderStorage, StorageResult};
use crate::realtime::RealtimeHub;

/// Receivers handed to the background workers at startup
pub struct ServiceChannels {
    /// Notification envelopes awaiting delivery
    pub notifications: mpsc::Receiver<OutboundNotification>,
    /// Delivery jobs awaiting courier matching
    pub delivery_jobs: mpsc::Receiver<DeliveryJob>,
}

/// 服务器状态
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | storage | redb 订单/骑手存储 |
/// | catalog | 目录读模型 |
/// | hub | 实时推送 |
/// | dispatcher | 派单广播器 |
/// | notifier | 通知服务 |
/// | orders | 订单生命周期管理器 |
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub storage: OrderStorage,
    pub catalog: Arc<CatalogService>,
    pub hub: RealtimeHub,
    pub dispatcher: DispatchBroadcaster,
    pub notifier: NotificationService,
    pub orders: OrderManager,
}

impl AppState {
    /// 初始化所有服务
    ///
    /// 返回状态以及需要交给后台任务的消费端通道。
    pub fn initialize(config: &Config) -> StorageResult<(Self, ServiceChannels)> {
        std::fs::create_dir_all(&config.work_dir).ok();
        let storage = OrderStorage::open(config.database_path())?;
        Ok(Self::with_storage(config, storage))
    }

    /// 使用内存存储初始化（测试与演示场景）
    pub fn initialize_in_memory(config: &Config) -> StorageResult<(Self, ServiceChannels)> {
        let storage = OrderStorage::open_in_memory()?;
        Ok(Self::with_storage(config, storage))
    }

    fn with_storage(config: &Config, storage: OrderStorage) -> (Self, ServiceChannels) {
        let catalog = Arc::new(CatalogService::new());
        let hub = RealtimeHub::new();
        let (queue, delivery_jobs) = DispatchQueue::new(config.dispatch_queue_capacity);
        let (notifier, notifications) = NotificationService::new(config.notify_queue_capacity);

        let dispatcher = DispatchBroadcaster::new(
            storage.clone(),
            catalog.clone(),
            queue,
            hub.clone(),
            Duration::from_millis(config.dispatch_throttle_ms),
        );

        let orders = OrderManager::new(
            storage.clone(),
            catalog.clone(),
            hub.clone(),
            dispatcher.clone(),
            notifier.clone(),
        );

        let state = Self {
            config: config.clone(),
            storage,
            catalog,
            hub,
            dispatcher,
            notifier,
            orders,
        };
        let channels = ServiceChannels {
            notifications,
            delivery_jobs,
        };
        (state, channels)
    }

    /// 启动后台任务
    ///
    /// 必须在 `Server::run()` 之前调用。
    ///
    /// 启动的任务：
    /// - 通知投递 worker（遵守信封上的 delay_ms）
    /// - 派单消费者占位（真实的骑手匹配策略属于队列消费方）
    /// - 定时补扫（重新广播无人认领的 READY_FOR_PICKUP 订单）
    pub fn start_background_tasks(&self, channels: ServiceChannels, tasks: &mut BackgroundTasks) {
        let ServiceChannels {
            notifications,
            mut delivery_jobs,
        } = channels;

        let shutdown = tasks.shutdown_token();
        tasks.spawn(
            "notification_worker",
            TaskKind::Worker,
            run_notification_worker(notifications, shutdown),
        );

        // Courier-matching policy plug point: this deployment only logs the
        // job; a real consumer replaces this worker
        let shutdown = tasks.shutdown_token();
        tasks.spawn("dispatch_consumer", TaskKind::Worker, async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    job = delivery_jobs.recv() => match job {
                        Some(job) => {
                            tracing::info!(
                                order_id = %job.order_id,
                                order_number = %job.order_number,
                                distance_km = format!("{:.2}", job.distance_km),
                                expires_at = job.expires_at,
                                "Delivery job awaiting courier match"
                            );
                        }
                        None => break,
                    },
                }
            }
        });

        let dispatcher = self.dispatcher.clone();
        let interval = Duration::from_secs(self.config.sweep_interval_secs);
        let shutdown = tasks.shutdown_token();
        tasks.spawn("backlog_sweep", TaskKind::Periodic, async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {
                        let report = dispatcher.sweep_backlog().await;
                        if report.found > 0 {
                            tracing::info!(
                                found = report.found,
                                broadcast = report.broadcast,
                                failed = report.errors.len(),
                                "Periodic backlog sweep"
                            );
                        }
                    }
                }
            }
        });

        tracing::info!(count = tasks.len(), "Background tasks started");
    }
}
