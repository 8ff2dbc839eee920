/// 服务器配置 - 履约核心的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/pelican/fulfillment | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | DISPATCH_THROTTLE_MS | 500 | 补扫播单间隔(毫秒) |
/// | SWEEP_INTERVAL_SECS | 60 | 定时补扫周期(秒) |
/// | DISPATCH_QUEUE_CAPACITY | 1024 | 派单队列容量 |
/// | NOTIFY_QUEUE_CAPACITY | 1024 | 通知队列容量 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/pelican HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库与日志文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 补扫时相邻两次播单之间的节流间隔（毫秒）
    pub dispatch_throttle_ms: u64,
    /// 定时补扫周期（秒）
    pub sweep_interval_secs: u64,
    /// 派单队列容量
    pub dispatch_queue_capacity: usize,
    /// 通知队列容量
    pub notify_queue_capacity: usize,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/pelican/fulfillment".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            dispatch_throttle_ms: std::env::var("DISPATCH_THROTTLE_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(500),
            sweep_interval_secs: std::env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(60),
            dispatch_queue_capacity: std::env::var("DISPATCH_QUEUE_CAPACITY")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1024),
            notify_queue_capacity: std::env::var("NOTIFY_QUEUE_CAPACITY")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1024),
        }
    }

    /// 数据库文件路径
    pub fn database_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("orders.redb")
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
