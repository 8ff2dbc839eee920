//! Fulfillment server binary entrypoint

use fulfillment_server::core::{AppState, BackgroundTasks, Config, Server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    fulfillment_server::init_logger();
    fulfillment_server::print_banner();

    let config = Config::from_env();
    tracing::info!(
        http_port = config.http_port,
        work_dir = %config.work_dir,
        environment = %config.environment,
        "Starting fulfillment server"
    );

    let (state, channels) = AppState::initialize(&config)?;

    let mut tasks = BackgroundTasks::new();
    state.start_background_tasks(channels, &mut tasks);

    let server = Server::with_state(config, state);
    let result = server.run().await;

    tasks.shutdown().await;
    result
}
