//! Server Implementation
//!
//! HTTP 服务器启动和管理

use crate::api;
use crate::core::{AppState, Config};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// HTTP Server
pub struct Server {
    config: Config,
    state: AppState,
}

impl Server {
    /// Create server with existing state
    pub fn with_state(config: Config, state: AppState) -> Self {
        Self { config, state }
    }

    /// Build the axum router
    pub fn router(state: AppState) -> axum::Router {
        axum::Router::new()
            .nest("/orders", api::orders::router())
            .nest("/riders", api::riders::router())
            .merge(api::health::router())
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Bind and serve until ctrl-c
    pub async fn run(self) -> anyhow::Result<()> {
        let app = Self::router(self.state);

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Fulfillment server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
            })
            .await?;

        Ok(())
    }
}
