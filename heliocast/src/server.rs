//! Server lifecycle management
//!
//! Mounts one stream pipeline per configured product and runs the HTTP
//! server until a shutdown signal arrives.

use std::net::SocketAddr;

use tracing::{error, info};

use heliocast_core::{Config, StreamPipeline};

use crate::http;

/// Heliocast server - owns the configuration and the mounted pipelines
pub struct HeliocastServer {
    config: Config,
}

impl HeliocastServer {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Start the HTTP server and wait for a shutdown signal
    pub async fn start(self) -> anyhow::Result<()> {
        let pipelines: Vec<StreamPipeline> = self
            .config
            .products
            .products
            .iter()
            .map(|product| {
                StreamPipeline::new(
                    product.clone(),
                    self.config.upstream.clone(),
                    self.config.stream.clone(),
                )
            })
            .collect();

        for pipeline in &pipelines {
            info!(
                slug = %pipeline.slug(),
                label = %pipeline.label(),
                "stream pipeline mounted"
            );
        }

        let router = http::create_router(pipelines);

        let http_address = self.config.http_address();
        let addr: SocketAddr = http_address
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid HTTP address '{http_address}': {e}"))?;

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("HTTP server listening on {}", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("HTTP server shut down gracefully");
        Ok(())
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT/Ctrl+C)
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C signal");
            }
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                info!("Received SIGTERM signal");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
