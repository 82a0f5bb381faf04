// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Robogate: control-plane gateway for a fleet of remote robots.

pub mod config;
pub mod error;
pub mod hub;
pub mod registry;
pub mod state;
pub mod transport;
pub mod upstream;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::GatewayConfig;
use crate::hub::{join_broadcaster, spawn_broadcaster};
use crate::state::GatewayState;
use crate::transport::build_router;

/// Run the gateway until shutdown.
pub async fn run(config: GatewayConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let shutdown = CancellationToken::new();
    let state = Arc::new(GatewayState::new(config, shutdown.clone())?);

    spawn_signal_handler(shutdown.clone());

    let broadcaster = spawn_broadcaster(
        Arc::clone(&state.hub),
        Arc::clone(&state.registry),
        state.config.broadcast_interval(),
        shutdown.clone(),
    );

    let listener = TcpListener::bind(&addr).await?;
    info!(
        registration = %state.registry.policy(),
        short_id_collision = %state.registry.collision(),
        "robogate listening on {}",
        listener.local_addr()?
    );

    let router = build_router(Arc::clone(&state));
    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await;

    // Stop the broadcaster even if the server exited on its own.
    shutdown.cancel();
    join_broadcaster(broadcaster).await;
    served?;

    info!("robogate stopped");
    Ok(())
}

fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).ok();
        let mut sigint =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()).ok();

        tokio::select! {
            _ = async {
                if let Some(ref mut s) = sigterm { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGTERM");
                shutdown.cancel();
            }
            _ = async {
                if let Some(ref mut s) = sigint { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGINT");
                shutdown.cancel();
            }
            _ = shutdown.cancelled() => {}
        }
    });
}
