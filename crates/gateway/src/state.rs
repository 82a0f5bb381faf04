// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::GatewayConfig;
use crate::hub::BroadcastHub;
use crate::registry::Registry;
use crate::upstream::client::build_http_client;
use crate::upstream::resolver::RobotResolver;

/// Shared gateway state.
pub struct GatewayState {
    pub registry: Arc<Registry>,
    pub hub: Arc<BroadcastHub>,
    pub resolver: RobotResolver,
    /// Shared client for forwarded robot commands.
    pub http: reqwest::Client,
    /// Identifier handed to robots on `/control/eventId`, fixed for the process lifetime.
    pub event_id: String,
    pub config: GatewayConfig,
    pub shutdown: CancellationToken,
}

impl GatewayState {
    pub fn new(config: GatewayConfig, shutdown: CancellationToken) -> anyhow::Result<Self> {
        let registry = Registry::new(config.registration_policy()?, config.short_id_collision()?);
        Ok(Self {
            registry: Arc::new(registry),
            hub: Arc::new(BroadcastHub::new(config.push_timeout())),
            resolver: RobotResolver::new(config.robot_url_template.clone()),
            http: build_http_client(config.forward_timeout())?,
            event_id: uuid::Uuid::new_v4().to_string(),
            config,
            shutdown,
        })
    }
}
