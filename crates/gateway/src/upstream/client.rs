// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for communicating with a single robot.

use std::sync::Once;
use std::time::Duration;

use reqwest::Client;

use crate::upstream::command::Command;

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls.
/// Only the first call has effect.
pub fn ensure_crypto() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Build the shared HTTP client used for every forwarded command.
pub fn build_http_client(timeout: Duration) -> anyhow::Result<Client> {
    ensure_crypto();
    Ok(Client::builder().timeout(timeout).build()?)
}

/// HTTP client wrapper for one robot.
pub struct RobotClient {
    base_url: String,
    client: Client,
}

impl RobotClient {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { base_url, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Forward `command` and return the robot's response body.
    pub async fn send(&self, command: &Command) -> anyhow::Result<String> {
        let req = self.client.request(command.method(), self.url(&command.path()));
        let resp = req.send().await?.error_for_status()?;
        Ok(resp.text().await?)
    }
}
