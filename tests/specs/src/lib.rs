// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end binary smoke tests.
//!
//! Spawns the real `robogate` binary as a subprocess and exercises it
//! over HTTP and WebSocket.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Once;
use std::time::Duration;

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls.
pub fn ensure_crypto() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Resolve the path to the compiled `robogate` binary.
pub fn robogate_binary() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // tests/specs → tests → workspace root
    let workspace = manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest);
    workspace.join("target").join("debug").join("robogate")
}

/// Find a free TCP port by binding to :0 then releasing.
pub fn free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// A running `robogate` process that is killed on drop.
pub struct GatewayProcess {
    child: Child,
    port: u16,
}

/// Builder for the flags a [`GatewayProcess`] is started with.
#[derive(Default)]
pub struct GatewayBuilder {
    args: Vec<String>,
}

impl GatewayBuilder {
    /// Let the first command for an unknown robot register it (`--registration auto`).
    pub fn auto_register(mut self) -> Self {
        self.args.extend(["--registration".into(), "auto".into()]);
        self
    }

    /// Set the dashboard broadcast period (`--broadcast-ms`).
    pub fn broadcast_ms(mut self, ms: u64) -> Self {
        self.args.extend(["--broadcast-ms".into(), ms.to_string()]);
        self
    }

    /// Set the robot URL template (`--robot-url-template`).
    pub fn robot_url_template(mut self, template: &str) -> Self {
        self.args.extend(["--robot-url-template".into(), template.to_owned()]);
        self
    }

    pub fn spawn(self) -> anyhow::Result<GatewayProcess> {
        ensure_crypto();
        let binary = robogate_binary();
        anyhow::ensure!(binary.exists(), "robogate binary not found at {}", binary.display());

        let port = free_port()?;
        let mut args: Vec<String> = vec![
            "--host".into(),
            "127.0.0.1".into(),
            "--port".into(),
            port.to_string(),
            "--log-format".into(),
            "text".into(),
            "--log-level".into(),
            "warn".into(),
        ];
        args.extend(self.args);

        let child = Command::new(&binary)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        Ok(GatewayProcess { child, port })
    }
}

impl GatewayProcess {
    /// Create a builder for custom flags.
    pub fn build() -> GatewayBuilder {
        GatewayBuilder::default()
    }

    /// Spawn robogate with default flags.
    pub fn start() -> anyhow::Result<Self> {
        Self::build().spawn()
    }

    /// Base URL for HTTP requests.
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Dashboard WebSocket URL for `client_id`.
    pub fn dashboard_url(&self, client_id: &str) -> String {
        format!("ws://127.0.0.1:{}/dashboard/{client_id}", self.port)
    }

    /// Poll health until responsive.
    pub async fn wait_healthy(&self, timeout: Duration) -> anyhow::Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        let client = reqwest::Client::new();
        let url = format!("{}/api/v1/health", self.base_url());
        loop {
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("robogate did not become healthy within {timeout:?}");
            }
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// Wait for the process to exit within `timeout`.
    pub async fn wait_exit(
        &mut self,
        timeout: Duration,
    ) -> anyhow::Result<std::process::ExitStatus> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("robogate did not exit within {timeout:?}");
            }
            if let Some(status) = self.child.try_wait()? {
                return Ok(status);
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// Send SIGTERM to the process.
    pub fn terminate(&self) -> anyhow::Result<()> {
        let status = Command::new("kill").arg("-TERM").arg(self.child.id().to_string()).status()?;
        anyhow::ensure!(status.success(), "kill -TERM failed");
        Ok(())
    }
}

impl Drop for GatewayProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Run robogate with `args` to completion and return its exit code.
pub fn exit_code_for(args: &[&str]) -> anyhow::Result<Option<i32>> {
    let binary = robogate_binary();
    anyhow::ensure!(binary.exists(), "robogate binary not found at {}", binary.display());
    let status = Command::new(&binary)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    Ok(status.code())
}
