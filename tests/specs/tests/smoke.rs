// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end smoke tests that spawn the real `robogate` binary and exercise
//! its HTTP and dashboard WebSocket surfaces.

use std::time::Duration;

use futures_util::StreamExt;
use tokio_tungstenite::tungstenite::Message;

use robogate_specs::{exit_code_for, free_port, GatewayProcess};

const TIMEOUT: Duration = Duration::from_secs(10);

// -- HTTP ---------------------------------------------------------------------

#[tokio::test]
async fn http_health() -> anyhow::Result<()> {
    let gw = GatewayProcess::start()?;
    gw.wait_healthy(TIMEOUT).await?;

    let resp: serde_json::Value =
        reqwest::get(format!("{}/api/v1/health", gw.base_url())).await?.json().await?;

    assert_eq!(resp["status"], "running");
    assert_eq!(resp["robot_count"], 0);
    assert_eq!(resp["observer_count"], 0);
    Ok(())
}

#[tokio::test]
async fn event_id_registers_robot() -> anyhow::Result<()> {
    let gw = GatewayProcess::start()?;
    gw.wait_healthy(TIMEOUT).await?;

    let client = reqwest::Client::new();
    let url = format!("{}/control/eventId", gw.base_url());
    let first =
        client.get(format!("{url}?robot_name=10.1.2.3")).send().await?.text().await?;
    let second = client.get(&url).send().await?.text().await?;
    assert_eq!(first, second);
    assert_eq!(first.len(), 36);

    let robots: serde_json::Value =
        client.get(format!("{}/api/v1/robots", gw.base_url())).send().await?.json().await?;
    assert_eq!(robots[0]["name"], "10.1.2.3");

    let toggled: serde_json::Value = client
        .post(format!("{}/api/v1/robots/10123/disconnect", gw.base_url()))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(toggled["disconnected"], true);
    Ok(())
}

#[tokio::test]
async fn unreachable_robot_reports_bad_gateway() -> anyhow::Result<()> {
    let dead = free_port()?;
    let gw = GatewayProcess::build()
        .auto_register()
        .robot_url_template(&format!("http://127.0.0.1:{dead}/{{name}}"))
        .spawn()?;
    gw.wait_healthy(TIMEOUT).await?;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/robot/forward/3?user_key=bot.1", gw.base_url()))
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 502);

    let robots: serde_json::Value =
        client.get(format!("{}/api/v1/robots", gw.base_url())).send().await?.json().await?;
    assert_eq!(robots[0]["name"], "bot.1");
    assert_eq!(robots[0]["operation_count"], 1);
    assert_eq!(robots[0]["reachable"], false);
    Ok(())
}

// -- Dashboard WebSocket ------------------------------------------------------

#[tokio::test]
async fn dashboard_receives_periodic_snapshots() -> anyhow::Result<()> {
    let gw = GatewayProcess::build().broadcast_ms(100).spawn()?;
    gw.wait_healthy(TIMEOUT).await?;

    reqwest::Client::new()
        .post(format!("{}/api/v1/robots", gw.base_url()))
        .json(&serde_json::json!({ "name": "robot.a" }))
        .send()
        .await?;

    let (mut ws, _) = tokio_tungstenite::connect_async(gw.dashboard_url("smoke")).await?;

    // Initial snapshot plus at least two ticks.
    let mut frames = 0;
    while frames < 3 {
        let msg = tokio::time::timeout(TIMEOUT, ws.next())
            .await?
            .ok_or_else(|| anyhow::anyhow!("dashboard closed"))??;
        if let Message::Text(text) = msg {
            let robots: serde_json::Value = serde_json::from_str(text.as_str())?;
            assert_eq!(robots[0]["name"], "robot.a");
            frames += 1;
        }
    }
    Ok(())
}

// -- Lifecycle ----------------------------------------------------------------

#[tokio::test]
async fn sigterm_shuts_down_cleanly() -> anyhow::Result<()> {
    let mut gw = GatewayProcess::start()?;
    gw.wait_healthy(TIMEOUT).await?;

    gw.terminate()?;
    let status = gw.wait_exit(TIMEOUT).await?;
    assert!(status.success(), "exit status: {status}");
    Ok(())
}

#[tokio::test]
async fn invalid_config_exits_2() -> anyhow::Result<()> {
    let code = exit_code_for(&["--registration", "sometimes"])?;
    assert_eq!(code, Some(2));
    Ok(())
}
