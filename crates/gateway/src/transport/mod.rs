// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP + WebSocket transport for the gateway.

pub mod http;
pub mod ws;

use std::sync::Arc;

use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::GatewayState;

/// Embedded fleet dashboard HTML.
const DASHBOARD_HTML: &str = include_str!("../web/dashboard.html");

/// Build the axum `Router` with all gateway routes.
pub fn build_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        // Health
        .route("/api/v1/health", get(http::health))
        // Fleet management
        .route("/api/v1/robots", get(http::list_robots).post(http::register_robot))
        .route("/api/v1/robots/{short_id}", get(http::get_robot))
        .route("/api/v1/robots/{short_id}/disconnect", post(http::toggle_robot))
        // Robot-facing registration
        .route("/control/eventId", get(http::event_id))
        // Client commands
        .route("/robot/status", get(http::robot_status))
        .route("/robot/{command}", get(http::robot_query))
        .route("/robot/{command}/{arg}", post(http::robot_motion))
        // Dashboard
        .route("/dashboard/{client_id}", get(ws::dashboard_ws))
        .route("/", get(|| async { Html(DASHBOARD_HTML) }))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
