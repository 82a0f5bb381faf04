// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the gateway.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::state::GatewayState;
use crate::upstream::command::Command;
use crate::upstream::dispatch::{dispatch, DispatchFailure};

// -- Request/Response types ---------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub robot_count: usize,
    pub observer_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub name: String,
    pub registered: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub short_id: String,
    pub name: String,
    pub disconnected: bool,
}

#[derive(Debug, Deserialize)]
pub struct EventIdQuery {
    pub robot_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommandQuery {
    pub user_key: Option<String>,
}

// -- Handlers -----------------------------------------------------------------

/// `GET /api/v1/health`
pub async fn health(State(s): State<Arc<GatewayState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "running".to_owned(),
        robot_count: s.registry.len(),
        observer_count: s.hub.observer_count(),
    })
}

/// `GET /api/v1/robots`: the same snapshot the dashboard receives.
pub async fn list_robots(State(s): State<Arc<GatewayState>>) -> impl IntoResponse {
    Json(s.registry.snapshot())
}

/// `POST /api/v1/robots`: explicit registration.
pub async fn register_robot(
    State(s): State<Arc<GatewayState>>,
    Json(req): Json<RegisterRequest>,
) -> impl IntoResponse {
    if req.name.trim().is_empty() {
        return GatewayError::BadRequest.to_http_response("name must not be empty").into_response();
    }
    let registered = s.registry.register(&req.name);
    Json(RegisterResponse { name: req.name, registered }).into_response()
}

/// `GET /api/v1/robots/{short_id}`
pub async fn get_robot(
    State(s): State<Arc<GatewayState>>,
    Path(short_id): Path<String>,
) -> impl IntoResponse {
    match s.registry.find_by_short_id(&short_id) {
        Ok(robot) => Json(robot).into_response(),
        Err(code) => code.to_http_response(lookup_message(code, &short_id)).into_response(),
    }
}

/// `POST /api/v1/robots/{short_id}/disconnect`: flip the operator flag.
pub async fn toggle_robot(
    State(s): State<Arc<GatewayState>>,
    Path(short_id): Path<String>,
) -> impl IntoResponse {
    match s.registry.toggle_by_short_id(&short_id) {
        Ok(robot) => {
            let disconnected = robot.is_disconnected();
            Json(ToggleResponse { short_id, name: robot.name, disconnected }).into_response()
        }
        Err(code) => code.to_http_response(lookup_message(code, &short_id)).into_response(),
    }
}

/// `GET /control/eventId?robot_name=`: returns the process event id and
/// registers the robot when a name is supplied.
pub async fn event_id(
    State(s): State<Arc<GatewayState>>,
    Query(query): Query<EventIdQuery>,
) -> impl IntoResponse {
    if let Some(name) = query.robot_name.as_deref().filter(|n| !n.trim().is_empty()) {
        s.registry.register(name);
    }
    s.event_id.clone()
}

/// `GET /robot/status`: local liveness, nothing is forwarded.
pub async fn robot_status() -> &'static str {
    "OK"
}

/// `GET /robot/{command}?user_key=`: argument-less commands.
pub async fn robot_query(
    State(s): State<Arc<GatewayState>>,
    Path(command): Path<String>,
    Query(query): Query<CommandQuery>,
) -> impl IntoResponse {
    handle_command(&s, &command, None, query.user_key).await
}

/// `POST /robot/{command}/{arg}?user_key=`: motion commands.
pub async fn robot_motion(
    State(s): State<Arc<GatewayState>>,
    Path((command, arg)): Path<(String, String)>,
    Query(query): Query<CommandQuery>,
) -> impl IntoResponse {
    handle_command(&s, &command, Some(&arg), query.user_key).await
}

async fn handle_command(
    s: &GatewayState,
    name: &str,
    arg: Option<&str>,
    user_key: Option<String>,
) -> axum::response::Response {
    let Some(token) = user_key.filter(|k| !k.is_empty()) else {
        return GatewayError::BadRequest.to_http_response("missing user_key").into_response();
    };
    let command = match Command::parse(name, arg) {
        Ok(c) => c,
        Err(code) => {
            return code.to_http_response(format!("invalid command: {name}")).into_response();
        }
    };

    match dispatch(s, &token, &command).await {
        Ok(body) => body.into_response(),
        Err(DispatchFailure { code, message }) => code.to_http_response(message).into_response(),
    }
}

fn lookup_message(code: GatewayError, short_id: &str) -> String {
    match code {
        GatewayError::AmbiguousShortId => format!("short id matches several robots: {short_id}"),
        _ => format!("robot not found: {short_id}"),
    }
}
